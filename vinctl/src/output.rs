//! Output formatting utilities for vinctl

use crate::commands::ingest::IngestFailure;
use colored::*;
use serde_json::{Map, Value};
use tabled::{Table, Tabled};
use vinculo_core::loader::LoadedSource;
use vinculo_core::pipeline::IngestOutcome;
use vinculo_core::types::{Edge, SourceFormat};

/// Render edges as a table
pub fn edge_table(edges: &[Edge]) -> String {
    if edges.is_empty() {
        return "No edges produced\n".to_string();
    }

    let table_data: Vec<EdgeTableRow> = edges
        .iter()
        .map(|e| EdgeTableRow {
            case_id: e.case_id.to_string(),
            source: e.source_entity_id.clone(),
            relation: e.relation_type.to_string(),
            target: e.target_entity_id.clone(),
            attributes: format_attributes(&e.attributes),
        })
        .collect();

    format!("{}\n", Table::new(table_data))
}

/// Display per-file results of an ingest run on stderr
pub fn display_ingest_summary(outcomes: &[IngestOutcome], failures: &[IngestFailure], stored_edges: usize) {
    if !outcomes.is_empty() {
        let table_data: Vec<FileTableRow> = outcomes
            .iter()
            .map(|o| FileTableRow {
                file: o.path.display().to_string(),
                format: o.format.to_string(),
                encoding: if o.used_fallback_encoding {
                    format!("{} (fallback)", o.encoding).yellow().to_string()
                } else {
                    o.encoding.to_string()
                },
                rows: o.rows_read,
                rejected: o.rows_rejected,
                dropped: o.rows_dropped,
                edges: o.edges.len(),
            })
            .collect();

        eprintln!("{}", Table::new(table_data));
    }

    for failure in failures {
        eprintln!("{} {}", "✗".red().bold(), failure);
    }

    let message = format!(
        "Ingestion finished: {} file(s) ok, {} failed, {} distinct edge(s) stored",
        outcomes.len(),
        failures.len(),
        stored_edges
    );
    if failures.is_empty() {
        eprintln!("{}", format!("✓ {}", message).green().bold());
    } else {
        eprintln!("{}", message.yellow().bold());
    }
}

/// Display the supported source formats
pub fn display_formats(formats: &[(SourceFormat, &'static [&'static str])]) {
    let table_data: Vec<FormatTableRow> = formats
        .iter()
        .map(|(format, columns)| FormatTableRow {
            format: format.to_string(),
            alias: format.source_alias().to_string(),
            columns: columns.join(", "),
            relations: format
                .relation_types()
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    println!("{}", Table::new(table_data));
}

/// Display what the loader made of a file
pub fn display_inspection(path: &str, loaded: &LoadedSource, missing: Option<&[String]>) {
    println!("{}", "Source File".bold().blue());
    println!("{:<12} {}", "Path:".bold(), path);
    let encoding = if loaded.used_fallback {
        format!("{} (fallback)", loaded.encoding).yellow().to_string()
    } else {
        loaded.encoding.to_string()
    };
    println!("{:<12} {}", "Encoding:".bold(), encoding);
    println!("{:<12} {}", "Rows:".bold(), loaded.table.len());
    println!("{:<12} {}", "Rejected:".bold(), format_lines(loaded.table.rejected()));

    println!("{}", "Columns:".bold());
    for (index, header) in loaded.table.headers().iter().enumerate() {
        println!("  {:>3}  {}", index, header);
    }

    match missing {
        Some([]) => println!("{}", "✓ All expected columns present".green().bold()),
        Some(columns) => println!(
            "{} {}",
            "✗ Missing columns:".red().bold(),
            columns.join(", ")
        ),
        None => {}
    }
}

/// Format attributes for display
fn format_attributes(attributes: &Map<String, Value>) -> String {
    if attributes.is_empty() {
        return "-".to_string();
    }

    attributes
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}={}", key, s),
            other => format!("{}={}", key, other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format rejected line numbers for display
fn format_lines(lines: &[u64]) -> String {
    if lines.is_empty() {
        return "none".to_string();
    }

    lines.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(", ")
}

/// Table row for edge display
#[derive(Tabled)]
struct EdgeTableRow {
    #[tabled(rename = "Case")]
    case_id: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Relation")]
    relation: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Attributes")]
    attributes: String,
}

/// Table row for ingested file display
#[derive(Tabled)]
struct FileTableRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Encoding")]
    encoding: String,
    #[tabled(rename = "Rows")]
    rows: usize,
    #[tabled(rename = "Rejected")]
    rejected: usize,
    #[tabled(rename = "Dropped")]
    dropped: usize,
    #[tabled(rename = "Edges")]
    edges: usize,
}

/// Table row for format display
#[derive(Tabled)]
struct FormatTableRow {
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "Expected Columns")]
    columns: String,
    #[tabled(rename = "Relations")]
    relations: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_attributes() {
        assert_eq!(format_attributes(&Map::new()), "-");

        let mut attributes = Map::new();
        attributes.insert("forca".to_string(), json!(3));
        attributes.insert("tipo".to_string(), json!("Titular"));
        let formatted = format_attributes(&attributes);
        assert!(formatted.contains("forca=3"));
        assert!(formatted.contains("tipo=Titular"));
    }

    #[test]
    fn test_edge_table() {
        use vinculo_core::types::{CaseId, RelationType};

        assert_eq!(edge_table(&[]), "No edges produced\n");

        let edges = vec![Edge::new("111", "222", RelationType::Transferiu, CaseId::new(1))
            .with_attribute("forca", json!(2))];
        let table = edge_table(&edges);
        assert!(table.contains("TRANSFERIU"));
        assert!(table.contains("forca=2"));
    }

    #[test]
    fn test_format_lines() {
        assert_eq!(format_lines(&[]), "none");
        assert_eq!(format_lines(&[3, 7]), "3, 7");
    }
}
