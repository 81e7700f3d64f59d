//! Rendering edges for downstream graph stores

use crate::cli::EmitFormat;
use crate::output::edge_table;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use vinculo_core::errors::CoreError;
use vinculo_core::types::Edge;

/// Node label given to every entity in Cypher output
const ENTITY_LABEL: &str = "Entidade";

/// Render edges in the requested format
pub fn render_edges(edges: &[Edge], format: EmitFormat) -> Result<String, CoreError> {
    match format {
        EmitFormat::Jsonl => format_as_jsonl(edges),
        EmitFormat::Cypher => Ok(format_as_cypher(edges)),
        EmitFormat::Csv => format_as_csv(edges),
        EmitFormat::Table => Ok(edge_table(edges)),
    }
}

/// Format edges as JSON Lines
fn format_as_jsonl(edges: &[Edge]) -> Result<String, CoreError> {
    let mut output = String::new();
    for edge in edges {
        output.push_str(&serde_json::to_string(edge)?);
        output.push('\n');
    }
    Ok(output)
}

/// Format edges as idempotent Cypher MERGE statements
fn format_as_cypher(edges: &[Edge]) -> String {
    let mut output = String::new();

    for edge in edges {
        output.push_str(&format!(
            "MERGE (a:{label} {{id: '{}'}}) MERGE (b:{label} {{id: '{}'}}) MERGE (a)-[r:{} {{case_id: {}}}]->(b)",
            escape_cypher_string(&edge.source_entity_id),
            escape_cypher_string(&edge.target_entity_id),
            edge.relation_type,
            edge.case_id,
            label = ENTITY_LABEL,
        ));

        if !edge.attributes.is_empty() {
            let assignments: Vec<String> = edge
                .attributes
                .iter()
                .map(|(key, value)| format!("{}: {}", cypher_key(key), cypher_literal(value)))
                .collect();
            output.push_str(&format!(" SET r += {{{}}}", assignments.join(", ")));
        }

        output.push_str(";\n");
    }

    output
}

/// Format edges as CSV with attributes as a JSON column
fn format_as_csv(edges: &[Edge]) -> Result<String, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["case_id", "source", "target", "relation_type", "attributes"])
        .map_err(|e| CoreError::Internal(format!("Failed to write CSV header: {}", e)))?;

    for edge in edges {
        let attributes = serde_json::to_string(&edge.attributes)?;
        writer
            .write_record([
                edge.case_id.to_string().as_str(),
                edge.source_entity_id.as_str(),
                edge.target_entity_id.as_str(),
                edge.relation_type.as_str(),
                attributes.as_str(),
            ])
            .map_err(|e| CoreError::Internal(format!("Failed to write CSV record: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("Failed to flush CSV output: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Internal(format!("CSV output is not UTF-8: {}", e)))
}

/// Write output to file
pub fn write_to_file(content: &str, path: &Path) -> Result<(), CoreError> {
    let mut file = File::create(path)
        .map_err(|e| CoreError::Internal(format!("Failed to create file {}: {}", path.display(), e)))?;

    file.write_all(content.as_bytes())
        .map_err(|e| CoreError::Internal(format!("Failed to write to file {}: {}", path.display(), e)))?;

    Ok(())
}

/// Escape a string for use inside a single-quoted Cypher literal
fn escape_cypher_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Map key, backtick-quoted unless it is a plain identifier
fn cypher_key(key: &str) -> String {
    let plain = key.chars().next().map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        key.to_string()
    } else {
        format!("`{}`", key.replace('`', "``"))
    }
}

/// Cypher literal for a scalar attribute value
fn cypher_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", escape_cypher_string(s)),
        // Non-scalar attributes are stored as their JSON text
        other => format!("'{}'", escape_cypher_string(&other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vinculo_core::types::{CaseId, RelationType};

    fn edges() -> Vec<Edge> {
        vec![
            Edge::new("111", "222", RelationType::Transferiu, CaseId::new(4)).with_attribute("forca", json!(2)),
            Edge::new("D'Ávila", "44122024", RelationType::EnvolvidoNoRif, CaseId::new(4))
                .with_attribute("tipo", json!("Titular, PF")),
        ]
    }

    #[test]
    fn test_jsonl_one_edge_per_line() {
        let output = render_edges(&edges(), EmitFormat::Jsonl).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Edge = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, edges()[0]);
    }

    #[test]
    fn test_cypher_merge_statements() {
        let output = render_edges(&edges(), EmitFormat::Cypher).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "MERGE (a:Entidade {id: '111'}) MERGE (b:Entidade {id: '222'}) \
             MERGE (a)-[r:TRANSFERIU {case_id: 4}]->(b) SET r += {forca: 2};"
        );
        assert!(lines[1].contains("{id: 'D\\'Ávila'}"));
        assert!(lines[1].contains("SET r += {tipo: 'Titular, PF'}"));
    }

    #[test]
    fn test_csv_quotes_embedded_delimiters() {
        let output = render_edges(&edges(), EmitFormat::Csv).unwrap();
        let mut reader = csv::Reader::from_reader(output.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][3], "ENVOLVIDO_NO_RIF");
        assert_eq!(&records[1][4], r#"{"tipo":"Titular, PF"}"#);
    }

    #[test]
    fn test_cypher_key_quoting() {
        assert_eq!(cypher_key("forca"), "forca");
        assert_eq!(cypher_key("Nº RIF"), "`Nº RIF`");
        assert_eq!(cypher_key("1st"), "`1st`");
    }

    #[test]
    fn test_table_rendering() {
        let output = render_edges(&edges(), EmitFormat::Table).unwrap();
        assert!(output.contains("ENVOLVIDO_NO_RIF"));
    }
}
