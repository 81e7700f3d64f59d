//! Telecom subscriber registry.
//!
//! Rows whose investigated-party name carries the non-person marker (the
//! operator's own lines, company switchboards) are skipped. Remaining rows link
//! the subscriber to their tax identifier and to the terminal.

use crate::errors::IngestResult;
use crate::normalize::sentinel_to_null;
use crate::table::RawTable;
use crate::traits::{FormatAdapter, SourceContext};
use crate::types::{AdaptedTable, CanonicalRow, RelationType, SourceFormat};
use tracing::debug;

/// Registrant name checked against the non-person marker
pub const INVESTIGATED: &str = "Investigado";
pub const SUBSCRIBER: &str = "Assinante";
pub const DOCUMENT: &str = "CPF/CNPJ";
pub const TERMINAL: &str = "Terminal";

const COLUMNS: &[&str] = &[INVESTIGATED, SUBSCRIBER, DOCUMENT, TERMINAL];

pub struct SubscriberRegistryAdapter {
    sentinel: String,
    non_person_marker: String,
}

impl SubscriberRegistryAdapter {
    pub fn new(sentinel: impl Into<String>, non_person_marker: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
            non_person_marker: non_person_marker.into(),
        }
    }

    fn is_non_person(&self, name: Option<&str>) -> bool {
        name.map_or(false, |name| name.contains(self.non_person_marker.as_str()))
    }
}

impl FormatAdapter for SubscriberRegistryAdapter {
    fn format(&self) -> SourceFormat {
        SourceFormat::SubscriberRegistry
    }

    fn expected_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn adapt(&self, table: &RawTable, source: &SourceContext) -> IngestResult<AdaptedTable> {
        let [investigated_idx, subscriber_idx, document_idx, terminal_idx] =
            table.require_columns([INVESTIGATED, SUBSCRIBER, DOCUMENT, TERMINAL])?;

        let mut adapted = AdaptedTable::default();
        let mut dropped_rows = 0;
        let mut excluded = 0;

        for row in table.rows() {
            if self.is_non_person(row.get(investigated_idx)) {
                debug!("Line {}: non-person registrant skipped", row.line);
                excluded += 1;
                dropped_rows += 1;
                continue;
            }

            let Some(subscriber) = sentinel_to_null(row.get(subscriber_idx), &self.sentinel) else {
                debug!("Line {}: missing subscriber", row.line);
                dropped_rows += 1;
                continue;
            };

            let document = sentinel_to_null(row.get(document_idx), &self.sentinel);
            let terminal = sentinel_to_null(row.get(terminal_idx), &self.sentinel);

            if let Some(document) = document {
                adapted.push(RelationType::TemCpfCnpj, CanonicalRow::new(subscriber, document, row.line));
            }
            if let Some(terminal) = terminal {
                adapted.push(RelationType::EAssinanteDe, CanonicalRow::new(subscriber, terminal, row.line));
            }
            if document.is_none() && terminal.is_none() {
                debug!("Line {}: subscriber without document or terminal", row.line);
                dropped_rows += 1;
            }
        }

        debug!(
            "Case {}: {} registry rows kept, {} non-person rows excluded in {}",
            source.case_id,
            table.len() - dropped_rows,
            excluded,
            source.file_name
        );

        adapted.dropped_rows = dropped_rows;
        Ok(adapted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawRow;
    use crate::types::CaseId;

    fn table(rows: &[[Option<&str>; 4]]) -> RawTable {
        let headers = COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, cells)| RawRow {
                line: i as u64 + 2,
                cells: cells.iter().map(|c| c.map(str::to_string)).collect(),
            })
            .collect();
        RawTable::new(headers, rows)
    }

    fn adapt(table: &RawTable) -> AdaptedTable {
        SubscriberRegistryAdapter::new("-", "CGI")
            .adapt(table, &SourceContext::new(CaseId::new(9), "cadastro.csv"))
            .unwrap()
    }

    #[test]
    fn test_non_person_marker_excludes_row() {
        let adapted = adapt(&table(&[
            [Some("ACME CGI HOLDINGS"), Some("ACME"), Some("111"), Some("5561")],
            [Some("ACME HOLDINGS"), Some("JOAO"), Some("222"), Some("5562")],
        ]));

        let documents = adapted.rows_of(RelationType::TemCpfCnpj);
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].source, "JOAO");
        assert_eq!(documents[0].target, "222");

        let terminals = adapted.rows_of(RelationType::EAssinanteDe);
        assert_eq!(terminals.len(), 1);
        assert_eq!(terminals[0].target, "5562");
        assert_eq!(adapted.dropped_rows, 1);
    }

    #[test]
    fn test_marker_match_is_case_sensitive() {
        let adapted = adapt(&table(&[[Some("Banco Cgi"), Some("MARIA"), Some("333"), Some("5563")]]));
        assert_eq!(adapted.row_count(), 2);
    }

    #[test]
    fn test_null_registrant_is_retained() {
        let adapted = adapt(&table(&[[None, Some("MARIA"), Some("333"), None]]));
        assert_eq!(adapted.rows_of(RelationType::TemCpfCnpj).len(), 1);
        assert!(adapted.rows_of(RelationType::EAssinanteDe).is_empty());
    }

    #[test]
    fn test_sentinel_identifier_is_null() {
        let adapted = adapt(&table(&[
            [Some("X"), Some("-"), Some("333"), Some("5563")],
            [Some("X"), Some("ANA"), Some("-"), Some("5564")],
        ]));

        assert!(adapted.rows_of(RelationType::TemCpfCnpj).is_empty());
        let terminals = adapted.rows_of(RelationType::EAssinanteDe);
        assert_eq!(terminals.len(), 1);
        assert_eq!(terminals[0].source, "ANA");
        assert_eq!(adapted.dropped_rows, 1);
    }

    #[test]
    fn test_each_row_emits_its_relationships_together() {
        let adapted = adapt(&table(&[
            [Some("JOAO"), Some("JOAO"), Some("1"), Some("10")],
            [Some("MARIA"), Some("MARIA"), Some("2"), Some("20")],
        ]));

        let order: Vec<String> = adapted
            .iter()
            .map(|(relation, row)| format!("{}-{}->{}", row.source, relation, row.target))
            .collect();
        assert_eq!(
            order,
            vec![
                "JOAO-TEM_CPF_CNPJ->1",
                "JOAO-E_ASSINANTE_DE->10",
                "MARIA-TEM_CPF_CNPJ->2",
                "MARIA-E_ASSINANTE_DE->20",
            ]
        );
    }
}
