//! Telecom call detail records.
//!
//! Each row describes one call between an origin and a destination line.
//! The export repeats the "assigned to" and "subscriber" columns for the
//! destination side, which the loader renames with a `.1` suffix. Every row
//! can yield up to three relationships:
//!
//! * caller to callee, using the assigned-to person when known and the
//!   subscriber otherwise
//! * origin subscriber to the terminal
//! * origin assignee to the terminal
//!
//! The export writes `-` for unknown values; it is treated as null in every
//! column of this format.

use crate::errors::IngestResult;
use crate::normalize::{first_present, sentinel_to_null};
use crate::table::RawTable;
use crate::traits::{FormatAdapter, SourceContext};
use crate::types::{AdaptedTable, CanonicalRow, RelationType, SourceFormat};
use tracing::debug;

pub const ASSIGNED_ORIGIN: &str = "Atribuído a";
pub const SUBSCRIBER_ORIGIN: &str = "Assinante (A)";
pub const ASSIGNED_DESTINATION: &str = "Atribuído a.1";
pub const SUBSCRIBER_DESTINATION: &str = "Assinante (A).1";
pub const TERMINAL: &str = "Terminal";

const COLUMNS: &[&str] = &[
    ASSIGNED_ORIGIN,
    SUBSCRIBER_ORIGIN,
    ASSIGNED_DESTINATION,
    SUBSCRIBER_DESTINATION,
    TERMINAL,
];

pub struct CallDetailAdapter {
    sentinel: String,
}

impl CallDetailAdapter {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }
}

impl FormatAdapter for CallDetailAdapter {
    fn format(&self) -> SourceFormat {
        SourceFormat::CallDetail
    }

    fn expected_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn adapt(&self, table: &RawTable, source: &SourceContext) -> IngestResult<AdaptedTable> {
        let [assigned_o, subscriber_o, assigned_d, subscriber_d, terminal_idx] = table.require_columns([
            ASSIGNED_ORIGIN,
            SUBSCRIBER_ORIGIN,
            ASSIGNED_DESTINATION,
            SUBSCRIBER_DESTINATION,
            TERMINAL,
        ])?;

        let clean = |value: Option<&str>| -> Option<String> {
            sentinel_to_null(value, &self.sentinel).map(str::to_string)
        };

        // Calls for the whole file come first, then each row's terminal
        // relationships side by side
        let mut calls = AdaptedTable::default();
        let mut terminals = AdaptedTable::default();
        let mut dropped_rows = 0;

        for row in table.rows() {
            let mut contributed = false;

            let origin = first_present(row, &[assigned_o, subscriber_o], |v| {
                sentinel_to_null(v, &self.sentinel)
            });
            let destination = first_present(row, &[assigned_d, subscriber_d], |v| {
                sentinel_to_null(v, &self.sentinel)
            });

            if let (Some(origin), Some(destination)) = (origin, destination) {
                calls.push(RelationType::LigouPara, CanonicalRow::new(origin, destination, row.line));
                contributed = true;
            }

            if let Some(terminal) = clean(row.get(terminal_idx)) {
                if let Some(subscriber) = clean(row.get(subscriber_o)) {
                    terminals.push(
                        RelationType::EAssinanteDe,
                        CanonicalRow::new(subscriber, terminal.clone(), row.line),
                    );
                    contributed = true;
                }
                if let Some(assignee) = clean(row.get(assigned_o)) {
                    terminals.push(RelationType::Utiliza, CanonicalRow::new(assignee, terminal, row.line));
                    contributed = true;
                }
            }

            if !contributed {
                debug!("Line {}: no complete call or terminal relationship", row.line);
                dropped_rows += 1;
            }
        }

        debug!(
            "Case {}: {} calls, {} terminal relationships in {}",
            source.case_id,
            calls.row_count(),
            terminals.row_count(),
            source.file_name
        );

        calls.append(terminals);
        calls.dropped_rows = dropped_rows;
        Ok(calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawRow;
    use crate::types::CaseId;

    // Columns as they appear in the export, before duplicate renaming
    fn table(rows: &[[Option<&str>; 5]]) -> RawTable {
        let headers = vec![
            ASSIGNED_ORIGIN.to_string(),
            SUBSCRIBER_ORIGIN.to_string(),
            TERMINAL.to_string(),
            ASSIGNED_ORIGIN.to_string(),
            SUBSCRIBER_ORIGIN.to_string(),
        ];
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
        CallDetailAdapter::new("-")
            .adapt(table, &SourceContext::new(CaseId::new(3), "drt.csv"))
            .unwrap()
    }

    fn pairs(adapted: &AdaptedTable, relation: RelationType) -> Vec<(&str, &str)> {
        adapted
            .rows_of(relation)
            .into_iter()
            .map(|row| (row.source.as_str(), row.target.as_str()))
            .collect()
    }

    fn order(adapted: &AdaptedTable) -> Vec<String> {
        adapted
            .iter()
            .map(|(relation, row)| format!("{}-{}->{}", row.source, relation, row.target))
            .collect()
    }

    #[test]
    fn test_assigned_to_takes_priority_over_subscriber() {
        // origin assigned X, origin subscriber Y, terminal T, dest assigned null, dest subscriber Z
        let adapted = adapt(&table(&[[Some("X"), Some("Y"), Some("T"), None, Some("Z")]]));

        assert_eq!(pairs(&adapted, RelationType::LigouPara), vec![("X", "Z")]);
        assert_eq!(pairs(&adapted, RelationType::EAssinanteDe), vec![("Y", "T")]);
        assert_eq!(pairs(&adapted, RelationType::Utiliza), vec![("X", "T")]);
    }

    #[test]
    fn test_sentinel_is_normalized_before_fallback() {
        let adapted = adapt(&table(&[[Some("-"), Some("Y"), Some("-"), Some("-"), Some("Z")]]));

        assert_eq!(pairs(&adapted, RelationType::LigouPara), vec![("Y", "Z")]);
        assert_eq!(adapted.row_count(), 1);
    }

    #[test]
    fn test_null_terminal_still_yields_call() {
        let adapted = adapt(&table(&[[None, Some("Y"), None, Some("W"), None]]));

        assert_eq!(pairs(&adapted, RelationType::LigouPara), vec![("Y", "W")]);
        assert_eq!(adapted.row_count(), 1);
        assert_eq!(adapted.dropped_rows, 0);
    }

    #[test]
    fn test_terminal_relationships_without_call() {
        let adapted = adapt(&table(&[[Some("X"), None, Some("T"), None, None]]));

        assert!(pairs(&adapted, RelationType::LigouPara).is_empty());
        assert!(pairs(&adapted, RelationType::EAssinanteDe).is_empty());
        assert_eq!(pairs(&adapted, RelationType::Utiliza), vec![("X", "T")]);
    }

    #[test]
    fn test_empty_row_is_dropped_and_order_preserved() {
        let adapted = adapt(&table(&[
            [Some("A"), None, None, Some("B"), None],
            [None, None, None, None, None],
            [Some("C"), None, None, None, Some("D")],
        ]));

        assert_eq!(pairs(&adapted, RelationType::LigouPara), vec![("A", "B"), ("C", "D")]);
        assert_eq!(adapted.rows_of(RelationType::LigouPara)[1].line, 4);
        assert_eq!(adapted.dropped_rows, 1);
    }

    #[test]
    fn test_terminal_relationships_follow_row_order() {
        let adapted = adapt(&table(&[
            [Some("X"), Some("Y"), Some("1"), None, Some("Z")],
            [Some("P"), Some("Q"), Some("2"), None, None],
        ]));

        assert_eq!(
            order(&adapted),
            vec![
                "X-LIGOU_PARA->Z",
                "Y-E_ASSINANTE_DE->1",
                "X-UTILIZA->1",
                "Q-E_ASSINANTE_DE->2",
                "P-UTILIZA->2",
            ]
        );
    }
}
