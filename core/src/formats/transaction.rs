//! Bank transaction extracts: one aggregated transfer relationship per
//! (titular, counterparty) pair.

use crate::errors::IngestResult;
use crate::normalize::sentinel_to_null;
use crate::table::RawTable;
use crate::traits::{FormatAdapter, SourceContext};
use crate::types::{AdaptedTable, CanonicalRow, RelationType, SourceFormat};
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

/// Tax identifier of the account holder
pub const TITULAR: &str = "CPF_CNPJ_TITULAR";
/// Tax identifier of the other side of the transaction
pub const COUNTERPARTY: &str = "CPF_CNPJ_OD";

/// Attribute holding the number of transactions between a pair
pub const STRENGTH_ATTRIBUTE: &str = "forca";

const COLUMNS: &[&str] = &[TITULAR, COUNTERPARTY];

pub struct TransactionExtractAdapter {
    sentinel: String,
}

impl TransactionExtractAdapter {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }
}

impl FormatAdapter for TransactionExtractAdapter {
    fn format(&self) -> SourceFormat {
        SourceFormat::TransactionExtract
    }

    fn expected_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn adapt(&self, table: &RawTable, source: &SourceContext) -> IngestResult<AdaptedTable> {
        let [titular_idx, counterparty_idx] = table.require_columns([TITULAR, COUNTERPARTY])?;

        // Groups keep first-seen order; the map points into `pairs`.
        let mut pairs: Vec<(CanonicalRow, u64)> = Vec::new();
        let mut positions: HashMap<(String, String), usize> = HashMap::new();
        let mut dropped_rows = 0;

        for row in table.rows() {
            let titular = sentinel_to_null(row.get(titular_idx), &self.sentinel);
            let counterparty = sentinel_to_null(row.get(counterparty_idx), &self.sentinel);

            let (titular, counterparty) = match (titular, counterparty) {
                (Some(t), Some(c)) => (t, c),
                _ => {
                    debug!("Line {}: missing titular or counterparty", row.line);
                    dropped_rows += 1;
                    continue;
                }
            };

            if titular == counterparty {
                debug!("Line {}: self-transfer by {}", row.line, titular);
                dropped_rows += 1;
                continue;
            }

            let key = (titular.to_string(), counterparty.to_string());
            match positions.get(&key) {
                Some(&position) => pairs[position].1 += 1,
                None => {
                    positions.insert(key, pairs.len());
                    pairs.push((CanonicalRow::new(titular, counterparty, row.line), 1));
                }
            }
        }

        debug!(
            "Case {}: {} distinct transfer pairs in {}",
            source.case_id,
            pairs.len(),
            source.file_name
        );

        let mut adapted = AdaptedTable {
            dropped_rows,
            ..Default::default()
        };
        for (row, count) in pairs {
            adapted.push(RelationType::Transferiu, row.with_attribute(STRENGTH_ATTRIBUTE, json!(count)));
        }

        Ok(adapted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::table::RawRow;
    use crate::types::CaseId;

    fn table(rows: &[(Option<&str>, Option<&str>)]) -> RawTable {
        let headers = vec!["DATA".to_string(), TITULAR.to_string(), COUNTERPARTY.to_string()];
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, (t, c))| RawRow {
                line: i as u64 + 2,
                cells: vec![Some("01/01/2024".to_string()), t.map(str::to_string), c.map(str::to_string)],
            })
            .collect();
        RawTable::new(headers, rows)
    }

    fn adapt(table: &RawTable) -> AdaptedTable {
        TransactionExtractAdapter::new("-")
            .adapt(table, &SourceContext::new(CaseId::new(1), "extrato.csv"))
            .unwrap()
    }

    #[test]
    fn test_pairs_are_aggregated_in_first_seen_order() {
        let adapted = adapt(&table(&[
            (Some("A"), Some("B")),
            (Some("A"), Some("B")),
            (Some("A"), Some("C")),
            (Some("B"), Some("B")),
        ]));

        assert_eq!(adapted.groups.len(), 1);
        let rows = &adapted.groups[0].rows;
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].source.as_str(), rows[0].target.as_str()), ("A", "B"));
        assert_eq!(rows[0].attributes[STRENGTH_ATTRIBUTE], json!(2));
        assert_eq!((rows[1].source.as_str(), rows[1].target.as_str()), ("A", "C"));
        assert_eq!(rows[1].attributes[STRENGTH_ATTRIBUTE], json!(1));
        assert_eq!(adapted.dropped_rows, 1);
    }

    #[test]
    fn test_direction_matters_for_grouping() {
        let adapted = adapt(&table(&[(Some("A"), Some("B")), (Some("B"), Some("A"))]));
        assert_eq!(adapted.row_count(), 2);
    }

    #[test]
    fn test_null_and_sentinel_identifiers_are_dropped() {
        let adapted = adapt(&table(&[
            (None, Some("B")),
            (Some("A"), None),
            (Some("-"), Some("B")),
            (Some("A"), Some("B")),
        ]));

        assert_eq!(adapted.row_count(), 1);
        assert_eq!(adapted.dropped_rows, 3);
        assert_eq!(adapted.groups[0].rows[0].line, 5);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let table = RawTable::new(vec![TITULAR.to_string()], Vec::new());
        let err = TransactionExtractAdapter::new("-")
            .adapt(&table, &SourceContext::new(CaseId::new(1), "extrato.csv"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }
}
