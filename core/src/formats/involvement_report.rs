//! Financial-intelligence report (RIF) involvement lists.
//!
//! Every listed party is linked to the report itself. The report number is
//! taken from the digits of the original file name; files named without
//! digits fall back to the report-number column of the first data row.

use crate::errors::{IngestError, IngestResult};
use crate::normalize::{digits_of, sentinel_to_null};
use crate::table::RawTable;
use crate::traits::{FormatAdapter, SourceContext};
use crate::types::{AdaptedTable, CanonicalRow, RelationType, SourceFormat};
use serde_json::json;
use tracing::{debug, warn};

pub const PARTY: &str = "cpfCnpjEnvolvido";
pub const NAME: &str = "nomeEnvolvido";
pub const KIND: &str = "tipoEnvolvido";
/// Only read when the file name carries no digits
pub const REPORT_NUMBER: &str = "Nº RIF";

pub const KIND_ATTRIBUTE: &str = "tipo";
pub const NAME_ATTRIBUTE: &str = "nome";

const COLUMNS: &[&str] = &[PARTY, NAME, KIND];

pub struct InvolvementReportAdapter {
    sentinel: String,
}

impl InvolvementReportAdapter {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }

    /// Report identifier for the table, `None` when it cannot be determined
    pub fn resolve_report_id(&self, file_name: &str, table: &RawTable) -> IngestResult<Option<String>> {
        let digits = digits_of(file_name);
        if !digits.is_empty() {
            return Ok(Some(digits));
        }

        let [report_idx] = table.require_columns([REPORT_NUMBER])?;
        Ok(table
            .rows()
            .first()
            .and_then(|row| sentinel_to_null(row.get(report_idx), &self.sentinel))
            .map(str::to_string))
    }
}

impl FormatAdapter for InvolvementReportAdapter {
    fn format(&self) -> SourceFormat {
        SourceFormat::InvolvementReport
    }

    fn expected_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn adapt(&self, table: &RawTable, source: &SourceContext) -> IngestResult<AdaptedTable> {
        let [party_idx, name_idx, kind_idx] = table.require_columns([PARTY, NAME, KIND])?;
        let report_id = self.resolve_report_id(&source.file_name, table)?;

        let mut adapted = AdaptedTable::default();

        let Some(report_id) = report_id else {
            for row in table.rows() {
                let err = IngestError::data(row.line, "report number unavailable");
                warn!("Skipping row: {}", err);
            }
            adapted.dropped_rows = table.len();
            return Ok(adapted);
        };

        debug!(
            "Case {}: {} parties listed in RIF {}",
            source.case_id,
            table.len(),
            report_id
        );

        for row in table.rows() {
            let Some(party) = sentinel_to_null(row.get(party_idx), &self.sentinel) else {
                debug!("Line {}: missing involved party identifier", row.line);
                adapted.dropped_rows += 1;
                continue;
            };

            let mut canonical = CanonicalRow::new(party, report_id.as_str(), row.line);
            if let Some(kind) = row.get(kind_idx) {
                canonical = canonical.with_attribute(KIND_ATTRIBUTE, json!(kind));
            }
            if let Some(name) = row.get(name_idx) {
                canonical = canonical.with_attribute(NAME_ATTRIBUTE, json!(name));
            }
            adapted.push(RelationType::EnvolvidoNoRif, canonical);
        }

        Ok(adapted)
    }
}
