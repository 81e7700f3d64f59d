//! In-memory representation of a decoded source file

use crate::errors::{IngestError, IngestResult};
use std::collections::HashMap;

/// One data row of a source file
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// Line of the row in the source file (header is line 1)
    pub line: u64,
    /// Cell values in header order; `None` is a null cell
    pub cells: Vec<Option<String>>,
}

impl RawRow {
    /// Cell at the given column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|cell| cell.as_deref())
    }
}

/// A delimited file materialized as named columns and rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<RawRow>,
    /// Rows the loader refused, with their line
    rejected: Vec<u64>,
}

impl RawTable {
    /// Build a table, renaming repeated headers to `name.1`, `name.2`, ...
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self {
            headers: mangle_duplicate_headers(headers),
            rows,
            rejected: Vec::new(),
        }
    }

    pub(crate) fn with_rejected(mut self, rejected: Vec<u64>) -> Self {
        self.rejected = rejected;
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lines of rows rejected while loading
    pub fn rejected(&self) -> &[u64] {
        &self.rejected
    }

    /// Index of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Resolve every named column, failing with all missing names at once
    pub fn require_columns<const N: usize>(&self, names: [&str; N]) -> IngestResult<[usize; N]> {
        let mut indices = [0usize; N];
        let mut missing = Vec::new();

        for (slot, name) in indices.iter_mut().zip(names.iter()) {
            match self.column_index(name) {
                Some(index) => *slot = index,
                None => missing.push(name.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(IngestError::missing_columns(missing))
        }
    }
}

/// Suffix repeats with `.1`, `.2`, ...; a suffixed name that is already
/// taken gets suffixed again, so the result never repeats a name.
fn mangle_duplicate_headers(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::with_capacity(headers.len());

    for header in headers {
        let mut name = header;
        let mut count = counts.get(&name).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(name.clone(), count + 1);
            name = format!("{}.{}", name, count);
            count = counts.get(&name).copied().unwrap_or(0);
        }
        counts.insert(name.clone(), count + 1);
        result.push(name);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_duplicate_headers_get_numeric_suffixes() {
        let table = RawTable::new(
            headers(&["Atribuído a", "Assinante (A)", "Terminal", "Atribuído a", "Assinante (A)", "Atribuído a"]),
            Vec::new(),
        );

        assert_eq!(
            table.headers(),
            &[
                "Atribuído a",
                "Assinante (A)",
                "Terminal",
                "Atribuído a.1",
                "Assinante (A).1",
                "Atribuído a.2",
            ]
        );
    }

    #[test]
    fn test_suffixed_header_already_present_is_not_reused() {
        let headers = vec!["a".to_string(), "a.1".to_string(), "a".to_string()];
        let table = RawTable::new(headers, Vec::new());

        assert_eq!(table.headers(), &["a", "a.1", "a.1.1"]);
        assert_eq!(table.column_index("a.1"), Some(1));
        assert_eq!(table.column_index("a.1.1"), Some(2));
    }

    #[test]
    fn test_require_columns_reports_every_missing_name() {
        let table = RawTable::new(headers(&["a", "b"]), Vec::new());

        assert_eq!(table.require_columns(["b", "a"]).unwrap(), [1, 0]);

        let err = table.require_columns(["a", "x", "y"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        match err {
            IngestError::Schema { missing } => assert_eq!(missing, vec!["x", "y"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_row_get_out_of_range_is_null() {
        let row = RawRow {
            line: 2,
            cells: vec![Some("x".to_string()), None],
        };
        assert_eq!(row.get(0), Some("x"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(5), None);
    }
}
