//! Source loading: byte decoding with a legacy-encoding fallback, then
//! delimited parsing into a [`RawTable`].

use crate::config::IngestConfig;
use crate::errors::{CoreError, IngestError, IngestResult};
use crate::normalize::is_null_token;
use crate::table::{RawRow, RawTable};
use csv::ReaderBuilder;
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, error, info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text decoded from a source file
#[derive(Debug)]
pub struct Decoded<'a> {
    pub text: Cow<'a, str>,
    pub encoding: &'static Encoding,
    /// Whether the primary UTF-8 decode failed and the fallback was used
    pub used_fallback: bool,
}

/// Decode raw bytes as UTF-8, falling back to exactly one legacy encoding.
///
/// A leading UTF-8 byte-order mark is stripped. Neither attempt substitutes
/// replacement characters; malformed input under both encodings is an error.
pub fn decode_bytes<'a>(bytes: &'a [u8], fallback: &'static Encoding) -> IngestResult<Decoded<'a>> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(body) {
        return Ok(Decoded {
            text,
            encoding: UTF_8,
            used_fallback: false,
        });
    }

    if let Some(text) = fallback.decode_without_bom_handling_and_without_replacement(body) {
        return Ok(Decoded {
            text,
            encoding: fallback,
            used_fallback: true,
        });
    }

    Err(IngestError::Decode {
        tried: vec![UTF_8.name(), fallback.name()],
    })
}

/// Parse decoded text into a table.
///
/// Cells matching a null token become `None`. Short rows are padded with
/// nulls; rows with more fields than the header are rejected and logged.
pub fn parse_table(text: &str, delimiter: u8, null_tokens: &[String]) -> IngestResult<RawTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    debug!("Source headers: {:?}", headers);

    let mut rows = Vec::new();
    let mut rejected = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or(index as u64 + 2);

        if record.len() > headers.len() {
            let err = IngestError::data(
                line,
                format!("{} fields for {} columns", record.len(), headers.len()),
            );
            warn!("Skipping row: {}", err);
            rejected.push(line);
            continue;
        }

        let mut cells: Vec<Option<String>> = record
            .iter()
            .map(|cell| {
                if is_null_token(cell, null_tokens) {
                    None
                } else {
                    Some(cell.to_string())
                }
            })
            .collect();
        cells.resize(headers.len(), None);

        rows.push(RawRow { line, cells });
    }

    Ok(RawTable::new(headers, rows).with_rejected(rejected))
}

/// Result of loading one source file
#[derive(Debug)]
pub struct LoadedSource {
    pub table: RawTable,
    /// Name of the encoding the file was decoded with
    pub encoding: &'static str,
    pub used_fallback: bool,
}

/// Reads delimited source files into raw tables
#[derive(Debug, Clone)]
pub struct SourceLoader {
    delimiter: u8,
    fallback: &'static Encoding,
    null_tokens: Vec<String>,
}

impl SourceLoader {
    /// Create a loader from validated settings
    pub fn new(config: &IngestConfig) -> Result<Self, CoreError> {
        Ok(Self {
            delimiter: config.delimiter_byte()?,
            fallback: config.fallback()?,
            null_tokens: config.null_tokens.clone(),
        })
    }

    /// Load and parse a file
    pub fn load(&self, path: &Path) -> IngestResult<LoadedSource> {
        let bytes = std::fs::read(path).map_err(|e| {
            error!("Failed to read {}: {}", path.display(), e);
            IngestError::Io(e)
        })?;

        let decoded = decode_bytes(&bytes, self.fallback).map_err(|e| {
            error!("Failed to decode {} with every encoding: {}", path.display(), e);
            e
        })?;

        if decoded.used_fallback {
            warn!(
                "UTF-8 decoding failed for {}, read as {}",
                path.display(),
                decoded.encoding.name()
            );
        } else {
            info!("Decoded {} as {}", path.display(), decoded.encoding.name());
        }

        let table = parse_table(&decoded.text, self.delimiter, &self.null_tokens)?;
        debug!(
            "Loaded {} rows ({} rejected) from {}",
            table.len(),
            table.rejected().len(),
            path.display()
        );

        Ok(LoadedSource {
            table,
            encoding: decoded.encoding.name(),
            used_fallback: decoded.used_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn loader() -> SourceLoader {
        SourceLoader::new(&IngestConfig::default()).unwrap()
    }

    fn write_temp(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_decode_prefers_utf8() {
        let decoded = decode_bytes("Atribuído a;Terminal".as_bytes(), encoding_rs::WINDOWS_1252).unwrap();
        assert!(!decoded.used_fallback);
        assert_eq!(decoded.encoding, UTF_8);
        assert_eq!(decoded.text, "Atribuído a;Terminal");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let decoded = decode_bytes(b"\xEF\xBB\xBFa;b", encoding_rs::WINDOWS_1252).unwrap();
        assert!(!decoded.used_fallback);
        assert_eq!(decoded.text, "a;b");
    }

    #[test]
    fn test_decode_falls_back_to_legacy_encoding() {
        // "Atribuído" in windows-1252 / latin1
        let decoded = decode_bytes(b"Atribu\xEDdo a", encoding_rs::WINDOWS_1252).unwrap();
        assert!(decoded.used_fallback);
        assert_eq!(decoded.encoding, encoding_rs::WINDOWS_1252);
        assert_eq!(decoded.text, "Atribuído a");
    }

    #[test]
    fn test_bom_is_stripped_before_fallback() {
        let decoded = decode_bytes(b"\xEF\xBB\xBFAtribu\xEDdo a;Terminal", encoding_rs::WINDOWS_1252).unwrap();
        assert!(decoded.used_fallback);
        assert_eq!(decoded.text, "Atribuído a;Terminal");

        let table = parse_table(&decoded.text, b';', &[]).unwrap();
        assert_eq!(table.column_index("Atribuído a"), Some(0));
    }

    #[test]
    fn test_decode_fails_when_every_encoding_fails() {
        let err = decode_bytes(b"\xFF", encoding_rs::SHIFT_JIS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_parse_table_nulls_and_padding() {
        let table = parse_table("a;b;c\n1;;NaN\n2;x\n", b';', &IngestConfig::default().null_tokens).unwrap();

        assert_eq!(table.headers(), &["a", "b", "c"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].cells, vec![Some("1".to_string()), None, None]);
        assert_eq!(table.rows()[1].cells, vec![Some("2".to_string()), Some("x".to_string()), None]);
        assert_eq!(table.rows()[1].line, 3);
    }

    #[test]
    fn test_parse_table_rejects_overlong_rows() {
        let table = parse_table("a;b\n1;2\n3;4;5\n6;7\n", b';', &[]).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rejected(), &[3]);
        assert_eq!(table.rows()[1].get(0), Some("6"));
    }

    #[test]
    fn test_sentinel_is_not_a_null_token() {
        let table = parse_table("a\n-\n", b';', &IngestConfig::default().null_tokens).unwrap();
        assert_eq!(table.rows()[0].get(0), Some("-"));
    }

    #[test]
    fn test_load_legacy_file_matches_utf8_row_count() {
        let utf8 = "Investigado;Assinante;CPF/CNPJ;Terminal\nJOSÉ;JOÃO;123;5561\nMÁRIO;ANDRÉ;456;5562\n";
        let (latin1, _, unmappable) = encoding_rs::WINDOWS_1252.encode(utf8);
        assert!(!unmappable);
        assert!(std::str::from_utf8(&latin1).is_err());

        let utf8_file = write_temp(utf8.as_bytes());
        let latin1_file = write_temp(&latin1);

        let direct = loader().load(utf8_file.path()).unwrap();
        let fallback = loader().load(latin1_file.path()).unwrap();

        assert!(!direct.used_fallback);
        assert!(fallback.used_fallback);
        assert_eq!(fallback.encoding, "windows-1252");
        assert_eq!(direct.table.len(), fallback.table.len());
        assert_eq!(direct.table, fallback.table);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = loader().load(Path::new("/nonexistent/extrato.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
