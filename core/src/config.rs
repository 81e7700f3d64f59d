//! Ingestion settings shared by the loader and the format adapters

use crate::errors::CoreError;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

/// Settings that control how source files are decoded and normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Field delimiter of the source files
    pub delimiter: char,
    /// WHATWG label of the legacy single-byte encoding tried after UTF-8
    pub fallback_encoding: String,
    /// Cell values read as null at load time
    pub null_tokens: Vec<String>,
    /// Placeholder some exports write instead of leaving a cell empty
    pub sentinel: String,
    /// Substring marking a registry entry that is not a natural person
    pub non_person_marker: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            fallback_encoding: "windows-1252".to_string(),
            null_tokens: ["", "NA", "N/A", "n/a", "NULL", "null", "NaN", "nan", "#N/A", "<NA>", "None"]
                .iter()
                .map(|token| token.to_string())
                .collect(),
            sentinel: "-".to_string(),
            non_person_marker: "CGI".to_string(),
        }
    }
}

impl IngestConfig {
    /// Delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8, CoreError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(CoreError::Configuration(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )))
        }
    }

    /// Resolve the configured fallback encoding
    pub fn fallback(&self) -> Result<&'static Encoding, CoreError> {
        Encoding::for_label(self.fallback_encoding.as_bytes()).ok_or_else(|| {
            CoreError::Configuration(format!("Unknown encoding label: {}", self.fallback_encoding))
        })
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<(), CoreError> {
        self.delimiter_byte()?;
        self.fallback()?;
        if self.non_person_marker.is_empty() {
            return Err(CoreError::Configuration(
                "non_person_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
