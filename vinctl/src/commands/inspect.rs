//! Loading a file without extracting edges

use crate::cli::FormatArg;
use crate::config::VinctlConfig;
use crate::output::display_inspection;
use std::path::Path;
use vinculo_core::errors::CoreError;
use vinculo_core::formats::adapter_for;
use vinculo_core::loader::SourceLoader;
use vinculo_core::table::RawTable;
use vinculo_core::types::SourceFormat;

/// Handle the inspect command
pub fn handle_inspect_command(
    file: &Path,
    format: Option<FormatArg>,
    config: &VinctlConfig,
) -> Result<(), CoreError> {
    let loader = SourceLoader::new(&config.ingest)?;
    let loaded = loader
        .load(file)
        .map_err(|e| CoreError::Internal(format!("Failed to load {} ({}): {}", file.display(), e.kind(), e)))?;

    let missing = format.map(|f| missing_columns(&loaded.table, SourceFormat::from(f), config));
    display_inspection(&file.display().to_string(), &loaded, missing.as_deref());
    Ok(())
}

/// Expected columns of a format that the table lacks
fn missing_columns(table: &RawTable, format: SourceFormat, config: &VinctlConfig) -> Vec<String> {
    adapter_for(format, &config.ingest)
        .expected_columns()
        .iter()
        .filter(|column| table.column_index(column).is_none())
        .map(|column| column.to_string())
        .collect()
}
