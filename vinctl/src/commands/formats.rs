//! Listing of supported source formats

use crate::config::VinctlConfig;
use crate::output::display_formats;
use vinculo_core::errors::CoreError;
use vinculo_core::formats::adapter_for;
use vinculo_core::types::SourceFormat;

/// Handle the formats command
pub fn handle_formats_command(config: &VinctlConfig) -> Result<(), CoreError> {
    let formats: Vec<(SourceFormat, &'static [&'static str])> = SourceFormat::ALL
        .iter()
        .map(|&format| (format, adapter_for(format, &config.ingest).expected_columns()))
        .collect();

    display_formats(&formats);
    Ok(())
}
