//! Configuration management for vinctl

use crate::cli::{Cli, EmitFormat};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vinculo_core::config::IngestConfig;
use vinculo_core::errors::CoreError;
use vinculo_core::types::CaseId;

/// Configuration for vinctl CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VinctlConfig {
    /// Decoding and normalization settings
    pub ingest: IngestConfig,
    /// Case used when a command does not name one
    pub default_case: Option<i64>,
    /// Default output format for emitted edges
    pub default_emit: EmitFormat,
    /// Number of edges handed to the sink per batch
    pub batch_size: usize,
    /// Distinct edges the sink may hold; unlimited when absent
    pub max_edges: Option<usize>,
}

impl Default for VinctlConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            default_case: None,
            default_emit: EmitFormat::Jsonl,
            batch_size: 500,
            max_edges: Some(500_000),
        }
    }
}

impl VinctlConfig {
    /// Load configuration from defaults, file and environment
    pub fn load(config_path: &Option<PathBuf>) -> Result<Self, CoreError> {
        let mut figment = Figment::from(Serialized::defaults(VinctlConfig::default()));

        // Load from default config file if it exists
        let default_config_paths = ["vinctl.yaml", "vinctl.yml", ".vinctl.yaml", ".vinctl.yml"];

        for path in &default_config_paths {
            if Path::new(path).exists() {
                figment = figment.merge(Yaml::file(path));
                break;
            }
        }

        // Load from specified config file
        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Yaml::file(path));
            } else {
                return Err(CoreError::Configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }

        // Environment variables, e.g. VINCTL_DEFAULT_CASE or VINCTL_INGEST__DELIMITER
        figment = figment.merge(Env::prefixed("VINCTL_").split("__"));

        let config: VinctlConfig = figment
            .extract()
            .map_err(|e| CoreError::Configuration(format!("Failed to parse configuration: {}", e)))?;

        config.ingest.validate()?;
        Ok(config)
    }

    /// Apply CLI argument overrides to the configuration
    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if let Some(case) = args.default_case {
            self.default_case = Some(case);
        }

        if let Some(emit) = args.emit {
            self.default_emit = emit;
        }

        self
    }

    /// Get the case ID to use for operations
    pub fn get_case(&self, override_case: Option<i64>) -> Result<CaseId, CoreError> {
        override_case
            .or(self.default_case)
            .map(CaseId::new)
            .ok_or_else(|| {
                CoreError::Configuration(
                    "No case specified. Use --case or set default_case in config".to_string(),
                )
            })
    }

    /// Batch size, never zero
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}
