//! File ingestion pipeline: load, adapt, extract

use crate::config::IngestConfig;
use crate::errors::{CoreError, FileFailure, IngestError};
use crate::extract::extract_all;
use crate::formats::adapter_for;
use crate::loader::SourceLoader;
use crate::traits::SourceContext;
use crate::types::{CaseId, Edge, SourceFormat};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Load,
    Adapt,
    Extract,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Load => write!(f, "load"),
            PipelineStage::Adapt => write!(f, "adapt"),
            PipelineStage::Extract => write!(f, "extract"),
        }
    }
}

/// One file to ingest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub case_id: CaseId,
    /// Name the file was uploaded under, when it differs from `path`
    pub file_name: Option<String>,
}

impl IngestRequest {
    pub fn new(path: impl Into<PathBuf>, format: SourceFormat, case_id: CaseId) -> Self {
        Self {
            path: path.into(),
            format,
            case_id,
            file_name: None,
        }
    }

    /// Set the original file name
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Name used for file-name derived values
    pub fn effective_file_name(&self) -> String {
        self.file_name.clone().unwrap_or_else(|| file_name_of(&self.path))
    }

    fn failure(&self, error: IngestError) -> FileFailure {
        FileFailure {
            path: self.path.clone(),
            case_id: self.case_id,
            format: self.format,
            error,
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Report of a successfully ingested file
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub path: PathBuf,
    pub format: SourceFormat,
    pub case_id: CaseId,
    /// Encoding the file was decoded with
    pub encoding: &'static str,
    pub used_fallback_encoding: bool,
    /// Data rows read from the file
    pub rows_read: usize,
    /// Rows the loader could not parse
    pub rows_rejected: usize,
    /// Rows the adapter filtered out
    pub rows_dropped: usize,
    pub edges: Vec<Edge>,
}

/// Runs files through loading, adaptation and extraction
pub struct IngestPipeline {
    config: IngestConfig,
    loader: SourceLoader,
}

impl IngestPipeline {
    /// Create a pipeline from ingestion settings
    pub fn new(config: IngestConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let loader = SourceLoader::new(&config)?;
        Ok(Self { config, loader })
    }

    /// Ingest one file.
    ///
    /// File-level errors abort the file and are returned without partial
    /// output; row-level problems only drop the affected rows.
    pub fn run(&self, request: &IngestRequest) -> Result<IngestOutcome, FileFailure> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let timer = Instant::now();

        let span = info_span!(
            "ingest",
            %run_id,
            case_id = %request.case_id,
            format = %request.format,
            file = %request.path.display()
        );
        let _enter = span.enter();

        debug!("Starting {} stage", PipelineStage::Load);
        let loaded = self.loader.load(&request.path).map_err(|e| {
            error!("{} stage failed: {}", PipelineStage::Load, e);
            request.failure(e)
        })?;

        let source = SourceContext::new(request.case_id, request.effective_file_name());
        let adapter = adapter_for(request.format, &self.config);

        debug!("Starting {} stage", PipelineStage::Adapt);
        let adapted = adapter.adapt(&loaded.table, &source).map_err(|e| {
            error!("{} stage failed: {}", PipelineStage::Adapt, e);
            request.failure(e)
        })?;
        let rows_dropped = adapted.dropped_rows;

        debug!("Starting {} stage", PipelineStage::Extract);
        let edges = extract_all(adapted, request.case_id);

        let rows_rejected = loaded.table.rejected().len();
        if rows_rejected > 0 {
            warn!("{} malformed rows rejected while loading", rows_rejected);
        }

        info!(
            "Produced {} edges from {} rows ({} dropped) in {:?}",
            edges.len(),
            loaded.table.len(),
            rows_dropped,
            timer.elapsed()
        );

        Ok(IngestOutcome {
            run_id,
            started_at,
            path: request.path.clone(),
            format: request.format,
            case_id: request.case_id,
            encoding: loaded.encoding,
            used_fallback_encoding: loaded.used_fallback,
            rows_read: loaded.table.len(),
            rows_rejected,
            rows_dropped,
            edges,
        })
    }

    /// Ingest several files; a failing file never stops the others
    pub fn run_all(&self, requests: &[IngestRequest]) -> Vec<Result<IngestOutcome, FileFailure>> {
        requests.iter().map(|request| self.run(request)).collect()
    }
}
