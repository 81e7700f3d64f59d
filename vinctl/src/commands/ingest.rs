//! Ingestion of source extracts into case edges

use crate::config::VinctlConfig;
use crate::output::display_ingest_summary;
use crate::writer::{render_edges, write_to_file};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, info};
use vinculo_adapter_in_memory::{InMemoryConfig, InMemoryEdgeSink};
use vinculo_core::errors::{CoreError, SinkError};
use vinculo_core::prelude::*;

/// A file that could not be ingested
#[derive(Error, Debug)]
pub enum IngestFailure {
    #[error(transparent)]
    Pipeline(#[from] FileFailure),

    #[error("Storing edges of {} failed ({stored} stored in completed batches): {error}", .path.display())]
    Sink {
        path: PathBuf,
        stored: usize,
        #[source]
        error: SinkError,
    },
}

/// Arguments of the ingest command
#[derive(Debug, Clone)]
pub struct IngestArgs {
    pub format: SourceFormat,
    pub files: Vec<PathBuf>,
    pub case: Option<i64>,
    pub name: Option<String>,
    pub output: Option<PathBuf>,
}

/// Handle the ingest command
pub async fn handle_ingest_command(
    args: IngestArgs,
    config: &VinctlConfig,
    quiet: bool,
) -> Result<(), CoreError> {
    if args.name.is_some() && args.files.len() > 1 {
        return Err(CoreError::Configuration(
            "--name can only be used with a single --file".to_string(),
        ));
    }

    let case_id = config.get_case(args.case)?;
    let pipeline = IngestPipeline::new(config.ingest.clone())?;
    let sink = InMemoryEdgeSink::new_with_config(InMemoryConfig {
        max_edges: config.max_edges,
        ..Default::default()
    });

    let requests: Vec<IngestRequest> = args
        .files
        .iter()
        .map(|path| {
            let request = IngestRequest::new(path, args.format, case_id);
            match &args.name {
                Some(name) => request.with_file_name(name),
                None => request,
            }
        })
        .collect();

    info!("Ingesting {} {} file(s) into case {}", requests.len(), args.format, case_id);

    let mut outcomes = Vec::new();
    let mut failures = Vec::new();

    for result in pipeline.run_all(&requests) {
        match result {
            Ok(outcome) => {
                let result = store_edges(&sink, &outcome.edges, config.effective_batch_size()).await;
                match result {
                    Ok(_) => outcomes.push(outcome),
                    Err((stored, error)) => {
                        let failure = IngestFailure::Sink {
                            path: outcome.path,
                            stored,
                            error,
                        };
                        error!("{}", failure);
                        failures.push(failure);
                    }
                }
            }
            Err(failure) => {
                error!("{}", failure);
                failures.push(failure.into());
            }
        }
    }

    let edges = sink.edges_for_case(case_id).await;
    let rendered = render_edges(&edges, config.default_emit)?;

    match &args.output {
        Some(path) => {
            write_to_file(&rendered, path)?;
            info!("Wrote {} edges to {}", edges.len(), path.display());
        }
        None => print!("{}", rendered),
    }

    if !quiet {
        display_ingest_summary(&outcomes, &failures, edges.len());
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Internal(format!(
            "{} of {} file(s) failed to ingest",
            failures.len(),
            requests.len()
        )))
    }
}

/// Hand edges to the sink in batches.
///
/// On failure, returns how many edges the completed batches stored.
async fn store_edges(
    sink: &dyn EdgeSink,
    edges: &[Edge],
    batch_size: usize,
) -> Result<BatchSummary, (usize, SinkError)> {
    let mut total = BatchSummary::default();

    for batch in edges.chunks(batch_size) {
        let summary = sink
            .upsert_edges(batch.to_vec())
            .await
            .map_err(|e| (total.total(), e))?;
        debug!(
            "Stored batch of {} edges ({} inserted, {} updated)",
            batch.len(),
            summary.inserted,
            summary.updated
        );
        total.inserted += summary.inserted;
        total.updated += summary.updated;
    }

    Ok(total)
}
