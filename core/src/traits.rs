//! Core traits defining the seams of the ingestion pipeline

use crate::errors::{IngestResult, SinkResult};
use crate::table::RawTable;
use crate::types::{AdaptedTable, CaseId, Edge, SourceFormat};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What an adapter knows about the file it is adapting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    /// Case the edges will belong to
    pub case_id: CaseId,
    /// Original name of the file (may differ from the on-disk path)
    pub file_name: String,
}

impl SourceContext {
    pub fn new(case_id: CaseId, file_name: impl Into<String>) -> Self {
        Self {
            case_id,
            file_name: file_name.into(),
        }
    }
}

/// Maps the columns of one source format onto canonical rows.
///
/// Implementations are stateless apart from their settings: adapting the same
/// table twice yields the same rows.
pub trait FormatAdapter: Send + Sync {
    /// Format handled by this adapter
    fn format(&self) -> SourceFormat;

    /// Columns that must be present for the file to be processed
    fn expected_columns(&self) -> &'static [&'static str];

    /// Convert a raw table into canonical rows grouped by relationship type
    fn adapt(&self, table: &RawTable, source: &SourceContext) -> IngestResult<AdaptedTable>;
}

/// Result of upserting a single edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertOutcome {
    /// The edge was not known before
    Inserted,
    /// An edge with the same identity existed and was replaced
    Updated,
}

/// Totals of a batch upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub inserted: usize,
    pub updated: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Downstream collaborator that persists or transmits edges.
///
/// Implementations are responsible for idempotent upsert: handing the same
/// edge over twice must not create a duplicate.
#[async_trait]
pub trait EdgeSink: Send + Sync {
    /// Insert or update one edge
    async fn upsert_edge(&self, edge: Edge) -> SinkResult<UpsertOutcome>;

    /// Insert or update a batch of edges
    async fn upsert_edges(&self, edges: Vec<Edge>) -> SinkResult<BatchSummary> {
        let mut summary = BatchSummary::default();
        for edge in edges {
            summary.record(self.upsert_edge(edge).await?);
        }
        Ok(summary)
    }

    /// Test that the sink can accept writes
    async fn health_check(&self) -> SinkResult<()> {
        Ok(())
    }
}
