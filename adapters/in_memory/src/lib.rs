//! In-memory implementation of EdgeSink for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use vinculo_core::errors::{SinkError, SinkResult};
use vinculo_core::prelude::*;
use vinculo_core::types::EdgeKey;

/// Configuration for in-memory sink
#[derive(Debug, Clone)]
pub struct InMemoryConfig {
    /// Maximum number of distinct edges to store
    pub max_edges: Option<usize>,
    /// Whether to enable verbose logging
    pub verbose: bool,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            max_edges: Some(500_000),
            verbose: false,
        }
    }
}

/// In-memory edge store
#[derive(Debug, Default)]
struct EdgeStore {
    /// Edge identity -> current edge
    edges: HashMap<EdgeKey, Edge>,
    /// Index: case -> edge identities in first-insertion order
    by_case: HashMap<CaseId, Vec<EdgeKey>>,
}

impl EdgeStore {
    fn len(&self) -> usize {
        self.edges.len()
    }

    fn upsert(&mut self, edge: Edge) -> UpsertOutcome {
        let key = edge.key();
        if let Some(stored) = self.edges.get_mut(&key) {
            *stored = edge;
            return UpsertOutcome::Updated;
        }

        self.by_case.entry(edge.case_id).or_default().push(key.clone());
        self.edges.insert(key, edge);
        UpsertOutcome::Inserted
    }

    fn case_edges(&self, case_id: CaseId) -> Vec<Edge> {
        self.by_case
            .get(&case_id)
            .map(|keys| keys.iter().filter_map(|key| self.edges.get(key).cloned()).collect())
            .unwrap_or_default()
    }

    fn remove_case(&mut self, case_id: CaseId) -> usize {
        let keys = self.by_case.remove(&case_id).unwrap_or_default();
        for key in &keys {
            self.edges.remove(key);
        }
        keys.len()
    }
}

/// Counts reported by [`InMemoryEdgeSink::stats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub edges: usize,
    pub cases: usize,
}

/// In-memory EdgeSink implementation.
///
/// Edges are identified by case, endpoints and relationship type; upserting
/// an edge that is already stored replaces its attributes.
pub struct InMemoryEdgeSink {
    store: Arc<RwLock<EdgeStore>>,
    config: InMemoryConfig,
}

impl InMemoryEdgeSink {
    /// Create a new in-memory sink
    pub fn new() -> Self {
        Self::new_with_config(InMemoryConfig::default())
    }

    /// Create a new in-memory sink with configuration
    pub fn new_with_config(config: InMemoryConfig) -> Self {
        info!("Creating in-memory edge sink with config: {:?}", config);
        Self {
            store: Arc::new(RwLock::new(EdgeStore::default())),
            config,
        }
    }

    /// Edges stored for a case, in first-insertion order
    pub async fn edges_for_case(&self, case_id: CaseId) -> Vec<Edge> {
        self.store.read().await.case_edges(case_id)
    }

    /// Get statistics about the sink
    pub async fn stats(&self) -> SinkStats {
        let store = self.store.read().await;
        SinkStats {
            edges: store.len(),
            cases: store.by_case.len(),
        }
    }

    /// Remove every edge of a case, returning how many were removed
    pub async fn clear_case(&self, case_id: CaseId) -> usize {
        let removed = self.store.write().await.remove_case(case_id);
        info!("Cleared {} edges of case {}", removed, case_id);
        removed
    }
}

impl Default for InMemoryEdgeSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EdgeSink for InMemoryEdgeSink {
    async fn upsert_edge(&self, edge: Edge) -> SinkResult<UpsertOutcome> {
        let mut store = self.store.write().await;

        if self.config.verbose {
            debug!(
                "Upserting {} edge {} -> {} for case {}",
                edge.relation_type, edge.source_entity_id, edge.target_entity_id, edge.case_id
            );
        }

        if let Some(max_edges) = self.config.max_edges {
            if store.len() >= max_edges && !store.edges.contains_key(&edge.key()) {
                return Err(SinkError::CapacityExceeded(format!(
                    "Maximum edge limit ({}) reached",
                    max_edges
                )));
            }
        }

        Ok(store.upsert(edge))
    }

    async fn health_check(&self) -> SinkResult<()> {
        let stats = self.stats().await;
        debug!("In-memory sink health check: {} edges in {} cases", stats.edges, stats.cases);
        Ok(())
    }
}
