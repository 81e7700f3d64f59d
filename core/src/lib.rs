//! # Vinculo Core
//!
//! Normalization pipeline that turns investigative tabular extracts (bank
//! transaction extracts, call detail records, subscriber registries and
//! financial-intelligence involvement reports) into uniform, case-scoped
//! edges ready for a graph store.
//!
//! The flow for one file is [`loader::SourceLoader`] → a
//! [`traits::FormatAdapter`] → [`extract::extract`], driven by
//! [`pipeline::IngestPipeline`]. Persistence is left to an
//! [`traits::EdgeSink`] implementation.

pub mod config;
pub mod errors;
pub mod extract;
pub mod formats;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod table;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use config::IngestConfig;
pub use errors::{CoreError, ErrorKind, FileFailure, IngestError, SinkError};
pub use pipeline::{IngestOutcome, IngestPipeline, IngestRequest};
pub use traits::{BatchSummary, EdgeSink, FormatAdapter, SourceContext, UpsertOutcome};
pub use types::{CaseId, Edge, RelationType, SourceFormat};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::errors::*;
    pub use crate::pipeline::*;
    pub use crate::traits::*;
    pub use crate::types::*;
    pub use async_trait::async_trait;
}
