//! Subcommand implementations

pub mod formats;
pub mod ingest;
pub mod inspect;
