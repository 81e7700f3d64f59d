//! CLI argument definitions

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vinculo_core::types::SourceFormat;

#[derive(Parser)]
#[command(name = "vinctl")]
#[command(about = "Vinculo case extract ingestion tool")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Default case ID
    #[arg(short = 'C', long = "default-case", global = true)]
    pub default_case: Option<i64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress summaries (edges are still written)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format for emitted edges
    #[arg(short, long, global = true, value_enum)]
    pub emit: Option<EmitFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Turn source extracts into case edges
    Ingest {
        /// Source format of the files
        #[arg(value_enum)]
        format: FormatArg,
        /// File path(s)
        #[arg(short, long, required = true)]
        file: Vec<PathBuf>,
        /// Case ID the edges belong to
        #[arg(long)]
        case: Option<i64>,
        /// Original file name (single file only)
        #[arg(short, long)]
        name: Option<String>,
        /// Output file path (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List supported source formats
    Formats,
    /// Load a file and describe it without extracting edges
    Inspect {
        /// File path
        #[arg(short, long)]
        file: PathBuf,
        /// Check the file against a source format's expected columns
        #[arg(short = 'F', long, value_enum)]
        format: Option<FormatArg>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    #[value(alias = "simba-extrato")]
    TransactionExtract,
    #[value(alias = "sittel-drt")]
    CallDetail,
    #[value(alias = "sittel-cadastro")]
    SubscriberRegistry,
    #[value(alias = "rif-envolvidos")]
    InvolvementReport,
}

impl From<FormatArg> for SourceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::TransactionExtract => SourceFormat::TransactionExtract,
            FormatArg::CallDetail => SourceFormat::CallDetail,
            FormatArg::SubscriberRegistry => SourceFormat::SubscriberRegistry,
            FormatArg::InvolvementReport => SourceFormat::InvolvementReport,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitFormat {
    Jsonl,
    Cypher,
    Csv,
    Table,
}

impl std::fmt::Display for EmitFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmitFormat::Jsonl => write!(f, "jsonl"),
            EmitFormat::Cypher => write!(f, "cypher"),
            EmitFormat::Csv => write!(f, "csv"),
            EmitFormat::Table => write!(f, "table"),
        }
    }
}
