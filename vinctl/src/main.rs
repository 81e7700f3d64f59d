//! Command-line interface for Vinculo

use clap::Parser;
use std::process;
use tracing::{error, info, Level};

mod cli;
mod commands;
mod config;
mod output;
mod writer;

use cli::*;
use commands::ingest::IngestArgs;
use config::VinctlConfig;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Initialize logging; logs go to stderr so emitted edges stay clean on stdout
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match VinctlConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Override config with CLI args
    let config = config.with_overrides(&args);

    info!("Starting vinctl emitting {}", config.default_emit);

    // Execute command
    let result = match args.command {
        Commands::Ingest {
            format,
            file,
            case,
            name,
            output,
        } => {
            let ingest = IngestArgs {
                format: format.into(),
                files: file,
                case,
                name,
                output,
            };
            commands::ingest::handle_ingest_command(ingest, &config, args.quiet).await
        }
        Commands::Formats => commands::formats::handle_formats_command(&config),
        Commands::Inspect { file, format } => {
            commands::inspect::handle_inspect_command(&file, format, &config)
        }
    };

    match result {
        Ok(_) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            process::exit(1);
        }
    }
}
