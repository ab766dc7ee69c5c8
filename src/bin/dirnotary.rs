//! dirnotary CLI Binary
//!
//! Command-line interface for fingerprinting a directory and anchoring its
//! Merkle root on the Factom ledger.

use clap::Parser;
use dirnotary::cli::{map_error, Cli, RunContext};
use dirnotary::error::NotaryError;
use dirnotary::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let context = match RunContext::new(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    let logging = build_logging_config(&cli, &context.config().logging)
        .and_then(|config| init_logging(&config));
    if let Err(e) = logging {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "dirnotary starting");

    match context.execute(&cli.command).await {
        Ok(output) => {
            println!("{}", output.text);
            if output.exit_code != 0 {
                process::exit(output.exit_code);
            }
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Layer command-line logging flags over the `[logging]` config section
fn build_logging_config(cli: &Cli, base: &LoggingConfig) -> Result<LoggingConfig, NotaryError> {
    let mut config = base.clone();

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.parse()?;
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.parse()?;
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }

    Ok(config)
}
