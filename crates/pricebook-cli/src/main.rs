//! # pricebook: Command Line Front-End
//!
//! A thin orchestration layer over `pricebook-core`: parse arguments, load
//! configuration, install logging, run one command, print JSON.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Load CliConfig under a bootstrap subscriber (RUST_LOG or default)   │
//! │  3. Install tracing subscriber (RUST_LOG or logging.filter)             │
//! │  4. Run the command                                                     │
//! │  5. stdout: JSON result           stderr: JSON error body + exit code   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod config;
mod error;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::config::{CliConfig, LoggingSettings};
use crate::error::{CliError, CliResult};

/// Precise decimal amounts for the product catalog
#[derive(Parser, Debug)]
#[command(name = "pricebook", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Subscriber active while the configuration itself is being loaded.
///
/// Uses the default logging filter since `logging.filter` is not known yet.
fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&LoggingSettings::default().filter))
        .with_writer(std::io::stderr)
        .finish()
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over the configured filter. Logs go to stderr so stdout
/// stays machine-readable.
fn init_tracing(config: &CliConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();
}

fn render(value: &serde_json::Value, pretty: bool) -> CliResult<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

fn report(err: &CliError, pretty: bool) -> ExitCode {
    if err.code() == error::ErrorCode::Internal {
        error!(error = %err, "Command failed");
    }

    let body = serde_json::to_value(err.to_body()).unwrap_or_default();
    match render(&body, pretty) {
        Ok(rendered) => eprintln!("{rendered}"),
        Err(_) => eprintln!("{err}"),
    }
    // exit codes are small positive constants
    ExitCode::from(err.exit_code() as u8)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = tracing::subscriber::with_default(bootstrap_subscriber(), || {
        CliConfig::load(cli.config)
    });
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            init_tracing(&CliConfig::default());
            return report(&err, true);
        }
    };
    init_tracing(&config);

    info!("Starting pricebook v{}", env!("CARGO_PKG_VERSION"));

    let pretty = config.output.pretty;
    match commands::run(cli.command, &config).and_then(|value| render(&value, pretty)) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => report(&err, pretty),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_subscriber_records_config_logs() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let enabled = tracing::subscriber::with_default(bootstrap_subscriber(), || {
            tracing::enabled!(target: "pricebook::config", tracing::Level::DEBUG)
        });
        assert!(enabled);
    }

    #[test]
    fn test_cli_parses_global_config() {
        let cli = Cli::parse_from(["pricebook", "--config", "rates.toml", "currencies"]);
        assert_eq!(cli.config, Some(PathBuf::from("rates.toml")));
    }
}
