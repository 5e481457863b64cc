//! Command line and logging setup for the `edutrackd` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "EDUTRACK_LOG";
const DEFAULT_FILTER: &str = "edutrackd=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// School portal sidecar: JSON requests on stdin, one response per line on stdout.
#[derive(Debug, Parser)]
#[command(name = "edutrackd", version, about)]
pub struct Cli {
    /// Directory holding the session database; opened at start-up
    #[arg(short, long, env = "EDUTRACK_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "EDUTRACK_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Start with an empty repository instead of the demo data
    #[arg(long)]
    pub no_fixtures: bool,
}

/// Logs go to stderr; stdout carries the protocol.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.into());

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}
