//! Tracing setup for the CLI
//!
//! Logs always go to stderr; stdout carries command output such as the
//! release manifest.

use crate::core::error::{RailError, RailResult};
use std::io;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum LogFormat {
  /// Multi-line human-readable output
  Pretty,
  /// Single-line output
  #[default]
  Compact,
  /// One JSON object per event
  Json,
}

/// Minimum level to log
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum LogLevel {
  Trace,
  Debug,
  Info,
  #[default]
  Warn,
  Error,
}

impl From<LogLevel> for Level {
  fn from(level: LogLevel) -> Self {
    match level {
      LogLevel::Trace => Level::TRACE,
      LogLevel::Debug => Level::DEBUG,
      LogLevel::Info => Level::INFO,
      LogLevel::Warn => Level::WARN,
      LogLevel::Error => Level::ERROR,
    }
  }
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init(level: LogLevel, format: LogFormat) -> RailResult<()> {
  let level = Level::from(level);
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(format!("monotag={}", level.as_str().to_lowercase())))
    .map_err(|e| RailError::message(format!("Failed to create log filter: {}", e)))?;

  let registry = tracing_subscriber::registry().with(filter);

  match format {
    LogFormat::Pretty => {
      let layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(io::stderr)
        .with_target(true);
      registry.with(layer).init();
    }
    LogFormat::Compact => {
      let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false);
      registry.with(layer).init();
    }
    LogFormat::Json => {
      let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(io::stderr)
        .with_current_span(true);
      registry.with(layer).init();
    }
  }

  tracing::debug!(version = env!("CARGO_PKG_VERSION"), ?format, "logging initialized");
  Ok(())
}
