//! Structured logging on stderr via `tracing`.
//!
//! Stdout is reserved for telemetry output, so every layer writes to stderr.
//! `RUST_LOG` overrides the configured level, e.g.
//! `RUST_LOG=deferred_capture=debug`.

use std::sync::OnceLock;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::core::config::{LogConfig, LogFormat};
use crate::core::errors::{DcapError, Result};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber. Calling it again is a no-op.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    if LOGGING_INITIALIZED.get().is_some() {
        return Ok(());
    }

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|err| DcapError::InvalidConfig {
            details: format!("log.level {:?}: {err}", config.level),
        })?,
    };

    let installed = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(true),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .try_init(),
    };

    installed.map_err(|err| DcapError::Runtime {
        details: format!("failed to install log subscriber: {err}"),
    })?;
    let _ = LOGGING_INITIALIZED.set(());
    Ok(())
}
