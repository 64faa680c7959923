//! Top-level CLI definition and dispatch.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::json;

use crate::analytics;
use crate::core::config::{AppConfig, LogFormat};
use crate::core::errors::{DcapError, Result};
use crate::logger;
use crate::replay;
use crate::sinks::JsonlSink;

/// Deferred capture: buffers analytics until the user is identified.
#[derive(Debug, Parser)]
#[command(name = "dcap", version, about)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured log level (e.g. `debug`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a JSONL session of analytics events and identity signals.
    Replay(ReplayArgs),
    /// Validate configuration and print a summary.
    CheckConfig,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Session file to read (stdin when omitted).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Where to write telemetry envelopes (stdout when omitted).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Forward hits immediately instead of waiting for an identity.
    #[arg(long)]
    pub no_defer: bool,
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log.level.clone_from(level);
    }
    if cli.json_logs {
        config.log.format = LogFormat::Json;
    }
    logger::init_logging(&config.log)?;

    match &cli.command {
        Command::Replay(args) => run_replay(config, args),
        Command::CheckConfig => run_check_config(&config),
    }
}

fn run_replay(mut config: AppConfig, args: &ReplayArgs) -> Result<()> {
    if args.no_defer {
        config.capture.defer = false;
    }

    let writer: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(File::create(path).map_err(|err| DcapError::io(path, err))?),
        None => Box::new(io::stdout()),
    };
    let key = config
        .app
        .analytics
        .azure
        .as_ref()
        .and_then(|azure| azure.instrumentation_key());
    let sink = JsonlSink::new(writer).with_instrumentation_key(key);
    let api = analytics::from_config(&config, sink);

    let summary = match &args.input {
        Some(path) => {
            let file = File::open(path).map_err(|err| DcapError::io(path, err))?;
            replay::replay(api.as_ref(), BufReader::new(file))?
        }
        None => replay::replay(api.as_ref(), io::stdin().lock())?,
    };
    tracing::info!(
        events = summary.events,
        identities = summary.identities,
        pending = summary.pending,
        dropped = summary.dropped,
        "replay finished"
    );

    if summary.dropped > 0 {
        return Err(DcapError::BacklogOverflow {
            dropped: summary.dropped,
        });
    }

    if summary.pending > 0 {
        return Err(DcapError::Identity {
            details: format!(
                "input ended before the user was identified; {} hits never sent",
                summary.pending
            ),
        });
    }
    Ok(())
}

fn run_check_config(config: &AppConfig) -> Result<()> {
    config.validate()?;
    let azure = config.app.analytics.azure.as_ref();
    let backend = if azure.is_some() { "azure" } else { "disabled" };
    let has_key = azure
        .and_then(|azure| azure.instrumentation_key())
        .is_some();
    let summary = json!({
        "analytics": backend,
        "instrumentationKey": has_key,
        "defer": config.capture.defer,
        "maxBacklog": config.capture.max_backlog,
        "log": config.log,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
