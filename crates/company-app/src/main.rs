//! # Company Directory
//!
//! Entry point: parses flags, loads configuration, wires the adapters
//! into the directory service and runs it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  main.rs (this file) - Flags, config, logging                   │
//! │    │                                                            │
//! │    ├── wiring.rs: InMemory stores + resolver (adapter)          │
//! │    │              AuditTrail, QueuedTelemetry, PermitAll        │
//! │    │              InMemorySharedCache (push mode only)          │
//! │    │              CompanyDirectory (use case)                   │
//! │    └── demo.rs:   one pass over every operation                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage:
//!   company-directory                       - Run the demo with defaults
//!   company-directory --config dir.yaml     - Load YAML or JSON config
//!   company-directory --mode push-invalidation
//!   company-directory --no-cache
//!   company-directory config                - Print the effective config

mod demo;
mod wiring;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use shared::{CoherenceSetting, ServiceConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::wiring::Wiring;

#[derive(Parser)]
#[command(name = "company-directory")]
#[command(about = "Company directory service with a versioned local cache")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable the local cache, every read goes to the store
    #[arg(long, global = true)]
    no_cache: bool,

    /// Cache coherence mode, overrides the config file
    #[arg(short, long, global = true, value_enum)]
    mode: Option<ModeArg>,

    /// Acting user for the demo requests
    #[arg(long, global = true)]
    actor: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every directory operation once against in-memory stores
    Demo,
    /// Print the effective configuration as JSON
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    SelfVersioning,
    PushInvalidation,
}

impl From<ModeArg> for CoherenceSetting {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::SelfVersioning => CoherenceSetting::SelfVersioning,
            ModeArg::PushInvalidation => CoherenceSetting::PushInvalidation,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };

    if cli.no_cache {
        config.cache.enabled = false;
    }
    if let Some(mode) = cli.mode {
        config.cache.mode = mode.into();
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Demo => {
            let (wiring, worker) = Wiring::build(&config);
            let telemetry_task = tokio::spawn(worker.run());

            demo::run(&wiring, cli.actor.as_deref()).await?;

            // Dropping every sender lets the worker drain and stop
            let dropped = wiring.telemetry.dropped();
            drop(wiring);
            let delivered = telemetry_task.await?;
            info!(delivered, dropped, "telemetry flushed");
        }
    }

    Ok(())
}
