//! Exact-line string search server.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                 SEARCH SERVER                    │
//!                       │                                                  │
//!   Client query line   │  ┌──────────┐   ┌─────────┐   ┌──────────────┐   │
//!   ────────────────────┼─▶│   net    │──▶│ session │──▶│    corpus    │   │
//!                       │  │listener  │   │ framing │   │ cached or    │   │
//!                       │  │ + tls    │   │ handler │   │ streaming    │   │
//!                       │  └──────────┘   └────┬────┘   └──────┬───────┘   │
//!   Verdict line        │                      │               │           │
//!   ◀───────────────────┼──────────────────────┴───────◀───────┘           │
//!                       │                                                  │
//!                       │  config · lifecycle · observability              │
//!                       └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use string_search_server::config::load_config;
use string_search_server::lifecycle::{prepare, signals, Shutdown};
use string_search_server::observability::{logging, metrics};

/// Exact-line string search server.
#[derive(Debug, Parser)]
#[command(name = "string-search-server", version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!("string-search-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        reread_on_query = config.reread_on_query,
        ssl_enabled = config.ssl_enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let prepared = match prepare(&config).await {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    let _watcher = prepared.watcher;
    prepared.server.run(prepared.listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
