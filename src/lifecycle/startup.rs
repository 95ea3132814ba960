//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the corpus store for the configured strategy
//! - Load TLS material when SSL is enabled
//! - Bind the listener last, so traffic only arrives once everything is ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::path::Path;

use notify::RecommendedWatcher;

use crate::config::ServerConfig;
use crate::corpus::{CorpusStore, CorpusWatcher, Strategy};
use crate::error::StartupError;
use crate::net::{Listener, Transport};
use crate::observability::metrics;
use crate::server::SearchServer;

/// A fully initialized server, bound but not yet accepting.
pub struct Prepared {
    pub server: SearchServer,
    pub listener: Listener,
    /// Keeps the corpus watcher alive when `watch_corpus` is on.
    pub watcher: Option<RecommendedWatcher>,
}

/// Initialize every subsystem from `config`.
pub async fn prepare(config: &ServerConfig) -> Result<Prepared, StartupError> {
    let strategy = Strategy::from_reread(config.reread_on_query);
    let corpus = CorpusStore::open(Path::new(&config.linuxpath), strategy)?;

    let watcher = match &corpus {
        CorpusStore::Cached(cached) => {
            metrics::record_corpus_size(cached.snapshot().len());
            if config.watch_corpus {
                Some(CorpusWatcher::new(cached.clone()).run()?)
            } else {
                None
            }
        }
        CorpusStore::Streaming(_) => None,
    };

    let transport = Transport::from_config(config.ssl_enabled, config.tls.as_ref())
        .await
        .map_err(StartupError::Tls)?;

    let listener = Listener::bind(&config.listener).await?;

    tracing::info!(
        strategy = %strategy,
        corpus = %config.linuxpath,
        ssl_enabled = config.ssl_enabled,
        "Startup complete"
    );

    Ok(Prepared {
        server: SearchServer::new(corpus, transport, config.session.clone()),
        listener,
        watcher,
    })
}
