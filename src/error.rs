//! Fatal startup errors.

use thiserror::Error;

use crate::config::ConfigError;
use crate::corpus::CorpusError;
use crate::net::ListenerError;

/// Anything that stops the server from starting. None of these are retried.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("corpus unavailable: {0}")]
    Corpus(#[from] CorpusError),

    #[error("TLS setup failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error("listener error: {0}")]
    Listener(#[from] ListenerError),

    #[error("corpus watcher failed to start: {0}")]
    Watcher(#[from] notify::Error),
}
