//! Accept loop.
//!
//! # Responsibilities
//! - Accept connections from the bounded listener
//! - Spawn one task per connection
//! - Run the optional TLS handshake inside that task
//! - Stop accepting on shutdown signal

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::config::SessionConfig;
use crate::corpus::CorpusStore;
use crate::net::{ConnectionPermit, ConnectionTracker, Listener, ListenerError, Transport};
use crate::observability::metrics;
use crate::session::Session;

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Exact-line search server.
pub struct SearchServer {
    corpus: CorpusStore,
    transport: Transport,
    session: SessionConfig,
    tracker: ConnectionTracker,
}

impl SearchServer {
    pub fn new(corpus: CorpusStore, transport: Transport, session: SessionConfig) -> Self {
        Self {
            corpus,
            transport,
            session,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Tracker counting this server's open connections.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Run the accept loop until `shutdown` fires.
    ///
    /// Sessions still open at that point are not drained; they end when the
    /// runtime does.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Accept)?;
        tracing::info!(
            address = %addr,
            strategy = %self.corpus.strategy(),
            corpus = %self.corpus.path().display(),
            tls = self.transport.is_tls(),
            "Search server starting"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => self.spawn_connection(stream, peer, permit),
                    Err(ListenerError::Accept(e)) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                    Err(e) => return Err(e),
                },
            }
        }

        tracing::info!(
            active_connections = self.tracker.active_count(),
            "Search server stopped"
        );
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr, permit: ConnectionPermit) {
        let guard = self.tracker.track();
        let transport = self.transport.clone();
        let corpus = self.corpus.clone();
        let session_config = self.session.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let id = guard.id();

            let stream = match transport.establish(stream).await {
                Ok(stream) => stream,
                Err(e) => {
                    metrics::record_handshake_failure();
                    tracing::warn!(
                        connection_id = %id,
                        peer_addr = %peer,
                        error = %e,
                        "TLS handshake failed, dropping connection"
                    );
                    return;
                }
            };

            tracing::debug!(connection_id = %id, peer_addr = %peer, "Session started");
            let reason = Session::new(id, peer, stream, corpus, &session_config)
                .run()
                .await;
            metrics::record_session_closed(reason.as_label());
            drop(guard);
        });
    }
}
