//! Per-connection request/response loop.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::SessionConfig;
use crate::corpus::CorpusStore;
use crate::net::connection::ConnectionId;
use crate::observability::metrics;
use crate::session::framing::{FrameError, QueryReader, Verdict};

/// Where a session is in its query cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the next query line.
    AwaitingQuery,
    /// Query handed to the corpus store.
    Dispatched,
    /// Verdict written and flushed.
    Responded,
    /// Stream finished; terminal.
    Closed,
}

/// Why a session ended.
#[derive(Debug)]
pub enum CloseReason {
    /// Peer closed its side of the stream.
    PeerClosed,
    /// A query exceeded the configured maximum length.
    QueryTooLong,
    /// No query arrived within the idle timeout.
    IdleTimeout,
    /// Reading or writing the stream failed.
    Io(std::io::Error),
}

impl CloseReason {
    pub fn as_label(&self) -> &'static str {
        match self {
            CloseReason::PeerClosed => "peer_closed",
            CloseReason::QueryTooLong => "query_too_long",
            CloseReason::IdleTimeout => "idle_timeout",
            CloseReason::Io(_) => "io_error",
        }
    }
}

/// One client connection and the loop that serves it.
pub struct Session<S> {
    id: ConnectionId,
    peer: SocketAddr,
    reader: QueryReader<BufReader<tokio::io::ReadHalf<S>>>,
    writer: tokio::io::WriteHalf<S>,
    corpus: CorpusStore,
    idle_timeout: Option<Duration>,
    state: SessionState,
    queries: u64,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        id: ConnectionId,
        peer: SocketAddr,
        stream: S,
        corpus: CorpusStore,
        config: &SessionConfig,
    ) -> Self {
        let (read_half, writer) = tokio::io::split(stream);
        Self {
            id,
            peer,
            reader: QueryReader::new(BufReader::new(read_half), config.max_query_bytes),
            writer,
            corpus,
            idle_timeout: config.idle_timeout(),
            state: SessionState::AwaitingQuery,
            queries: 0,
        }
    }

    /// Serve queries until the stream ends. Never returns an error: every
    /// failure is local to this session and reported as a [`CloseReason`].
    pub async fn run(mut self) -> CloseReason {
        let reason = self.serve().await;
        self.transition(SessionState::Closed);
        let _ = self.writer.shutdown().await;

        match &reason {
            CloseReason::Io(e) => tracing::warn!(
                connection_id = %self.id,
                peer_addr = %self.peer,
                queries = self.queries,
                error = %e,
                "Session closed on I/O error"
            ),
            other => tracing::debug!(
                connection_id = %self.id,
                peer_addr = %self.peer,
                queries = self.queries,
                reason = other.as_label(),
                "Session closed"
            ),
        }
        reason
    }

    async fn serve(&mut self) -> CloseReason {
        loop {
            self.transition(SessionState::AwaitingQuery);

            let query = match self.read_query().await {
                Ok(Some(query)) => query,
                Ok(None) => return CloseReason::PeerClosed,
                Err(reason) => return reason,
            };

            self.transition(SessionState::Dispatched);
            let verdict = self.lookup(&query).await;

            if let Err(e) = self.respond(verdict).await {
                return CloseReason::Io(e);
            }
            self.queries += 1;
            self.transition(SessionState::Responded);
        }
    }

    async fn read_query(&mut self) -> Result<Option<Vec<u8>>, CloseReason> {
        let next = match self.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.reader.next_query()).await {
                Ok(next) => next,
                Err(_) => return Err(CloseReason::IdleTimeout),
            },
            None => self.reader.next_query().await,
        };

        next.map_err(|e| match e {
            FrameError::TooLong { max } => {
                tracing::warn!(
                    connection_id = %self.id,
                    peer_addr = %self.peer,
                    max_bytes = max,
                    "Query too long, closing connection"
                );
                CloseReason::QueryTooLong
            }
            FrameError::Io(e) => CloseReason::Io(e),
        })
    }

    /// Look `query` up, failing closed on corpus read errors.
    async fn lookup(&self, query: &[u8]) -> Verdict {
        let strategy = self.corpus.strategy();
        let start = Instant::now();

        let found = match self.corpus.contains(query).await {
            Ok(found) => found,
            Err(e) => {
                metrics::record_lookup_error();
                tracing::error!(
                    connection_id = %self.id,
                    peer_addr = %self.peer,
                    error = %e,
                    "Corpus lookup failed, answering not found"
                );
                false
            }
        };

        let verdict = Verdict::from_found(found);
        let latency = start.elapsed();
        metrics::record_query(strategy.as_str(), verdict.as_label(), latency);

        tracing::debug!(
            connection_id = %self.id,
            peer_addr = %self.peer,
            query = %String::from_utf8_lossy(query),
            verdict = %verdict,
            latency_ms = latency.as_secs_f64() * 1000.0,
            strategy = %strategy,
            "Query handled"
        );
        verdict
    }

    async fn respond(&mut self, verdict: Verdict) -> Result<(), std::io::Error> {
        self.writer.write_all(verdict.as_bytes()).await?;
        self.writer.flush().await
    }

    fn transition(&mut self, next: SessionState) {
        tracing::trace!(
            connection_id = %self.id,
            from = ?self.state,
            to = ?next,
            "Session state change"
        );
        self.state = next;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}
