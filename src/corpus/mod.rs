//! Corpus store subsystem.
//!
//! # Data Flow
//! ```text
//! Query line (terminator stripped)
//!     → CorpusStore::contains
//!         - cached.rs    (HashSet lookup in an immutable snapshot)
//!         - streaming.rs (fresh file handle, scan until match or EOF)
//!     → bool (line present / absent)
//! ```
//!
//! # Design Decisions
//! - Strategy is fixed at startup from `reread_on_query`
//! - Matching is exact byte equality; only `\n` / `\r\n` is stripped
//! - Snapshots are never mutated; a reload replaces the whole snapshot
//! - Streaming mode shares no state between queries

pub mod cached;
pub mod lines;
pub mod streaming;
pub mod watcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

pub use cached::{CachedCorpus, Snapshot};
pub use streaming::StreamingCorpus;
pub use watcher::CorpusWatcher;

/// Errors raised while reading the corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus file could not be opened or read.
    #[error("failed to read corpus {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which lookup strategy a store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Cached,
    Streaming,
}

impl Strategy {
    pub fn from_reread(reread_on_query: bool) -> Self {
        if reread_on_query {
            Strategy::Streaming
        } else {
            Strategy::Cached
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Cached => "cached",
            Strategy::Streaming => "streaming",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact-line lookup against the configured corpus.
///
/// Cheap to clone; every session holds its own handle.
#[derive(Debug, Clone)]
pub enum CorpusStore {
    Cached(Arc<CachedCorpus>),
    Streaming(StreamingCorpus),
}

impl CorpusStore {
    /// Build the store for `strategy`.
    ///
    /// The cached strategy reads the whole corpus here and fails if it can't.
    pub fn open(path: &Path, strategy: Strategy) -> Result<Self, CorpusError> {
        match strategy {
            Strategy::Cached => Ok(CorpusStore::Cached(Arc::new(CachedCorpus::open(path)?))),
            Strategy::Streaming => Ok(CorpusStore::Streaming(StreamingCorpus::new(path))),
        }
    }

    /// Is `line` present verbatim as a line of the corpus?
    pub async fn contains(&self, line: &[u8]) -> Result<bool, CorpusError> {
        match self {
            CorpusStore::Cached(cached) => Ok(cached.contains(line)),
            CorpusStore::Streaming(streaming) => streaming.contains(line).await,
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            CorpusStore::Cached(_) => Strategy::Cached,
            CorpusStore::Streaming(_) => Strategy::Streaming,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            CorpusStore::Cached(cached) => cached.path(),
            CorpusStore::Streaming(streaming) => streaming.path(),
        }
    }
}
