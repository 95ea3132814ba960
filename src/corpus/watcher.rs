//! Corpus file watcher for snapshot reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::corpus::cached::CachedCorpus;
use crate::observability::metrics;

/// Quiet period after the last change event before the snapshot is rebuilt.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Rebuilds a [`CachedCorpus`] snapshot whenever its file changes.
///
/// The parent directory is watched rather than the file itself so that
/// editors which save by renaming a new file into place are still seen.
///
/// Events are debounced: a burst of writes produces one reload once the file
/// has been quiet for the debounce period. An in-place rewrite that pauses
/// longer than that mid-write can still be observed half done; writing a new
/// file and renaming it over the corpus is always safe.
pub struct CorpusWatcher {
    corpus: Arc<CachedCorpus>,
    debounce: Duration,
}

impl CorpusWatcher {
    pub fn new(corpus: Arc<CachedCorpus>) -> Self {
        Self {
            corpus,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    /// Dropping it also stops the reload thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let target = absolute(self.corpus.path())?;
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let watched = target.clone();
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = (event.kind.is_modify() || event.kind.is_create())
                        && event.paths.iter().any(|p| p == &watched);
                    if relevant {
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let corpus = self.corpus;
        let debounce = self.debounce;
        std::thread::Builder::new()
            .name("corpus-reload".into())
            .spawn(move || reload_on_quiet(&corpus, &rx, debounce))
            .map_err(notify::Error::io)?;

        tracing::info!(
            path = %target.display(),
            debounce_ms = debounce.as_millis() as u64,
            "Corpus watcher started"
        );
        Ok(watcher)
    }
}

/// Reload once per burst of change events. Returns when the watcher is dropped.
fn reload_on_quiet(corpus: &CachedCorpus, events: &Receiver<()>, debounce: Duration) {
    while events.recv().is_ok() {
        loop {
            match events.recv_timeout(debounce) {
                Ok(()) => continue,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }

        tracing::info!(path = %corpus.path().display(), "Corpus change detected, reloading...");
        match corpus.reload() {
            Ok(lines) => {
                metrics::record_corpus_reload(true, lines);
                tracing::info!(lines, "Corpus snapshot replaced");
            }
            Err(e) => {
                metrics::record_corpus_reload(false, corpus.snapshot().len());
                tracing::error!("Failed to reload corpus: {}. Keeping current snapshot.", e);
            }
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf, notify::Error> {
    std::fs::canonicalize(path).map_err(notify::Error::io)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reloads_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, "alpha\n").unwrap();

        let corpus = Arc::new(CachedCorpus::open(&path).unwrap());
        let _watcher = CorpusWatcher::new(corpus.clone()).run().unwrap();

        std::fs::write(&path, "alpha\nbeta\n").unwrap();

        let mut seen = false;
        for _ in 0..50 {
            if corpus.contains(b"beta") {
                seen = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(100));
        }
        assert!(seen, "snapshot was not reloaded");
        assert!(corpus.contains(b"alpha"));
    }

    #[test]
    fn in_place_rewrite_reloads_once_settled() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, "alpha\n").unwrap();

        let corpus = Arc::new(CachedCorpus::open(&path).unwrap());
        let _watcher = CorpusWatcher::new(corpus.clone())
            .with_debounce(Duration::from_millis(500))
            .run()
            .unwrap();

        // Truncate, then write the new contents in pieces.
        let mut file = std::fs::File::create(&path).unwrap();
        for line in ["alpha", "beta", "gamma"] {
            std::thread::sleep(Duration::from_millis(30));
            assert!(corpus.contains(b"alpha"), "partial rewrite was swapped in");
            writeln!(file, "{line}").unwrap();
            file.flush().unwrap();
        }
        drop(file);

        let mut settled = false;
        for _ in 0..50 {
            if corpus.contains(b"gamma") {
                settled = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(100));
        }
        assert!(settled, "snapshot was not reloaded");
        assert_eq!(corpus.snapshot().len(), 3);
    }
}
