//! In-memory lookup strategy.
//!
//! The corpus is read once into a [`Snapshot`]. Readers load the current
//! snapshot through an [`ArcSwap`] cell, so lookups never take a lock and a
//! reload replaces the whole set at once instead of editing it in place.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::corpus::lines::split_lines;
use crate::corpus::CorpusError;

/// Immutable set of corpus lines.
#[derive(Debug, Default)]
pub struct Snapshot {
    lines: HashSet<Vec<u8>>,
}

impl Snapshot {
    /// Read and index the file at `path`.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let data = std::fs::read(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(&data))
    }

    /// Index raw corpus bytes. Duplicate lines collapse.
    pub fn from_bytes(data: &[u8]) -> Self {
        let lines = split_lines(data).map(<[u8]>::to_vec).collect();
        Self { lines }
    }

    pub fn contains(&self, line: &[u8]) -> bool {
        self.lines.contains(line)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cached corpus shared by every session.
#[derive(Debug)]
pub struct CachedCorpus {
    path: PathBuf,
    snapshot: ArcSwap<Snapshot>,
}

impl CachedCorpus {
    /// Build the initial snapshot. Fails if the corpus cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CorpusError> {
        let path = path.into();
        let snapshot = Snapshot::load(&path)?;

        tracing::info!(
            path = %path.display(),
            lines = snapshot.len(),
            "Corpus snapshot loaded"
        );

        Ok(Self {
            path,
            snapshot: ArcSwap::from_pointee(snapshot),
        })
    }

    pub fn contains(&self, line: &[u8]) -> bool {
        self.snapshot.load().contains(line)
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// Re-read the corpus and swap the new snapshot in.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self) -> Result<usize, CorpusError> {
        let snapshot = Snapshot::load(&self.path)?;
        let len = snapshot.len();
        self.snapshot.store(Arc::new(snapshot));
        Ok(len)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn corpus(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn exact_line_membership() {
        let file = corpus("apple\nbanana\ncarrot");
        let cached = CachedCorpus::open(file.path()).unwrap();

        assert!(cached.contains(b"banana"));
        assert!(cached.contains(b"carrot"));
        assert!(!cached.contains(b"grape"));
        assert!(!cached.contains(b"banan"));
        assert!(!cached.contains(b"Banana"));
        assert!(!cached.contains(b""));
    }

    #[test]
    fn duplicates_collapse() {
        let snapshot = Snapshot::from_bytes(b"a\nb\na\na\n");
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn blank_line_is_matchable_when_present() {
        let snapshot = Snapshot::from_bytes(b"a\n\nb\n");
        assert!(snapshot.contains(b""));
    }

    #[test]
    fn empty_file_has_no_lines() {
        let file = corpus("");
        let cached = CachedCorpus::open(file.path()).unwrap();

        assert!(cached.snapshot().is_empty());
        assert!(!cached.contains(b""));
        assert!(!Snapshot::from_bytes(b"\n").is_empty());
    }

    #[test]
    fn missing_file_fails_to_open() {
        let err = CachedCorpus::open("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, CorpusError::Read { .. }));
    }

    #[test]
    fn edits_invisible_until_reload() {
        let mut file = corpus("alpha\n");
        let cached = CachedCorpus::open(file.path()).unwrap();

        writeln!(file, "beta").unwrap();
        file.flush().unwrap();
        assert!(!cached.contains(b"beta"));

        assert_eq!(cached.reload().unwrap(), 2);
        assert!(cached.contains(b"beta"));
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, "alpha\n").unwrap();
        let cached = CachedCorpus::open(&path).unwrap();

        std::fs::remove_file(&path).unwrap();
        assert!(cached.reload().is_err());
        assert!(cached.contains(b"alpha"));
    }
}
