//! Re-read lookup strategy.
//!
//! Every lookup opens its own handle and scans the file top to bottom, so
//! edits made to the corpus while the server runs are visible to the next
//! query. The handle is owned by the lookup future and dropped on every
//! return path.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::corpus::lines::strip_terminator;
use crate::corpus::CorpusError;

const READ_BUFFER_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct StreamingCorpus {
    path: PathBuf,
}

impl StreamingCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Corpus file does not exist yet; lookups will report not found until it does"
            );
        }
        Self { path }
    }

    /// Scan the corpus for a line equal to `query`.
    ///
    /// Lines longer than `query` plus a `\r\n` terminator cannot match, so
    /// they are skipped without being buffered.
    pub async fn contains(&self, query: &[u8]) -> Result<bool, CorpusError> {
        let file = File::open(&self.path).await.map_err(|e| self.read_error(e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_BYTES, file);
        let limit = query.len() + 2;
        let mut line = Vec::with_capacity(limit);
        let mut oversized = false;

        loop {
            let available = reader.fill_buf().await.map_err(|e| self.read_error(e))?;
            if available.is_empty() {
                // Final line without a terminator.
                return Ok(!oversized && !line.is_empty() && strip_terminator(&line) == query);
            }

            let (take, complete) = match available.iter().position(|b| *b == b'\n') {
                Some(end) => (end + 1, true),
                None => (available.len(), false),
            };
            if !oversized {
                if line.len() + take > limit {
                    oversized = true;
                    line.clear();
                } else {
                    line.extend_from_slice(&available[..take]);
                }
            }
            reader.consume(take);

            if complete {
                if !oversized && strip_terminator(&line) == query {
                    return Ok(true);
                }
                line.clear();
                oversized = false;
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, source: std::io::Error) -> CorpusError {
        CorpusError::Read {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn finds_exact_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "hello\nworld\nfoo").unwrap();
        file.flush().unwrap();
        let corpus = StreamingCorpus::new(file.path());

        assert!(corpus.contains(b"world").await.unwrap());
        assert!(corpus.contains(b"foo").await.unwrap());
        assert!(!corpus.contains(b"missing").await.unwrap());
        assert!(!corpus.contains(b"hel").await.unwrap());
        assert!(!corpus.contains(b"Hello").await.unwrap());
    }

    #[tokio::test]
    async fn crlf_lines_match_without_carriage_return() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "alpha\r\nbeta\r\n").unwrap();
        file.flush().unwrap();
        let corpus = StreamingCorpus::new(file.path());

        assert!(corpus.contains(b"alpha").await.unwrap());
        assert!(!corpus.contains(b"alpha\r").await.unwrap());
    }

    #[tokio::test]
    async fn sees_appended_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha").unwrap();
        file.flush().unwrap();
        let corpus = StreamingCorpus::new(file.path());
        assert!(!corpus.contains(b"fresh").await.unwrap());

        writeln!(file, "fresh").unwrap();
        file.flush().unwrap();
        assert!(corpus.contains(b"fresh").await.unwrap());
    }

    #[tokio::test]
    async fn long_lines_are_skipped_not_matched() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let long = "x".repeat(3 * READ_BUFFER_BYTES);
        write!(file, "{long}\nalpha\r\n{long}").unwrap();
        file.flush().unwrap();
        let corpus = StreamingCorpus::new(file.path());

        assert!(corpus.contains(b"alpha").await.unwrap());
        assert!(!corpus.contains(b"xxxx").await.unwrap());
        assert!(corpus.contains(long.as_bytes()).await.unwrap());
        assert!(!corpus.contains(&long.as_bytes()[1..]).await.unwrap());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = StreamingCorpus::new(dir.path().join("absent.txt"));

        let err = corpus.contains(b"alpha").await.unwrap_err();
        assert!(matches!(err, CorpusError::Read { .. }));
    }
}
