//! Query framing and verdict encoding.
//!
//! # Wire Format
//! ```text
//! client → server:  <query bytes>\n        (a "\r" before "\n" is ignored)
//! server → client:  STRING EXISTS\n | STRING NOT FOUND\n
//! ```
//!
//! # Design Decisions
//! - The length limit is checked while buffering, so an oversized line never
//!   grows the buffer past `max_len` plus one pending `\r`
//! - `\r\n` is a terminator, so its `\r` does not count toward the limit
//! - A partial line at end of stream is dropped, not dispatched

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::corpus::lines::strip_terminator;

/// Outcome of a lookup as sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Exists,
    NotFound,
}

impl Verdict {
    pub fn from_found(found: bool) -> Self {
        if found {
            Verdict::Exists
        } else {
            Verdict::NotFound
        }
    }

    /// Bytes written to the client, newline included.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Verdict::Exists => b"STRING EXISTS\n",
            Verdict::NotFound => b"STRING NOT FOUND\n",
        }
    }

    /// Short label for logs and metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Verdict::Exists => "exists",
            Verdict::NotFound => "not_found",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Exists => f.write_str("STRING EXISTS"),
            Verdict::NotFound => f.write_str("STRING NOT FOUND"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("query exceeds {max} bytes")]
    TooLong { max: usize },

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads newline-terminated queries with a per-line length cap.
pub struct QueryReader<R> {
    inner: R,
    max_len: usize,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> QueryReader<R> {
    pub fn new(inner: R, max_len: usize) -> Self {
        Self {
            inner,
            max_len,
            buf: Vec::new(),
        }
    }

    /// Read the next query, terminator stripped.
    ///
    /// Returns `Ok(None)` when the peer closed the stream. Any bytes received
    /// after the last terminator are discarded in that case.
    pub async fn next_query(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        self.buf.clear();

        loop {
            let available = self.inner.fill_buf().await?;
            if available.is_empty() {
                if !self.buf.is_empty() {
                    tracing::debug!(bytes = self.buf.len(), "Discarding unterminated trailing line");
                }
                return Ok(None);
            }

            match available.iter().position(|b| *b == b'\n') {
                Some(end) => {
                    let before_newline = match end {
                        0 => self.buf.last().copied(),
                        _ => Some(available[end - 1]),
                    };
                    let mut content_len = self.buf.len() + end;
                    if before_newline == Some(b'\r') {
                        content_len -= 1;
                    }
                    if content_len > self.max_len {
                        return Err(FrameError::TooLong { max: self.max_len });
                    }
                    self.buf.extend_from_slice(&available[..=end]);
                    self.inner.consume(end + 1);
                    let query = strip_terminator(&self.buf).to_vec();
                    return Ok(Some(query));
                }
                None => {
                    // One byte of slack for a `\r` whose `\n` has not arrived yet.
                    let n = available.len();
                    if self.buf.len() + n > self.max_len + 1 {
                        return Err(FrameError::TooLong { max: self.max_len });
                    }
                    self.buf.extend_from_slice(available);
                    self.inner.consume(n);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncWriteExt, BufReader};

    async fn reader_over(bytes: &'static [u8], max_len: usize) -> QueryReader<BufReader<&'static [u8]>> {
        QueryReader::new(BufReader::new(bytes), max_len)
    }

    #[tokio::test]
    async fn reads_successive_queries() {
        let mut reader = reader_over(b"alpha\nbeta\r\n\n", 64).await;

        assert_eq!(reader.next_query().await.unwrap(), Some(b"alpha".to_vec()));
        assert_eq!(reader.next_query().await.unwrap(), Some(b"beta".to_vec()));
        assert_eq!(reader.next_query().await.unwrap(), Some(Vec::new()));
        assert_eq!(reader.next_query().await.unwrap(), None);
    }

    #[tokio::test]
    async fn keeps_inner_whitespace() {
        let mut reader = reader_over(b"  two  words \n", 64).await;
        assert_eq!(reader.next_query().await.unwrap(), Some(b"  two  words ".to_vec()));
    }

    #[tokio::test]
    async fn drops_partial_line_at_eof() {
        let mut reader = reader_over(b"alpha\nunterminated", 64).await;

        assert_eq!(reader.next_query().await.unwrap(), Some(b"alpha".to_vec()));
        assert_eq!(reader.next_query().await.unwrap(), None);
    }

    #[tokio::test]
    async fn enforces_length_limit() {
        let mut reader = reader_over(b"12345\n123456\n", 5).await;

        assert_eq!(reader.next_query().await.unwrap(), Some(b"12345".to_vec()));
        assert!(matches!(
            reader.next_query().await,
            Err(FrameError::TooLong { max: 5 })
        ));
    }

    #[tokio::test]
    async fn crlf_terminator_does_not_count_toward_limit() {
        let mut reader = reader_over(b"12345\r\n1234\r\n123456\r\n", 5).await;

        assert_eq!(reader.next_query().await.unwrap(), Some(b"12345".to_vec()));
        assert_eq!(reader.next_query().await.unwrap(), Some(b"1234".to_vec()));
        assert!(matches!(
            reader.next_query().await,
            Err(FrameError::TooLong { max: 5 })
        ));
    }

    #[tokio::test]
    async fn crlf_split_across_reads_stays_within_limit() {
        let (client, server) = tokio::io::duplex(4);
        let mut reader = QueryReader::new(BufReader::with_capacity(4, server), 4);

        let writer = tokio::spawn(async move {
            let mut client = client;
            let _ = client.write_all(b"abcd\r").await;
            let _ = client.flush().await;
            let _ = client.write_all(b"\nabcde\r\n").await;
        });

        assert_eq!(reader.next_query().await.unwrap(), Some(b"abcd".to_vec()));
        assert!(matches!(
            reader.next_query().await,
            Err(FrameError::TooLong { max: 4 })
        ));
        drop(reader);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn limit_applies_across_reads() {
        let (client, server) = tokio::io::duplex(4);
        let mut reader = QueryReader::new(BufReader::with_capacity(4, server), 8);

        let writer = tokio::spawn(async move {
            let mut client = client;
            let _ = client.write_all(b"0123456789\n").await;
        });

        assert!(matches!(
            reader.next_query().await,
            Err(FrameError::TooLong { max: 8 })
        ));
        drop(reader);
        writer.await.unwrap();
    }

    #[test]
    fn verdict_wire_format() {
        assert_eq!(Verdict::Exists.as_bytes(), b"STRING EXISTS\n");
        assert_eq!(Verdict::NotFound.as_bytes(), b"STRING NOT FOUND\n");
        assert_eq!(Verdict::from_found(true), Verdict::Exists);
        assert_eq!(Verdict::NotFound.to_string(), "STRING NOT FOUND");
    }
}
