//! Session subsystem: one client connection, end to end.
//!
//! # Data Flow
//! ```text
//! Accepted stream (plain TCP or TLS)
//!     → framing.rs (read one line, enforce max length)
//!     → handler.rs (dispatch to CorpusStore, write verdict)
//!     → back to framing.rs for the next query
//!
//! Session States:
//!     AwaitingQuery → Dispatched → Responded → AwaitingQuery
//!     any state → Closed (peer close, I/O error, oversized line, idle timeout)
//! ```
//!
//! # Design Decisions
//! - Generic over the stream type so TLS and plain TCP share one loop
//! - Response N is flushed before query N+1 is read
//! - Errors end only the session they occur in

pub mod framing;
pub mod handler;

pub use framing::{FrameError, QueryReader, Verdict};
pub use handler::{CloseReason, Session, SessionState};
