//! Connection acceptor.
//!
//! # Data Flow
//! ```text
//! Listener::accept (permit held per connection)
//!     → tokio::spawn
//!         → Transport::establish (TLS handshake or plain)
//!         → Session::run until the peer leaves
//!     → permit and tracker guard released
//! ```
//!
//! # Design Decisions
//! - One task per connection; the accept loop never awaits a session
//! - Handshake and session failures stay inside their task
//! - Bind and TLS material problems are caught at startup, never here

pub mod acceptor;

pub use acceptor::SearchServer;
