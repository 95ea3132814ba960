//! Exact-line string search server.
//!
//! Answers `STRING EXISTS` / `STRING NOT FOUND` for newline-terminated
//! queries against a text corpus, over plain TCP or TLS.

pub mod config;
pub mod corpus;
pub mod error;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod server;
pub mod session;

pub use config::schema::ServerConfig;
pub use corpus::{CorpusStore, Strategy};
pub use error::StartupError;
pub use lifecycle::Shutdown;
pub use server::SearchServer;
pub use session::Verdict;
