//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build corpus → Load TLS → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Exit (no drain)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then corpus and TLS, then listener
//! - In-flight sessions are dropped with the runtime

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{prepare, Prepared};
