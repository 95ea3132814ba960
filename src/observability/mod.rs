//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Sessions, acceptor and corpus produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every session log line carries its connection ID and peer address
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
