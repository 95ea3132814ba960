//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (connection ID, active count)
//!     → tls.rs (optional TLS handshake, inside the connection task)
//!     → Hand off to session layer
//!
//! Connection States:
//!     Accepting → Handshaking → Session → Closed
//! ```
//!
//! # Design Decisions
//! - Bounded admission gate prevents resource exhaustion
//! - Handshakes run per connection so a stalled client cannot block accept
//! - TLS is optional and handled transparently

pub mod connection;
pub mod listener;
pub mod tls;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{ConnectionPermit, Listener, ListenerError};
pub use tls::{SessionStream, Transport};
