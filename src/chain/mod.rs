//! Redirect chain subsystem.
//!
//! # Data Flow
//! ```text
//! origin host + request path
//!     → walker.rs (Chain::new selects the resolver)
//!     → step: cycle check → probe (resolver::probe) → record hop
//!             → switch resolver if the target host is registered
//!     → Trace (hops, final URL or error)
//!     → Trace::sanitized (tracking parameters removed)
//! ```

pub mod types;
pub mod walker;

pub use types::{ChainError, ErrorKind, Hop, Trace};
pub use walker::{Chain, DEFAULT_MAX_HOPS};
