//! Link unwrapper library.
//!
//! Follows redirect chains of link-shortening services one hop at a time,
//! starting at the shortener the request was addressed to, and returns the
//! full trace with tracking parameters stripped from every URL.

pub mod chain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolver;
pub mod sanitize;

pub use chain::{Chain, ChainError, Trace};
pub use config::schema::UnwrapperConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resolver::HostRegistry;
