//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, originating host)
//!     → chain walker (resolver selection, probes)
//!     → response.rs (status mapping, JSON trace)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{originating_host, request_id, MakeRequestUuid, X_FORWARDED_HOST, X_REQUEST_ID};
pub use response::{error_response, status_for, trace_response, ResolutionBody};
pub use server::{AppState, HttpServer};
