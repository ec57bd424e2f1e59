//! Redirector resolution subsystem.
//!
//! # Data Flow
//! ```text
//! [[redirectors]] + upstream DNS (config)
//!     → registry.rs (one Resolver per host, built once)
//!     → host.rs (Resolver: host, description, permitted params, client)
//!     → upstream.rs (client name resolution pinned to the upstream server)
//!
//! Chain step:
//!     → probe.rs (one HEAD request, Location header → target URL)
//! ```
//!
//! # Design Decisions
//! - Clients never follow redirects; every hop is inspected by the caller
//! - Probing sits behind the `Prober` trait so the walker can be driven
//!   without network access

pub mod host;
pub mod probe;
pub mod registry;
pub mod upstream;

pub use host::Resolver;
pub use probe::{redirect_target, HttpProber, Probe, Prober, Probing};
pub use registry::{normalize_host, HostRegistry, RegistryError};
pub use upstream::UpstreamDns;
