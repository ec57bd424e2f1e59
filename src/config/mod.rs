//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or bundled config/unwrapper.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → UnwrapperConfig (validated, immutable)
//!     → HostRegistry built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Any error is fatal at startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{bundled_config, load_config, parse_config, ConfigError};
pub use schema::{
    ChainConfig, ListenerConfig, ObservabilityConfig, RedirectorConfig, TimeoutConfig, TlsConfig,
    UnwrapperConfig, UpstreamConfig,
};
pub use validation::ValidationError;
