//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the unwrapper.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the unwrapper service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UnwrapperConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Upstream DNS and probe settings shared by every redirector.
    pub upstream: UpstreamConfig,

    /// Redirect chain limits.
    pub chain: ChainConfig,

    /// Timeout configuration for inbound requests.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Known redirector hosts, one resolver is built per entry.
    pub redirectors: Vec<RedirectorConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address for plain HTTP (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional HTTPS listener, served alongside plain HTTP.
    pub tls: Option<TlsConfig>,

    /// Maximum requests handled concurrently (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
            max_connections: 10_000,
        }
    }
}

/// TLS configuration for the HTTPS listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Bind address for HTTPS (e.g., "0.0.0.0:8443").
    #[serde(default = "default_tls_bind")]
    pub bind_address: String,

    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

fn default_tls_bind() -> String {
    "0.0.0.0:8443".to_string()
}

/// Upstream name resolution and probe timeouts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// DNS server used for every probe, as `ip:port` (UDP).
    pub dns: String,

    /// DNS query timeout in seconds.
    pub dns_timeout_secs: u64,

    /// Total time allowed for a single probe in seconds.
    pub probe_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            // Cloudflare
            dns: "1.1.1.1:53".to_string(),
            dns_timeout_secs: 5,
            probe_timeout_secs: 3,
        }
    }
}

/// Redirect chain limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Maximum number of hops followed before giving up.
    pub max_hops: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self { max_hops: 16 }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (whole resolution) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("json" or "pretty").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A known redirector host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedirectorConfig {
    /// Host name as it appears in links (exact match, e.g. "t.co").
    pub host: String,

    /// Human readable name shown alongside each hop.
    #[serde(default)]
    pub description: String,

    /// Query parameters this redirector's targets keep even if denylisted.
    #[serde(default)]
    pub permitted_query_params: Vec<String>,
}
