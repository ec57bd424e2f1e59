//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges (timeouts > 0, hop limit > 0)
//! - Detect duplicate or malformed redirector hosts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: UnwrapperConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::UnwrapperConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid ip:port address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("no redirectors configured")]
    NoRedirectors,

    #[error("redirector host '{0}' is not a bare host name")]
    InvalidHost(String),

    #[error("redirector host '{0}' is configured more than once")]
    DuplicateHost(String),

    #[error("unknown log format '{0}', options are [pretty,json]")]
    UnknownLogFormat(String),

    #[error("tls.{0} must not be empty")]
    MissingTlsPath(&'static str),
}

pub fn validate_config(config: &UnwrapperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(&mut errors, "upstream.dns", &config.upstream.dns);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if let Some(tls) = &config.listener.tls {
        check_address(&mut errors, "listener.tls.bind_address", &tls.bind_address);
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::MissingTlsPath("cert_path"));
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::MissingTlsPath("key_path"));
        }
    }

    let positive = [
        ("listener.max_connections", config.listener.max_connections as u64),
        ("upstream.dns_timeout_secs", config.upstream.dns_timeout_secs),
        ("upstream.probe_timeout_secs", config.upstream.probe_timeout_secs),
        ("chain.max_hops", config.chain.max_hops as u64),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    match config.observability.log_format.as_str() {
        "json" | "pretty" => {}
        other => errors.push(ValidationError::UnknownLogFormat(other.to_string())),
    }

    if config.redirectors.is_empty() {
        errors.push(ValidationError::NoRedirectors);
    }

    let mut seen = HashSet::new();
    for redirector in &config.redirectors {
        if !is_bare_host(&redirector.host) {
            errors.push(ValidationError::InvalidHost(redirector.host.clone()));
            continue;
        }
        if !seen.insert(redirector.host.to_lowercase()) {
            errors.push(ValidationError::DuplicateHost(redirector.host.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// A host is usable when it is exactly the host component of `https://{host}/`.
fn is_bare_host(host: &str) -> bool {
    if host.is_empty() || host.contains(|c: char| c.is_whitespace() || matches!(c, '/' | ':' | '@' | '?' | '#')) {
        return false;
    }
    url::Url::parse(&format!("https://{host}/"))
        .ok()
        .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(host)))
        .unwrap_or(false)
}
