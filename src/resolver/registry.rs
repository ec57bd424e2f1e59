//! Host resolver registry.
//!
//! # Responsibilities
//! - Build one [`Resolver`] per configured redirector
//! - Look up the resolver for a host
//!
//! # Design Decisions
//! - Built once at startup, immutable afterwards (shared via `Arc`, no locks)
//! - Exact host lookup on the lower-cased name, no wildcard or suffix matching
//! - Any malformed definition fails the whole build

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::UnwrapperConfig;
use crate::resolver::host::Resolver;
use crate::resolver::upstream::UpstreamDns;

/// Errors raised while building the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("upstream DNS '{0}' is not a valid ip:port address")]
    InvalidDns(String),

    #[error("redirector host '{0}' cannot be used in a URL")]
    InvalidHost(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Immutable mapping from host name to its resolver.
#[derive(Debug, Default)]
pub struct HostRegistry {
    resolvers: HashMap<String, Arc<Resolver>>,
}

impl HostRegistry {
    /// Build the registry from validated configuration.
    pub fn from_config(config: &UnwrapperConfig) -> Result<Self, RegistryError> {
        let dns_addr: SocketAddr = config
            .upstream
            .dns
            .parse()
            .map_err(|_| RegistryError::InvalidDns(config.upstream.dns.clone()))?;
        let dns = Arc::new(UpstreamDns::new(
            dns_addr,
            Duration::from_secs(config.upstream.dns_timeout_secs),
        ));
        let probe_timeout = Duration::from_secs(config.upstream.probe_timeout_secs);

        let mut resolvers = Vec::with_capacity(config.redirectors.len());
        for definition in &config.redirectors {
            tracing::debug!(
                host = %definition.host,
                description = %definition.description,
                "creating unwrapper"
            );
            resolvers.push(Resolver::new(definition, &dns, probe_timeout)?);
        }

        let registry = Self::from_resolvers(resolvers);
        tracing::info!(
            count = registry.len(),
            upstream_dns = %dns_addr,
            "loaded link unwrappers"
        );
        Ok(registry)
    }

    /// Build a registry from already constructed resolvers.
    pub fn from_resolvers(resolvers: impl IntoIterator<Item = Resolver>) -> Self {
        let resolvers = resolvers
            .into_iter()
            .map(|r| (r.host().to_string(), Arc::new(r)))
            .collect();
        Self { resolvers }
    }

    /// Exact lookup of `host` (expected lower-case, without port).
    pub fn resolver_for(&self, host: &str) -> Option<Arc<Resolver>> {
        self.resolvers.get(host).cloned()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Registered host names, sorted.
    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        hosts.sort_unstable();
        hosts
    }
}

/// Normalize a host taken from a request header: trim, drop a `:port`
/// suffix and a trailing dot, lower-case.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = match host.rsplit_once(':') {
        Some((name, port))
            if !name.contains(':') && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            name
        }
        _ => host,
    };
    host.trim_end_matches('.').to_ascii_lowercase()
}
