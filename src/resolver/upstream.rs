//! Name resolution through a fixed upstream DNS server.
//!
//! Redirector hosts can answer differently depending on which resolver the
//! caller used, so every probe resolves names through the one configured
//! upstream (UDP) instead of the system resolver.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::{
    config::{NameServerConfig, ResolverConfig},
    name_server::TokioConnectionProvider,
    proto::xfer::Protocol,
    TokioResolver,
};
use reqwest::dns::{Addrs, Name, Resolve, Resolving};

/// A `reqwest` DNS resolver pinned to a single upstream server.
#[derive(Clone)]
pub struct UpstreamDns {
    addr: SocketAddr,
    resolver: Arc<TokioResolver>,
}

impl UpstreamDns {
    /// Create a resolver querying `addr` over UDP, giving up after `timeout`.
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(addr, Protocol::Udp));

        let mut builder =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default());
        builder.options_mut().timeout = timeout;
        builder.options_mut().attempts = 1;

        Self {
            addr,
            resolver: Arc::new(builder.build()),
        }
    }

    /// The upstream server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl std::fmt::Debug for UpstreamDns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamDns").field("addr", &self.addr).finish()
    }
}

impl Resolve for UpstreamDns {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = Arc::clone(&self.resolver);
        let upstream = self.addr;
        Box::pin(async move {
            let host = name.as_str();
            let lookup = resolver.lookup_ip(host).await.map_err(|e| {
                tracing::warn!(host = %host, upstream = %upstream, error = %e, "DNS lookup failed");
                Box::new(e) as Box<dyn std::error::Error + Send + Sync>
            })?;

            let addrs: Vec<SocketAddr> = lookup.iter().map(|ip| SocketAddr::new(ip, 0)).collect();
            tracing::debug!(host = %host, upstream = %upstream, count = addrs.len(), "DNS lookup complete");
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keeps_upstream_address() {
        let addr: SocketAddr = "9.9.9.9:53".parse().unwrap();
        let dns = UpstreamDns::new(addr, Duration::from_secs(5));
        assert_eq!(dns.addr(), addr);
        assert!(format!("{dns:?}").contains("9.9.9.9:53"));
    }
}
