//! Per-host resolver configuration.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::RedirectorConfig;
use crate::resolver::registry::RegistryError;
use crate::resolver::upstream::UpstreamDns;

/// A registered redirector host and the HTTP client used to probe it.
///
/// Immutable after construction. The client resolves names through the
/// upstream DNS server and never follows redirects, so each 3xx answer is
/// observed as a single hop.
#[derive(Debug)]
pub struct Resolver {
    host: String,
    description: String,
    permitted_query_params: HashSet<String>,
    upstream_dns: SocketAddr,
    base: Url,
    client: reqwest::Client,
}

impl Resolver {
    pub fn new(
        definition: &RedirectorConfig,
        dns: &Arc<UpstreamDns>,
        probe_timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let host = definition.host.to_lowercase();
        let base = Url::parse(&format!("https://{host}/"))
            .map_err(|_| RegistryError::InvalidHost(definition.host.clone()))?;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(probe_timeout)
            .dns_resolver(Arc::clone(dns))
            .build()?;

        Ok(Self {
            host,
            description: definition.description.clone(),
            permitted_query_params: definition.permitted_query_params.iter().cloned().collect(),
            upstream_dns: dns.addr(),
            base,
            client,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameters kept on URLs this redirector points at, even if denylisted.
    pub fn permitted_query_params(&self) -> &HashSet<String> {
        &self.permitted_query_params
    }

    pub fn upstream_dns(&self) -> SocketAddr {
        self.upstream_dns
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Build the probed URL, `https://{host}/{path}`.
    ///
    /// One leading slash is dropped from `path` before joining.
    pub fn endpoint(&self, path: &str) -> Url {
        let path = path.strip_prefix('/').unwrap_or(path);
        let mut endpoint = self.base.clone();
        endpoint.set_path(&format!("/{path}"));
        endpoint
    }
}
