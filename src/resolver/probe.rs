//! Single-hop resolution.
//!
//! A probe sends one HEAD request to `https://{host}/{path}` and reads the
//! redirect target from the `Location` header. It never retries and keeps no
//! state between calls.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::{HeaderMap, LOCATION};
use url::Url;

use crate::chain::ChainError;
use crate::resolver::host::Resolver;

/// Result of one probe: the URL actually requested and where it points.
#[derive(Debug, Clone)]
pub struct Probe {
    pub endpoint: Url,
    pub outcome: Result<Url, ChainError>,
}

/// Future returned by [`Prober::probe`].
pub type Probing<'a> = Pin<Box<dyn Future<Output = Probe> + Send + 'a>>;

/// Performs a single redirect probe against a resolver's host.
///
/// `path` is the URL path as requested; [`Resolver::endpoint`] drops its one
/// leading slash.
pub trait Prober: Send + Sync {
    fn probe<'a>(&'a self, resolver: &'a Resolver, path: &'a str) -> Probing<'a>;
}

/// Probes over HTTPS with the resolver's own client.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpProber;

impl Prober for HttpProber {
    fn probe<'a>(&'a self, resolver: &'a Resolver, path: &'a str) -> Probing<'a> {
        Box::pin(async move {
            let endpoint = resolver.endpoint(path);
            tracing::info!(endpoint = %endpoint, "visiting");

            let outcome = match resolver.client().head(endpoint.clone()).send().await {
                Ok(response) => {
                    tracing::debug!(endpoint = %endpoint, status = %response.status(), "probe answered");
                    redirect_target(&endpoint, response.headers())
                }
                Err(e) => {
                    tracing::error!(
                        endpoint = %endpoint,
                        timeout = e.is_timeout(),
                        error = %e,
                        "error doing HEAD"
                    );
                    Err(ChainError::NetworkFailure {
                        endpoint: endpoint.to_string(),
                        reason: e.to_string(),
                    })
                }
            };

            Probe { endpoint, outcome }
        })
    }
}

/// Extract the redirect target from response headers.
///
/// The first non-empty `Location` value is parsed, relative values are
/// resolved against `endpoint`.
pub fn redirect_target(endpoint: &Url, headers: &HeaderMap) -> Result<Url, ChainError> {
    let mut values = headers.get_all(LOCATION).iter().peekable();
    if values.peek().is_none() {
        tracing::error!(endpoint = %endpoint, "nil location header");
        return Err(ChainError::NoRedirectTarget {
            endpoint: endpoint.to_string(),
        });
    }

    let Some(value) = values.find(|v| !v.as_bytes().trim_ascii().is_empty()) else {
        tracing::error!(endpoint = %endpoint, "empty location header");
        return Err(ChainError::NoRedirectTarget {
            endpoint: endpoint.to_string(),
        });
    };

    let malformed = || ChainError::MalformedTarget {
        endpoint: endpoint.to_string(),
        location: String::from_utf8_lossy(value.as_bytes()).into_owned(),
    };

    let location = value.to_str().map_err(|_| malformed())?.trim();
    endpoint.join(location).map_err(|e| {
        tracing::error!(endpoint = %endpoint, location = %location, error = %e, "error parsing location url");
        malformed()
    })
}
