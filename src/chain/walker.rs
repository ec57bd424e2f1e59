//! Redirect chain walker.
//!
//! # States
//! ```text
//! new(origin host) ──no resolver──▶ Err(NoResolverFound)
//!        │
//!        ▼
//!     Active(url, resolver) ──step──▶ Active (target host registered)
//!        │                  ──step──▶ Succeeded(target) (target host unknown)
//!        │                  ──step──▶ Failed(error)
//! ```
//!
//! Cycle detection runs before the probe: the current URL is checked against
//! the endpoints already probed, so revisiting one costs no request. The
//! endpoint drops the query, so a query-only self redirect is stopped by the
//! hop limit instead. Failed hops are never retried.

use std::collections::HashSet;
use std::sync::Arc;

use url::Url;

use crate::chain::types::{ChainError, Hop, Trace};
use crate::observability::metrics;
use crate::resolver::{normalize_host, HostRegistry, Prober, Resolver};

/// Hop limit used when none is configured.
pub const DEFAULT_MAX_HOPS: usize = 16;

#[derive(Debug)]
enum State {
    Active { url: Url, resolver: Arc<Resolver> },
    Succeeded(Url),
    Failed { url: Url, error: ChainError },
}

/// State of one in-flight resolution.
///
/// Owned by a single request and dropped with it.
#[derive(Debug)]
pub struct Chain {
    registry: Arc<HostRegistry>,
    state: State,
    hops: Vec<Hop>,
    visited: HashSet<String>,
    max_hops: usize,
}

impl Chain {
    /// Start a resolution for `path` as requested on `origin_host`.
    ///
    /// Fails with `NoResolverFound` when the host is not registered; no chain
    /// is created in that case.
    pub fn new(
        registry: Arc<HostRegistry>,
        origin_host: &str,
        path: &str,
    ) -> Result<Self, ChainError> {
        let host = normalize_host(origin_host);
        let Some(resolver) = registry.resolver_for(&host) else {
            return Err(ChainError::NoResolverFound { host });
        };
        tracing::info!(resolver = %resolver.host(), "using resolver");

        let url = resolver.endpoint(path);
        Ok(Self {
            registry,
            state: State::Active { url, resolver },
            hops: Vec::new(),
            visited: HashSet::new(),
            max_hops: DEFAULT_MAX_HOPS,
        })
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Perform one hop. Returns `false` once the chain has terminated.
    pub async fn step(&mut self, prober: &dyn Prober) -> bool {
        let (url, resolver) = match &self.state {
            State::Active { url, resolver } => (url.clone(), Arc::clone(resolver)),
            _ => return false,
        };

        let key = url.to_string();
        if self.visited.contains(&key) {
            tracing::error!(url = %key, "cycle detected!");
            self.fail(url, ChainError::CycleDetected { url: key });
            return false;
        }

        if self.hops.len() >= self.max_hops {
            tracing::error!(url = %key, limit = self.max_hops, "hop limit reached");
            let limit = self.max_hops;
            self.fail(url, ChainError::TooManyHops { limit });
            return false;
        }

        let path = url.path();
        if path.strip_prefix('/').unwrap_or(path).is_empty() {
            tracing::warn!(url = %key, "empty path, nothing to unwrap");
            self.fail(url, ChainError::EmptyPath { url: key });
            return false;
        }

        let probe = prober.probe(&resolver, path).await;
        self.visited.insert(probe.endpoint.to_string());

        let target = match probe.outcome {
            Ok(target) => target,
            Err(error) => {
                self.fail(url, error);
                return false;
            }
        };

        metrics::record_hop(resolver.host());
        self.hops.push(Hop {
            from: probe.endpoint,
            to: target.clone(),
            using: resolver,
        });

        match target.host_str().and_then(|host| self.registry.resolver_for(host)) {
            Some(next) => {
                tracing::debug!(target = %target, resolver = %next.host(), "following redirect");
                self.state = State::Active {
                    url: target,
                    resolver: next,
                };
                true
            }
            None => {
                tracing::debug!(target = %target, "finished");
                self.state = State::Succeeded(target);
                false
            }
        }
    }

    /// Drive the chain to completion.
    pub async fn run(mut self, prober: &dyn Prober) -> Trace {
        while self.step(prober).await {}
        self.into_trace()
    }

    fn fail(&mut self, url: Url, error: ChainError) {
        self.state = State::Failed { url, error };
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active { .. })
    }

    pub fn current_url(&self) -> &Url {
        match &self.state {
            State::Active { url, .. } | State::Succeeded(url) | State::Failed { url, .. } => url,
        }
    }

    /// The resolver for the next hop; `None` once terminated.
    pub fn current_resolver(&self) -> Option<&Arc<Resolver>> {
        match &self.state {
            State::Active { resolver, .. } => Some(resolver),
            _ => None,
        }
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Endpoints probed so far.
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn error(&self) -> Option<&ChainError> {
        match &self.state {
            State::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn into_trace(self) -> Trace {
        let (final_url, error) = match self.state {
            State::Succeeded(url) => (Some(url), None),
            State::Failed { error, .. } => (None, Some(error)),
            State::Active { .. } => (None, None),
        };
        Trace {
            hops: self.hops,
            final_url,
            error,
        }
    }
}
