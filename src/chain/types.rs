//! Chain types and error definitions.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::resolver::Resolver;
use crate::sanitize::{sanitize, sanitize_with};

/// Errors that end a resolution.
///
/// Every variant is scoped to one request; the partial trace collected so far
/// is kept alongside it in [`Trace`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// No registered resolver for the request's originating host.
    #[error("no unwrapper found for host '{host}'")]
    NoResolverFound { host: String },

    /// The chain came back to an endpoint it already probed.
    #[error("cycle detected at {url}")]
    CycleDetected { url: String },

    /// I/O error or timeout while probing.
    #[error("request to {endpoint} failed: {reason}")]
    NetworkFailure { endpoint: String, reason: String },

    /// The probe answered without a usable `Location` header.
    #[error("no location header found in response from {endpoint}")]
    NoRedirectTarget { endpoint: String },

    /// The `Location` header could not be parsed as a URL.
    #[error("error parsing location url '{location}' from {endpoint}")]
    MalformedTarget { endpoint: String, location: String },

    /// The hop limit was reached before an unregistered host.
    #[error("gave up after {limit} hops")]
    TooManyHops { limit: usize },

    /// The URL to probe has no path to unwrap.
    #[error("nothing to unwrap at {url}")]
    EmptyPath { url: String },
}

/// Error discriminant, used for status mapping and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoResolverFound,
    CycleDetected,
    NetworkFailure,
    NoRedirectTarget,
    MalformedTarget,
    TooManyHops,
    EmptyPath,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoResolverFound => "no_resolver_found",
            ErrorKind::CycleDetected => "cycle_detected",
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::NoRedirectTarget => "no_redirect_target",
            ErrorKind::MalformedTarget => "malformed_target",
            ErrorKind::TooManyHops => "too_many_hops",
            ErrorKind::EmptyPath => "empty_path",
        }
    }
}

impl ChainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChainError::NoResolverFound { .. } => ErrorKind::NoResolverFound,
            ChainError::CycleDetected { .. } => ErrorKind::CycleDetected,
            ChainError::NetworkFailure { .. } => ErrorKind::NetworkFailure,
            ChainError::NoRedirectTarget { .. } => ErrorKind::NoRedirectTarget,
            ChainError::MalformedTarget { .. } => ErrorKind::MalformedTarget,
            ChainError::TooManyHops { .. } => ErrorKind::TooManyHops,
            ChainError::EmptyPath { .. } => ErrorKind::EmptyPath,
        }
    }
}

/// One observed redirect: `from` was probed with `using` and pointed at `to`.
#[derive(Debug, Clone)]
pub struct Hop {
    pub from: Url,
    pub to: Url,
    pub using: Arc<Resolver>,
}

/// Outcome of a finished resolution.
#[derive(Debug, Clone)]
pub struct Trace {
    /// Successful hops in the order they were taken.
    pub hops: Vec<Hop>,
    /// The destination, set only when the chain succeeded.
    pub final_url: Option<Url>,
    pub error: Option<ChainError>,
}

impl Trace {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.final_url.is_some()
    }

    /// Copy of the trace with tracking parameters removed from every hop
    /// target and from the final URL.
    ///
    /// A target keeps the parameters its redirector permits.
    pub fn sanitized(&self) -> Trace {
        let hops = self
            .hops
            .iter()
            .map(|hop| Hop {
                from: hop.from.clone(),
                to: sanitize_with(&hop.to, hop.using.permitted_query_params()),
                using: Arc::clone(&hop.using),
            })
            .collect();

        let final_url = self.final_url.as_ref().map(|url| match self.hops.last() {
            Some(last) if &last.to == url => sanitize_with(url, last.using.permitted_query_params()),
            _ => sanitize(url),
        });

        Trace {
            hops,
            final_url,
            error: self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        let err = ChainError::CycleDetected {
            url: "https://t.co/a".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::CycleDetected);
        assert_eq!(err.kind().as_str(), "cycle_detected");
        assert_eq!(
            serde_json::to_string(&ErrorKind::NoRedirectTarget).unwrap(),
            "\"no_redirect_target\""
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ChainError::NoResolverFound {
            host: "example.com".to_string(),
        };
        assert_eq!(err.to_string(), "no unwrapper found for host 'example.com'");
        assert_eq!(ChainError::TooManyHops { limit: 3 }.to_string(), "gave up after 3 hops");
    }

    #[test]
    fn test_sanitized_without_hops() {
        let trace = Trace {
            hops: Vec::new(),
            final_url: Some(Url::parse("https://example.com/?utm_source=x#f").unwrap()),
            error: None,
        };
        let clean = trace.sanitized();
        assert_eq!(clean.final_url.unwrap().as_str(), "https://example.com/");
    }
}
