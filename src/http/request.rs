//! Request inspection.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Extract the originating host used to select a resolver
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - `X-Forwarded-Host` wins over `Host` so the service can sit behind a
//!   reverse proxy that owns the shortener domains

use axum::http::{header, HeaderMap, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::resolver::normalize_host;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID header value, or "unknown".
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Host the request was addressed to, normalized for registry lookup.
///
/// Order: first `X-Forwarded-Host` entry, `Host` header, URI authority.
pub fn originating_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let forwarded = headers
        .get(X_FORWARDED_HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let host = forwarded
        .or_else(|| headers.get(header::HOST).and_then(|v| v.to_str().ok()))
        .or_else(|| uri.host())?;

    let host = normalize_host(host);
    (!host.is_empty()).then_some(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn test_forwarded_host_wins() {
        let h = headers(&[("x-forwarded-host", "T.co"), ("host", "localhost:8080")]);
        assert_eq!(originating_host(&h, &Uri::from_static("/abc")), Some("t.co".to_string()));
    }

    #[test]
    fn test_first_forwarded_entry_used() {
        let h = headers(&[("x-forwarded-host", "bit.ly, proxy.internal")]);
        assert_eq!(originating_host(&h, &Uri::from_static("/abc")), Some("bit.ly".to_string()));
    }

    #[test]
    fn test_falls_back_to_host_header() {
        let h = headers(&[("host", "t.co:8080")]);
        assert_eq!(originating_host(&h, &Uri::from_static("/abc")), Some("t.co".to_string()));
    }

    #[test]
    fn test_falls_back_to_uri_authority() {
        let uri = Uri::from_static("http://bit.ly/abc");
        assert_eq!(originating_host(&HeaderMap::new(), &uri), Some("bit.ly".to_string()));
        assert_eq!(originating_host(&HeaderMap::new(), &Uri::from_static("/abc")), None);
    }

    #[test]
    fn test_request_id_header() {
        assert_eq!(request_id(&headers(&[("x-request-id", "abc")])), "abc");
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_generated_ids_are_uuids() {
        let request = Request::new(());
        let id = MakeRequestUuid.make_request_id(&request).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(uuid::Uuid::parse_str(value).is_ok());
    }
}
