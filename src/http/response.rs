//! Response rendering.
//!
//! # Responsibilities
//! - Render a resolution trace as JSON
//! - Map chain errors to HTTP status codes
//!
//! # Design Decisions
//! - URLs are rendered after sanitization; the caller passes a sanitized trace
//! - The partial trace is always included, also on failure

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::chain::{ChainError, ErrorKind, Hop, Trace};

/// JSON body returned for every resolution.
#[derive(Debug, Serialize)]
pub struct ResolutionBody {
    pub hops: Vec<HopBody>,
    pub result: Option<String>,
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct HopBody {
    pub from: String,
    pub to: String,
    pub using: ResolverBody,
}

#[derive(Debug, Serialize)]
pub struct ResolverBody {
    pub host: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Hop> for HopBody {
    fn from(hop: &Hop) -> Self {
        Self {
            from: hop.from.to_string(),
            to: hop.to.to_string(),
            using: ResolverBody {
                host: hop.using.host().to_string(),
                description: hop.using.description().to_string(),
            },
        }
    }
}

impl From<&ChainError> for ErrorBody {
    fn from(error: &ChainError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<&Trace> for ResolutionBody {
    fn from(trace: &Trace) -> Self {
        Self {
            hops: trace.hops.iter().map(HopBody::from).collect(),
            result: trace.final_url.as_ref().map(ToString::to_string),
            error: trace.error.as_ref().map(ErrorBody::from),
        }
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NoResolverFound | ErrorKind::EmptyPath => StatusCode::BAD_REQUEST,
        ErrorKind::NetworkFailure | ErrorKind::NoRedirectTarget | ErrorKind::MalformedTarget => {
            StatusCode::BAD_GATEWAY
        }
        ErrorKind::CycleDetected | ErrorKind::TooManyHops => StatusCode::LOOP_DETECTED,
    }
}

/// Response for a finished resolution.
pub fn trace_response(trace: &Trace) -> Response {
    let status = trace
        .error
        .as_ref()
        .map(|e| status_for(e.kind()))
        .unwrap_or(StatusCode::OK);
    (status, Json(ResolutionBody::from(trace))).into_response()
}

/// Response for a request rejected before any chain existed.
pub fn error_response(error: &ChainError) -> Response {
    let body = ResolutionBody {
        hops: Vec::new(),
        result: None,
        error: Some(ErrorBody::from(error)),
    };
    (status_for(error.kind()), Json(body)).into_response()
}
