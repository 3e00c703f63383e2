//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Extract routing-relevant information (path, query, cookies)
//! - Present it to the gate as an immutable snapshot
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The snapshot owns its data; the original request is forwarded untouched
//! - Duplicate query keys and cookies: first occurrence wins

use axum::http::{header, HeaderMap, HeaderValue, Request};
use std::collections::HashMap;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};

use crate::routing::classifier::path_segments;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a v4 UUID for every request that does not already carry one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Layer that stamps `x-request-id` on incoming requests.
pub fn set_request_id_layer() -> SetRequestIdLayer<UuidRequestId> {
    SetRequestIdLayer::new(header::HeaderName::from_static(X_REQUEST_ID), UuidRequestId)
}

/// Layer that copies `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(header::HeaderName::from_static(X_REQUEST_ID))
}

/// Read the request ID assigned by [`set_request_id_layer`].
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// The parts of a request the gate looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingRequest {
    path: String,
    raw_query: Option<String>,
    query_params: HashMap<String, String>,
    cookies: HashMap<String, String>,
    accept_language: Option<String>,
}

impl IncomingRequest {
    /// Start from a bare path. An empty path is treated as `/`.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path: if path.is_empty() { "/".to_string() } else { path },
            ..Default::default()
        }
    }

    /// Snapshot an HTTP request.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let mut incoming = Self::new(req.uri().path()).with_query(req.uri().query().unwrap_or(""));

        for value in req.headers().get_all(header::COOKIE) {
            if let Ok(raw) = value.to_str() {
                parse_cookie_header(raw, &mut incoming.cookies);
            }
        }

        incoming.accept_language = req
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        incoming
    }

    pub fn with_query(mut self, query: &str) -> Self {
        let query = query.trim_start_matches('?');
        if query.is_empty() {
            return self;
        }
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            self.query_params.entry(k.into_owned()).or_insert_with(|| v.into_owned());
        }
        self.raw_query = Some(query.to_string());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.entry(name.into()).or_insert_with(|| value.into());
        self
    }

    pub fn with_accept_language(mut self, value: impl Into<String>) -> Self {
        self.accept_language = Some(value.into());
        self
    }

    /// Raw (percent-encoded) path, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Percent-decoded path segments, empty segments skipped.
    pub fn segments(&self) -> Vec<String> {
        path_segments(&self.path)
    }

    /// Query string as received, without the leading `?`.
    pub fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    /// Decoded query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn accept_language(&self) -> Option<&str> {
        self.accept_language.as_deref()
    }
}

/// Split a `Cookie:` header into name/value pairs. Values are kept raw.
fn parse_cookie_header(raw: &str, into: &mut HashMap<String, String>) {
    for pair in raw.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = value.trim().trim_matches('"');
        into.entry(name.to_string()).or_insert_with(|| value.to_string());
    }
}
