//! Upstream forwarding.
//!
//! Used for both shortlink rewrites (the backend sees the rewritten target,
//! the client still sees its own URL) and pass-through to the page renderer.

use axum::body::Body;
use axum::http::uri::PathAndQuery;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Response, Uri, Version};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

/// Original `Host` of a forwarded request.
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Connection-scoped headers that must not cross a proxy.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Errors while relaying a request upstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    #[error("upstream URI '{0}' has no host")]
    MissingAuthority(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

/// Shared HTTP client for upstream calls.
// TODO: plain HTTP only; https backends need an hyper-rustls connector here.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
}

impl Forwarder {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
        }
    }

    /// Send `req` to `target` (an absolute URL) and relay the response.
    pub async fn forward(
        &self,
        req: Request<Body>,
        target: &str,
    ) -> Result<Response<Body>, ForwardError> {
        let uri: Uri = target.parse().map_err(|source| ForwardError::InvalidUri {
            uri: target.to_string(),
            source,
        })?;
        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| ForwardError::MissingAuthority(target.to_string()))?;

        let (mut parts, body) = req.into_parts();
        let original_host = parts.headers.remove(header::HOST);
        strip_hop_by_hop(&mut parts.headers);

        if let Some(host) = original_host {
            parts
                .headers
                .insert(HeaderName::from_static(X_FORWARDED_HOST), host);
        }
        if let Ok(host) = HeaderValue::from_str(authority.as_str()) {
            parts.headers.insert(header::HOST, host);
        }
        parts.uri = uri;
        parts.version = Version::HTTP_11;

        let response: Response<Incoming> =
            self.client.request(Request::from_parts(parts, body)).await?;
        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

impl Default for Forwarder {
    fn default() -> Self {
        Self::new()
    }
}

/// Join an upstream base URL with the original path and query.
pub fn upstream_target(base: &str, path_and_query: Option<&PathAndQuery>) -> String {
    let tail = path_and_query.map(PathAndQuery::as_str).unwrap_or("/");
    format!("{}{}", base.trim_end_matches('/'), tail)
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}
