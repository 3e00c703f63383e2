//! Shortlink rewrite.
//!
//! Hands short codes to the redirect-resolution backend. The gate only
//! computes the target; the HTTP layer forwards the request and relays
//! whatever the backend answers.

use serde::Serialize;

use crate::config::DEFAULT_BACKEND_BASE_URL;
use crate::routing::classifier::RouteClass;

/// A server-side rewrite for one short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteAction {
    pub code: String,
    pub target: String,
}

/// Builds rewrite targets under `{base_url}/links/`.
#[derive(Debug, Clone)]
pub struct ShortlinkProxy {
    base_url: String,
}

impl ShortlinkProxy {
    /// A blank or missing base URL falls back to [`DEFAULT_BACKEND_BASE_URL`].
    pub fn new(base_url: Option<&str>) -> Self {
        let base_url = match base_url.map(str::trim).filter(|b| !b.is_empty()) {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => {
                tracing::warn!(
                    default = DEFAULT_BACKEND_BASE_URL,
                    "backend.base_url is not configured, using default"
                );
                DEFAULT_BACKEND_BASE_URL.to_string()
            }
        };
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a rewrite for shortlink candidates, `None` for anything else.
    /// The code is re-encoded into the target path.
    pub fn try_rewrite(&self, class: &RouteClass) -> Option<RewriteAction> {
        match class {
            RouteClass::ShortlinkCandidate { code } => Some(RewriteAction {
                code: code.clone(),
                target: format!("{}/links/{}", self.base_url, urlencoding::encode(code)),
            }),
            _ => None,
        }
    }
}
