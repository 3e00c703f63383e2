//! Always-prefixed locale routing.
//!
//! Every page lives under `/{locale}/…`. Requests without a prefix are
//! redirected, choosing the locale from the locale cookie, then the
//! `Accept-Language` header, then the configured default.

use crate::config::LocaleConfig;
use crate::http::request::IncomingRequest;
use crate::locale::{LocaleDelegate, LocaleOutcome};

#[derive(Debug, Clone)]
pub struct PrefixLocaleDelegate {
    locales: Vec<String>,
    default_locale: String,
    cookie_name: String,
}

impl PrefixLocaleDelegate {
    pub fn from_config(config: &LocaleConfig) -> Self {
        Self {
            locales: config.locales.clone(),
            default_locale: config.default_locale.clone(),
            cookie_name: config.cookie_name.clone(),
        }
    }

    fn supported(&self, candidate: &str) -> Option<&str> {
        self.locales
            .iter()
            .find(|l| l.as_str() == candidate)
            .map(String::as_str)
    }

    fn preferred(&self, request: &IncomingRequest) -> String {
        if let Some(locale) = request.cookie(&self.cookie_name).and_then(|c| self.supported(c)) {
            return locale.to_string();
        }

        request
            .accept_language()
            .and_then(|header| {
                ranked_languages(header)
                    .into_iter()
                    .find_map(|lang| self.supported(&lang).map(str::to_string))
            })
            .unwrap_or_else(|| self.default_locale.clone())
    }
}

impl LocaleDelegate for PrefixLocaleDelegate {
    fn route(&self, request: &IncomingRequest) -> LocaleOutcome {
        if let Some(locale) = request.segments().first().and_then(|s| self.supported(s)) {
            return LocaleOutcome::Render {
                locale: locale.to_string(),
            };
        }

        let locale = self.preferred(request);
        let path = match request.path() {
            "/" => String::new(),
            other => other.to_string(),
        };
        let location = match request.raw_query() {
            Some(query) => format!("/{locale}{path}?{query}"),
            None => format!("/{locale}{path}"),
        };
        LocaleOutcome::RedirectTo { location }
    }
}

/// Primary language subtags from an `Accept-Language` header, best first.
/// Entries with `q=0` and the `*` wildcard are dropped.
fn ranked_languages(header: &str) -> Vec<String> {
    let mut weighted: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let q = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            if q <= 0.0 {
                return None;
            }
            let primary = tag.split('-').next().unwrap_or(tag).to_ascii_lowercase();
            Some((primary, q))
        })
        .collect();

    // Stable sort keeps header order among equal weights.
    weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
    weighted.into_iter().map(|(lang, _)| lang).collect()
}
