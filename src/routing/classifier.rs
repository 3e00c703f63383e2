//! Path classification.
//!
//! # Responsibilities
//! - Recognize static assets and API traffic (never gated)
//! - Separate short codes from application pages
//! - Split an optional locale prefix off application paths
//!
//! # Design Decisions
//! - Operates on the full path, before any locale handling
//! - Segments are percent-decoded before matching; an encoded `/` splits
//! - First match wins; rule order mirrors the gate's precedence
//! - Segment matching is exact and case-sensitive
//! - Anything unrecognized is an ordinary app route (fail open)

use serde::Serialize;
use std::borrow::Cow;

use crate::config::{LocaleConfig, RoutingConfig};
use crate::routing::vocabulary::SpecialRoute;

/// Category assigned to a request path before any auth logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum RouteClass {
    StaticAsset,
    ApiPassthrough,
    ShortlinkCandidate {
        code: String,
    },
    SpecialRoute {
        locale: Option<String>,
        route: SpecialRoute,
        /// Segments after the reserved name.
        rest: Vec<String>,
    },
    LocaleAppRoute {
        locale: Option<String>,
        subpath: String,
    },
}

impl RouteClass {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RouteClass::StaticAsset => "static_asset",
            RouteClass::ApiPassthrough => "api",
            RouteClass::ShortlinkCandidate { .. } => "shortlink",
            RouteClass::SpecialRoute { .. } => "special",
            RouteClass::LocaleAppRoute { .. } => "app",
        }
    }

    /// The locale prefix carried by the path, if any.
    pub fn locale(&self) -> Option<&str> {
        match self {
            RouteClass::SpecialRoute { locale, .. } | RouteClass::LocaleAppRoute { locale, .. } => {
                locale.as_deref()
            }
            _ => None,
        }
    }
}

/// Percent-decoded, non-empty path segments.
///
/// A segment that does not decode to UTF-8 is kept as received.
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .flat_map(|raw| {
            let decoded = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));
            decoded
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Classifies request paths. Immutable once built.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    locales: Vec<String>,
    api_prefix: String,
    asset_prefixes: Vec<String>,
    asset_extensions: Vec<String>,
}

impl PathClassifier {
    pub fn from_config(routing: &RoutingConfig, locale: &LocaleConfig) -> Self {
        Self {
            locales: locale.locales.clone(),
            api_prefix: routing.api_prefix.clone(),
            asset_prefixes: routing.asset_prefixes.clone(),
            asset_extensions: routing
                .asset_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether `segment` is one of the configured locale codes.
    pub fn is_locale(&self, segment: &str) -> bool {
        self.locales.iter().any(|l| l == segment)
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        let segments = path_segments(path);

        if self.is_static_asset(&segments) {
            return RouteClass::StaticAsset;
        }

        if segments.first() == Some(&self.api_prefix) {
            return RouteClass::ApiPassthrough;
        }

        if let [only] = segments.as_slice() {
            if !self.is_locale(only) && SpecialRoute::from_segment(only).is_none() {
                return RouteClass::ShortlinkCandidate { code: only.clone() };
            }
        }

        let (locale, app_segments) = match segments.split_first() {
            Some((first, rest)) if self.is_locale(first) => (Some(first.clone()), rest),
            _ => (None, segments.as_slice()),
        };

        if let Some((first, rest)) = app_segments.split_first() {
            if let Some(route) = SpecialRoute::from_segment(first) {
                return RouteClass::SpecialRoute {
                    locale,
                    route,
                    rest: rest.to_vec(),
                };
            }
        }

        RouteClass::LocaleAppRoute {
            locale,
            subpath: format!("/{}", app_segments.join("/")),
        }
    }

    fn is_static_asset(&self, segments: &[String]) -> bool {
        if let Some(first) = segments.first() {
            if self.asset_prefixes.iter().any(|p| p == first) {
                return true;
            }
        }

        segments
            .last()
            .and_then(|last| last.rsplit_once('.'))
            .map(|(stem, ext)| {
                !stem.is_empty() && self.asset_extensions.contains(&ext.to_ascii_lowercase())
            })
            .unwrap_or(false)
    }
}
