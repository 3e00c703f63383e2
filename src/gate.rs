//! The request gate.
//!
//! ```text
//! path ──▶ classify ──▶ asset / api ─────────────────────────▶ Bypass
//!              │
//!              ├──▶ shortlink candidate ──▶ rewrite ─────────▶ Rewrite
//!              │
//!              └──▶ resolve identity ──▶ rule table ──┬──────▶ Redirect
//!                                                     └─allow─▶ Locale(delegate outcome)
//! ```
//!
//! Everything here is synchronous and side-effect free apart from logging.
//! One gate is compiled per configuration and shared read-only.

use serde::Serialize;
use std::sync::Arc;

use crate::config::EdgeConfig;
use crate::http::request::IncomingRequest;
use crate::locale::{LocaleDelegate, LocaleOutcome, PrefixLocaleDelegate};
use crate::routing::{PathClassifier, RouteClass, ShortlinkProxy};
use crate::security::access_control::redirect_location;
use crate::security::{decide, resolve_identity, AccessDecision, Identity};

/// What to do with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EdgeAction {
    /// Asset or API traffic; forward untouched.
    Bypass,
    /// Forward to the link backend; the client URL is unchanged.
    Rewrite { target: String },
    /// Send the client elsewhere.
    Redirect { location: String },
    /// No terminal decision; the locale delegate answered.
    Locale { outcome: LocaleOutcome },
}

/// Full record of one evaluation, for logs and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub class: RouteClass,
    /// Only resolved when access control ran.
    pub identity: Option<Identity>,
    pub rule: Option<&'static str>,
    pub action: EdgeAction,
}

impl Evaluation {
    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match &self.action {
            EdgeAction::Bypass => "bypass",
            EdgeAction::Rewrite { .. } => "rewrite",
            EdgeAction::Redirect { .. } => "redirect",
            EdgeAction::Locale {
                outcome: LocaleOutcome::Render { .. },
            } => "render",
            EdgeAction::Locale {
                outcome: LocaleOutcome::RedirectTo { .. },
            } => "locale_redirect",
        }
    }
}

/// Compiled routing and access policy.
#[derive(Debug, Clone)]
pub struct EdgeGate {
    classifier: PathClassifier,
    shortlinks: ShortlinkProxy,
    locale: Arc<dyn LocaleDelegate>,
}

impl EdgeGate {
    pub fn from_config(config: &EdgeConfig) -> Self {
        Self::with_delegate(
            config,
            Arc::new(PrefixLocaleDelegate::from_config(&config.locale)),
        )
    }

    /// Build a gate around a custom locale pass.
    pub fn with_delegate(config: &EdgeConfig, locale: Arc<dyn LocaleDelegate>) -> Self {
        Self {
            classifier: PathClassifier::from_config(&config.routing, &config.locale),
            shortlinks: ShortlinkProxy::new(config.backend.base_url.as_deref()),
            locale,
        }
    }

    pub fn classifier(&self) -> &PathClassifier {
        &self.classifier
    }

    pub fn shortlinks(&self) -> &ShortlinkProxy {
        &self.shortlinks
    }

    pub fn evaluate(&self, request: &IncomingRequest) -> Evaluation {
        let class = self.classifier.classify(request.path());

        if matches!(class, RouteClass::StaticAsset | RouteClass::ApiPassthrough) {
            return Evaluation {
                class,
                identity: None,
                rule: None,
                action: EdgeAction::Bypass,
            };
        }

        if let Some(rewrite) = self.shortlinks.try_rewrite(&class) {
            tracing::info!(code = %rewrite.code, target = %rewrite.target, "Shortlink rewrite");
            return Evaluation {
                class,
                identity: None,
                rule: Some("shortlink_rewrite"),
                action: EdgeAction::Rewrite {
                    target: rewrite.target,
                },
            };
        }

        let identity = resolve_identity(request.cookies());
        let verdict = decide(&class, &identity, request);

        let action = match verdict.decision {
            AccessDecision::Allow => EdgeAction::Locale {
                outcome: self.locale.route(request),
            },
            AccessDecision::RewriteTo { target } => EdgeAction::Rewrite { target },
            AccessDecision::RedirectTo { path, query } => EdgeAction::Redirect {
                location: redirect_location(&path, query.as_ref()),
            },
        };

        tracing::debug!(
            path = %request.path(),
            class = class.label(),
            authenticated = identity.is_authenticated,
            role = ?identity.role,
            rule = verdict.rule.unwrap_or("none"),
            "Access decision"
        );

        Evaluation {
            class,
            identity: Some(identity),
            rule: verdict.rule,
            action,
        }
    }
}
