//! Locale routing.
//!
//! Runs last, only for requests the gate let through. The gate treats the
//! delegate as a black box: whatever it answers is what the client gets.

pub mod prefix;

use serde::Serialize;

use crate::http::request::IncomingRequest;

pub use prefix::PrefixLocaleDelegate;

/// What the locale pass wants done with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "locale_action", rename_all = "snake_case")]
pub enum LocaleOutcome {
    /// Render the page in this locale.
    Render { locale: String },
    /// Send the client to the locale-prefixed URL first.
    RedirectTo { location: String },
}

/// Locale-aware routing invoked after access control allows a request.
pub trait LocaleDelegate: Send + Sync + std::fmt::Debug {
    fn route(&self, request: &IncomingRequest) -> LocaleOutcome;
}
