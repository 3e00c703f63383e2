//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Locale codes must be usable as path prefixes
//! - Upstream URLs must be plain http(s)
//! - The API prefix must not shadow a reserved route name
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::EdgeConfig;
use crate::routing::SpecialRoute;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("locale list is empty")]
    NoLocales,

    #[error("locale '{0}' is not a two-letter lowercase code")]
    InvalidLocale(String),

    #[error("default locale '{0}' is not in the locale list")]
    UnknownDefaultLocale(String),

    #[error("{field} '{value}' is not a valid http(s) URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("api prefix '{0}' collides with a reserved route name")]
    ReservedApiPrefix(String),

    #[error("api prefix must be a single non-empty path segment, got '{0}'")]
    InvalidApiPrefix(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.locale.locales.is_empty() {
        errors.push(ValidationError::NoLocales);
    }
    for locale in &config.locale.locales {
        if !is_locale_code(locale) {
            errors.push(ValidationError::InvalidLocale(locale.clone()));
        }
    }
    if !config.locale.locales.contains(&config.locale.default_locale) {
        errors.push(ValidationError::UnknownDefaultLocale(
            config.locale.default_locale.clone(),
        ));
    }

    if let Some(base) = &config.backend.base_url {
        // Blank is tolerated here; the gate falls back to the default.
        if !base.trim().is_empty() && !is_http_url(base) {
            errors.push(ValidationError::InvalidUrl {
                field: "backend.base_url",
                value: base.clone(),
            });
        }
    }
    if !is_http_url(&config.app.upstream_url) {
        errors.push(ValidationError::InvalidUrl {
            field: "app.upstream_url",
            value: config.app.upstream_url.clone(),
        });
    }

    let api_prefix = &config.routing.api_prefix;
    if api_prefix.is_empty() || api_prefix.contains('/') {
        errors.push(ValidationError::InvalidApiPrefix(api_prefix.clone()));
    } else if SpecialRoute::from_segment(api_prefix).is_some() {
        errors.push(ValidationError::ReservedApiPrefix(api_prefix.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_locale_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_lowercase())
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&EdgeConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = EdgeConfig::default();
        config.locale.locales = vec!["EN".into()];
        config.locale.default_locale = "en".into();
        config.backend.base_url = Some("ftp://files".into());
        config.routing.api_prefix = "admin".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidLocale("EN".into()),
                ValidationError::UnknownDefaultLocale("en".into()),
                ValidationError::InvalidUrl {
                    field: "backend.base_url",
                    value: "ftp://files".into(),
                },
                ValidationError::ReservedApiPrefix("admin".into()),
                ValidationError::ZeroTimeout,
            ]
        );
    }

    #[test]
    fn test_blank_backend_url_is_tolerated() {
        let mut config = EdgeConfig::default();
        config.backend.base_url = Some("  ".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_api_prefix_must_be_one_segment() {
        let mut config = EdgeConfig::default();
        config.routing.api_prefix = "api/v1".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidApiPrefix("api/v1".into())])
        );
    }
}
