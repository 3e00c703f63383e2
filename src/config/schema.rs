//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Fallback for the shortlink resolution backend.
pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:8000/api";

/// Root configuration for the edge gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Shortlink resolution backend.
    pub backend: BackendConfig,

    /// Page renderer receiving pass-through traffic.
    pub app: AppConfig,

    /// Locale routing settings.
    pub locale: LocaleConfig,

    /// Path classification settings.
    pub routing: RoutingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Shortlink resolution backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend API. Left unset, [`DEFAULT_BACKEND_BASE_URL`]
    /// is substituted when the gate is compiled.
    pub base_url: Option<String>,
}

/// Upstream page renderer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where allowed requests are forwarded for rendering.
    pub upstream_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstream_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Locale routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Supported two-letter locale codes.
    pub locales: Vec<String>,

    /// Locale used when nothing else matches.
    pub default_locale: String,

    /// Cookie remembering the visitor's last locale.
    pub cookie_name: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            locales: vec!["en".into(), "fr".into(), "es".into(), "de".into()],
            default_locale: "en".to_string(),
            cookie_name: "NEXT_LOCALE".to_string(),
        }
    }
}

/// Path classification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// First path segment reserved for the API (never gated).
    pub api_prefix: String,

    /// First path segments reserved for framework assets.
    pub asset_prefixes: Vec<String>,

    /// File extensions served as static assets (without the dot).
    pub asset_extensions: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api_prefix: "api".to_string(),
            asset_prefixes: vec!["_next".into(), "_vercel".into()],
            asset_extensions: [
                "ico", "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "css", "js", "map",
                "txt", "xml", "json", "webmanifest", "woff", "woff2", "ttf", "otf",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
