//! Edge gate library.
//!
//! Request routing and access control in front of a multi-tenant web app:
//! short codes are rewritten to the link resolution backend, protected areas
//! are gated by role, and everything else is handed to locale routing.

pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod locale;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::EdgeConfig;
pub use gate::{EdgeAction, EdgeGate, Evaluation};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
