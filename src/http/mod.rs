//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, snapshot for the gate)
//!     → middleware/edge.rs (run the gate, act on its verdict)
//!     → forward.rs (rewrite to backend, or pass through to renderer)
//!     → response.rs (redirects and error responses)
//! ```

pub mod forward;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{IncomingRequest, X_REQUEST_ID};
pub use server::{AppState, HttpServer, LiveConfig};
