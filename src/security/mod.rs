//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Request cookies
//!     → identity.rs (auth_token presence, role from user_data)
//!     → access_control.rs (ordered rule table over route class + identity)
//!     → Allow, or a redirect to login / a role home / a canonical page
//! ```
//!
//! # Design Decisions
//! - Identity is a value passed along, never stored between requests
//! - Unreadable identity data degrades to the lowest tier, never to an error
//! - Rule order is explicit data, not nested conditionals

pub mod access_control;
pub mod identity;

pub use access_control::{decide, AccessDecision, Verdict};
pub use identity::{resolve_identity, Identity, Role};
