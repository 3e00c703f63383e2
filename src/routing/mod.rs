//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Raw request path
//!     → classifier.rs (asset / api / shortlink / special / app)
//!     → shortlink.rs (rewrite target for short codes)
//!     → vocabulary.rs (reserved names and their tiers)
//! ```
//!
//! # Design Decisions
//! - Classifier compiled from config at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always yields same class
//! - One vocabulary for reserved names

pub mod classifier;
pub mod shortlink;
pub mod vocabulary;

pub use classifier::{PathClassifier, RouteClass};
pub use shortlink::{RewriteAction, ShortlinkProxy};
pub use vocabulary::{RouteTier, SpecialRoute};
