//! Request middleware.

pub mod edge;
pub mod limit;

pub use edge::edge_middleware;
pub use limit::{limit_middleware, InFlightLimit};
