//! In-flight request cap.
//!
//! Requests beyond `listener.max_connections` are shed with 503 instead of
//! queueing.
//!
//! A permit is held until the inner service returns the response head. A
//! streamed upstream body that is still being relayed no longer counts.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Shared permit pool.
#[derive(Clone)]
pub struct InFlightLimit {
    permits: Arc<Semaphore>,
}

impl InFlightLimit {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

pub async fn limit_middleware(
    State(limit): State<InFlightLimit>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match limit.permits.clone().try_acquire_owned() {
        Ok(_permit) => next.run(request).await,
        Err(_) => {
            tracing::warn!(path = %request.uri().path(), "In-flight limit reached, shedding request");
            (StatusCode::SERVICE_UNAVAILABLE, "Server busy").into_response()
        }
    }
}
