//! Edge gate middleware.
//! Runs the gate on every request and carries out its verdict.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::gate::EdgeAction;
use crate::http::request::{request_id, IncomingRequest};
use crate::http::response::{bad_gateway, redirect, X_EDGE_LOCALE};
use crate::http::server::AppState;
use crate::locale::LocaleOutcome;
use crate::observability::metrics;

pub async fn edge_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let live = state.live.load_full();
    let request_id = request_id(req.headers()).to_string();

    let incoming = IncomingRequest::from_request(&req);
    let evaluation = live.gate.evaluate(&incoming);

    if let Some(rule) = evaluation.rule {
        metrics::record_rule_hit(rule);
    }

    let response = match &evaluation.action {
        EdgeAction::Bypass => next.run(req).await,

        EdgeAction::Rewrite { target } => match state.forwarder.forward(req, target).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(request_id = %request_id, target = %target, error = %e, "Rewrite failed");
                bad_gateway()
            }
        },

        EdgeAction::Redirect { location } => {
            tracing::debug!(
                request_id = %request_id,
                rule = evaluation.rule.unwrap_or("none"),
                location = %location,
                "Redirecting"
            );
            redirect(location)
        }

        EdgeAction::Locale {
            outcome: LocaleOutcome::Render { locale },
        } => {
            if let Ok(value) = HeaderValue::from_str(locale) {
                req.headers_mut()
                    .insert(HeaderName::from_static(X_EDGE_LOCALE), value);
            }
            next.run(req).await
        }

        EdgeAction::Locale {
            outcome: LocaleOutcome::RedirectTo { location },
        } => redirect(location),
    };

    metrics::record_request(evaluation.outcome(), response.status().as_u16(), start);
    response
}
