use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{booking_admin, health, webhook};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Gateway callbacks
        .route("/api/v1/webhooks/stripe", post(webhook::stripe_webhook))

        // Admin booking management
        .route("/api/v1/bookings/{booking_id}", get(booking_admin::get_booking))
        .route("/api/v1/bookings/{booking_id}/confirm", post(booking_admin::confirm_booking))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking_admin::cancel_booking))
        .route("/api/v1/bookings/{booking_id}/payment-status", put(booking_admin::update_payment_status))

        // Front desk
        .route("/api/v1/bookings/{booking_id}/attendance", post(booking_admin::mark_attendance))
        .route("/api/v1/bookings/{booking_id}/cancellation-quote", get(booking_admin::cancellation_quote))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
