mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{authorization_hold_event, default_metadata, TestApp};
use coworking_backend::domain::models::event::ChargeSnapshot;
use serde_json::json;
use tower::ServiceExt;

async fn booking_row(app: &TestApp, intent_id: &str) -> (String, String, String) {
    sqlx::query_as("SELECT id, status, payment_status FROM bookings WHERE payment_intent_id = ?")
        .bind(intent_id)
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

async fn payment_status(app: &TestApp, intent_id: &str) -> String {
    sqlx::query_scalar("SELECT status FROM payments WHERE intent_id = ?")
        .bind(intent_id)
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

async fn create_booking(app: &TestApp, intent_id: &str) {
    let response = app
        .deliver_webhook(&authorization_hold_event(intent_id, default_metadata()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

fn intent_event(kind: &str, intent_id: &str) -> serde_json::Value {
    json!({
        "type": kind,
        "data": { "object": { "id": intent_id } }
    })
}

#[tokio::test]
async fn succeeded_marks_booking_paid_and_confirmed() {
    let app = TestApp::new().await;
    create_booking(&app, "pi_pay").await;

    app.gateway.set_charge(ChargeSnapshot {
        id: "ch_pay".to_string(),
        payment_intent: Some("pi_pay".to_string()),
        receipt_url: Some("https://receipts.example/1".to_string()),
        payment_method_details: serde_json::from_value(
            json!({ "card": { "brand": "visa", "last4": "4242", "exp_month": 4, "exp_year": 2030 } }),
        )
        .unwrap(),
        refunds: None,
    });

    let event = json!({
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_pay", "latest_charge": "ch_pay" } }
    });
    let response = app.deliver_webhook(&event).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (_, status, booking_payment) = booking_row(&app, "pi_pay").await;
    assert_eq!(status, "CONFIRMED");
    assert_eq!(booking_payment, "PAID");
    assert_eq!(payment_status(&app, "pi_pay").await, "SUCCEEDED");

    let (brand, last4): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT card_brand, card_last4 FROM payments WHERE intent_id = ?")
            .bind("pi_pay")
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(brand.as_deref(), Some("visa"));
    assert_eq!(last4.as_deref(), Some("4242"));
}

#[tokio::test]
async fn succeeded_before_authorization_hold_is_a_no_op() {
    let app = TestApp::new().await;

    // No booking and no payment record exist yet for this intent.
    let response = app
        .deliver_webhook(&intent_event("payment_intent.succeeded", "pi_early"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let bookings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(bookings, 0);

    // The hold arriving afterwards still creates the booking normally.
    create_booking(&app, "pi_early").await;
    let (_, status, _) = booking_row(&app, "pi_early").await;
    assert_eq!(status, "PENDING");
}

#[tokio::test]
async fn failed_records_reason_and_flags_booking() {
    let app = TestApp::new().await;
    create_booking(&app, "pi_fail").await;

    let event = json!({
        "type": "payment_intent.payment_failed",
        "data": { "object": {
            "id": "pi_fail",
            "last_payment_error": { "message": "Your card was declined." }
        }}
    });
    let response = app.deliver_webhook(&event).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (_, _, booking_payment) = booking_row(&app, "pi_fail").await;
    assert_eq!(booking_payment, "FAILED");
    assert_eq!(payment_status(&app, "pi_fail").await, "FAILED");

    let reason: Option<String> =
        sqlx::query_scalar("SELECT failure_reason FROM payments WHERE intent_id = ?")
            .bind("pi_fail")
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(reason.as_deref(), Some("Your card was declined."));
}

#[tokio::test]
async fn processing_and_cancelled_move_payment_status() {
    let app = TestApp::new().await;
    create_booking(&app, "pi_proc").await;

    app.deliver_webhook(&intent_event("payment_intent.processing", "pi_proc")).await;
    assert_eq!(payment_status(&app, "pi_proc").await, "PROCESSING");

    app.deliver_webhook(&intent_event("payment_intent.canceled", "pi_proc")).await;
    assert_eq!(payment_status(&app, "pi_proc").await, "CANCELLED");
}

#[tokio::test]
async fn late_status_events_never_downgrade_a_settled_payment() {
    let app = TestApp::new().await;
    create_booking(&app, "pi_settled").await;

    app.deliver_webhook(&json!({
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_settled" } }
    }))
    .await;
    assert_eq!(payment_status(&app, "pi_settled").await, "SUCCEEDED");

    // A stale processing event redelivered after settlement changes nothing.
    app.deliver_webhook(&intent_event("payment_intent.processing", "pi_settled")).await;
    assert_eq!(payment_status(&app, "pi_settled").await, "SUCCEEDED");
}

#[tokio::test]
async fn refund_flows_through_charge_lookup() {
    let app = TestApp::new().await;
    create_booking(&app, "pi_ref").await;

    app.gateway.set_charge(ChargeSnapshot {
        id: "ch_ref".to_string(),
        payment_intent: Some("pi_ref".to_string()),
        receipt_url: None,
        payment_method_details: None,
        refunds: None,
    });
    app.deliver_webhook(&json!({
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_ref", "latest_charge": "ch_ref" } }
    }))
    .await;

    let event = json!({
        "type": "charge.refunded",
        "data": { "object": {
            "id": "ch_ref",
            "payment_intent": "pi_ref",
            "refunds": { "data": [ { "id": "re_1", "amount": 5000, "reason": "requested_by_customer" } ] }
        }}
    });
    let response = app.deliver_webhook(&event).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(payment_status(&app, "pi_ref").await, "REFUNDED");
    let (_, _, booking_payment) = booking_row(&app, "pi_ref").await;
    assert_eq!(booking_payment, "REFUNDED");

    let (refund_id, amount): (Option<String>, Option<i64>) =
        sqlx::query_as("SELECT refund_id, refund_amount FROM payments WHERE intent_id = ?")
            .bind("pi_ref")
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(refund_id.as_deref(), Some("re_1"));
    assert_eq!(amount, Some(5000));
}

#[tokio::test]
async fn redelivered_succeeded_after_refund_keeps_booking_refunded() {
    let app = TestApp::new().await;
    create_booking(&app, "pi_late").await;

    app.gateway.set_charge(ChargeSnapshot {
        id: "ch_late".to_string(),
        payment_intent: Some("pi_late".to_string()),
        receipt_url: None,
        payment_method_details: None,
        refunds: None,
    });
    let succeeded = json!({
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_late", "latest_charge": "ch_late" } }
    });
    app.deliver_webhook(&succeeded).await;

    app.deliver_webhook(&json!({
        "type": "charge.refunded",
        "data": { "object": {
            "id": "ch_late",
            "refunds": { "data": [ { "id": "re_late", "amount": 10000 } ] }
        }}
    }))
    .await;

    let (_, _, booking_payment) = booking_row(&app, "pi_late").await;
    assert_eq!(booking_payment, "REFUNDED");

    // The gateway redelivers the old success event after the refund settled.
    let response = app.deliver_webhook(&succeeded).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(payment_status(&app, "pi_late").await, "REFUNDED");
    let (_, _, booking_payment) = booking_row(&app, "pi_late").await;
    assert_eq!(booking_payment, "REFUNDED");
}

#[tokio::test]
async fn failed_event_after_refund_leaves_both_records_refunded() {
    let app = TestApp::new().await;
    create_booking(&app, "pi_latefail").await;

    app.gateway.set_charge(ChargeSnapshot {
        id: "ch_latefail".to_string(),
        payment_intent: Some("pi_latefail".to_string()),
        receipt_url: None,
        payment_method_details: None,
        refunds: None,
    });
    app.deliver_webhook(&json!({
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_latefail", "latest_charge": "ch_latefail" } }
    }))
    .await;
    app.deliver_webhook(&json!({
        "type": "charge.refunded",
        "data": { "object": {
            "id": "ch_latefail",
            "refunds": { "data": [ { "id": "re_lf", "amount": 10000 } ] }
        }}
    }))
    .await;

    let response = app
        .deliver_webhook(&json!({
            "type": "payment_intent.payment_failed",
            "data": { "object": {
                "id": "pi_latefail",
                "last_payment_error": { "message": "stale retry" }
            }}
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(payment_status(&app, "pi_latefail").await, "REFUNDED");
    let (_, _, booking_payment) = booking_row(&app, "pi_latefail").await;
    assert_eq!(booking_payment, "REFUNDED");
}

#[tokio::test]
async fn refund_for_unknown_charge_is_acknowledged() {
    let app = TestApp::new().await;

    let event = json!({
        "type": "charge.refunded",
        "data": { "object": {
            "id": "ch_ghost",
            "refunds": { "data": [ { "id": "re_9", "amount": 100 } ] }
        }}
    });
    let response = app.deliver_webhook(&event).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_event_kind_is_acknowledged() {
    let app = TestApp::new().await;

    let event = json!({
        "type": "customer.subscription.updated",
        "data": { "object": { "id": "sub_1" } }
    });
    let response = app.deliver_webhook(&event).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn bad_signature_is_rejected_before_dispatch() {
    let app = TestApp::new().await;
    let event = authorization_hold_event("pi_forged", default_metadata());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/webhooks/stripe")
                .header("stripe-signature", "t=0,v1=wrong")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(event.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bookings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(bookings, 0);
}

#[tokio::test]
async fn missing_signature_header_is_rejected() {
    let app = TestApp::new().await;
    let event = authorization_hold_event("pi_nosig", default_metadata());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/webhooks/stripe")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(event.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
