mod common;

use axum::http::StatusCode;
use common::{authorization_hold_event, default_metadata, parse_body, TestApp};
use serde_json::json;

async fn count_bookings(app: &TestApp) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

async fn count_payments(app: &TestApp) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM payments")
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn repeated_deliveries_create_one_booking() {
    let app = TestApp::new().await;
    let event = authorization_hold_event("pi_dup", default_metadata());

    for _ in 0..5 {
        let response = app.deliver_webhook(&event).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_body(response).await;
        assert_eq!(body["received"], true);
    }

    app.settle().await;

    assert_eq!(count_bookings(&app).await, 1);
    assert_eq!(count_payments(&app).await, 1);

    // Only the first delivery notified anyone.
    assert_eq!(app.emails.sent.lock().unwrap().len(), 1);
    assert_eq!(app.pushes.pushes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_deliveries_collapse_to_one_booking() {
    let app = TestApp::new().await;
    let event = authorization_hold_event("pi_race", default_metadata());

    let (a, b, c) = tokio::join!(
        app.deliver_webhook(&event),
        app.deliver_webhook(&event),
        app.deliver_webhook(&event),
    );

    // Every delivery is acknowledged, whichever one won the insert.
    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::OK);
    assert_eq!(c.status(), StatusCode::OK);

    assert_eq!(count_bookings(&app).await, 1);
    assert_eq!(count_payments(&app).await, 1);

    app.settle().await;
    // The losing deliveries short-circuited before notification dispatch.
    assert_eq!(app.emails.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn setup_intent_deliveries_are_idempotent_too() {
    let app = TestApp::new().await;
    let event = json!({
        "type": "setup_intent.succeeded",
        "data": { "object": {
            "id": "seti_dup",
            "customer": "cus_test",
            "metadata": default_metadata(),
        }}
    });

    for _ in 0..3 {
        let response = app.deliver_webhook(&event).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    app.settle().await;

    assert_eq!(count_bookings(&app).await, 1);

    let (capture_method, deposit): (String, i64) =
        sqlx::query_as("SELECT capture_method, deposit_amount FROM bookings WHERE setup_intent_id = ?")
            .bind("seti_dup")
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(capture_method, "DEFERRED");
    // Nothing is held up front when only the card was saved.
    assert_eq!(deposit, 0);

    // Card-on-file bookings alert the admin but never mail the customer.
    assert!(app.emails.sent.lock().unwrap().is_empty());
    assert_eq!(app.pushes.pushes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn opt_out_metadata_creates_nothing() {
    let app = TestApp::new().await;
    let mut metadata = default_metadata();
    metadata["createBookingOnAuthorization"] = json!("false");

    let response = app
        .deliver_webhook(&authorization_hold_event("pi_optout", metadata))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(count_bookings(&app).await, 0);
    assert_eq!(count_payments(&app).await, 0);
}

#[tokio::test]
async fn booking_fields_come_from_metadata() {
    let app = TestApp::new().await;
    let response = app
        .deliver_webhook(&authorization_hold_event("pi_fields", default_metadata()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let (space_type, total, deposit, status, payment_status, confirmation): (String, i64, i64, String, String, String) =
        sqlx::query_as(
            "SELECT space_type, total_price, deposit_amount, status, payment_status, confirmation_number
             FROM bookings WHERE payment_intent_id = ?",
        )
        .bind("pi_fields")
        .fetch_one(&app.pool)
        .await
        .unwrap();

    assert_eq!(space_type, "meetingRoom");
    assert_eq!(total, 10_000);
    assert_eq!(deposit, 5_000);
    assert_eq!(status, "PENDING");
    assert_eq!(payment_status, "PENDING");
    assert!(confirmation.starts_with("BT-"));
}
