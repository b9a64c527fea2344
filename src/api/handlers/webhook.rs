use axum::{body::Bytes, extract::State, http::HeaderMap, response::IntoResponse, Json};
use crate::api::dtos::responses::WebhookAck;
use crate::domain::models::booking::{CAPTURE_DEFERRED, CAPTURE_MANUAL, PAYMENT_FAILED, PAYMENT_REFUNDED};
use crate::domain::models::event::{ChargeSnapshot, GatewayEvent, PaymentIntentSnapshot, SetupIntentSnapshot};
use crate::domain::models::payment::{CardDetails, Payment, RefundDetails, PAY_CANCELLED, PAY_PROCESSING};
use crate::domain::ports::InsertOutcome;
use crate::domain::services::booking_creator::{
    check_existing_booking, create_booking_from_intent, CorrelationIds,
};
use crate::domain::services::metadata::{calculate_deposit_amount, IntentMetadata};
use crate::domain::services::notifications;
use crate::error::AppError;
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Entry point for gateway callbacks.
///
/// Signature failures are rejected with a client error before any handler
/// runs. Once dispatch completes, the gateway always gets an acknowledgement
/// regardless of notification outcomes; only an unexpected handler failure
/// bubbles up as a 500 so the gateway's retry redelivers the event (handlers
/// are idempotent, so redelivery is safe).
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Validation("Missing stripe-signature header".into()))?;

    state.gateway.verify_signature(&body, signature)?;

    let event = GatewayEvent::parse(&body)
        .map_err(|e| AppError::Validation(format!("Unparseable webhook payload: {}", e)))?;

    match event {
        GatewayEvent::AuthorizationHold(intent) => handle_authorization_hold(&state, intent).await?,
        GatewayEvent::CardSaved(setup) => handle_card_saved(&state, setup).await?,
        GatewayEvent::PaymentSucceeded(intent) => handle_payment_succeeded(&state, intent).await?,
        GatewayEvent::PaymentFailed(intent) => handle_payment_failed(&state, intent).await?,
        GatewayEvent::PaymentProcessing(intent) => {
            handle_status_update(&state, &intent.id, PAY_PROCESSING).await?
        }
        GatewayEvent::PaymentCancelled(intent) => {
            handle_status_update(&state, &intent.id, PAY_CANCELLED).await?
        }
        GatewayEvent::ChargeRefunded(charge) => handle_charge_refunded(&state, charge).await?,
        GatewayEvent::Ignored(kind) => {
            info!("Acknowledging unhandled event kind: {}", kind);
        }
    }

    Ok(Json(WebhookAck { received: true }))
}

/// `payment_intent.amount_capturable_updated`: a manual-capture hold was
/// placed. Creates the booking/payment pair when the initiating flow opted
/// in; duplicate deliveries short-circuit before any notification.
async fn handle_authorization_hold(
    state: &AppState,
    intent: PaymentIntentSnapshot,
) -> Result<(), AppError> {
    let metadata = IntentMetadata::from_map(&intent.metadata);

    if !metadata.create_booking_on_authorization {
        info!("Authorization hold {} does not opt into booking creation; ignoring", intent.id);
        return Ok(());
    }

    if check_existing_booking(state.booking_repo.as_ref(), &intent.id).await? {
        info!("Booking already exists for intent {}; duplicate delivery", intent.id);
        return Ok(());
    }

    let deposit_amount = calculate_deposit_amount(&metadata);

    let outcome = create_booking_from_intent(
        state.booking_repo.as_ref(),
        &metadata,
        CorrelationIds {
            payment_intent_id: Some(intent.id.clone()),
            setup_intent_id: None,
            customer_id: intent.customer.clone(),
        },
        CAPTURE_MANUAL,
        deposit_amount,
    )
    .await?;

    let booking = match outcome {
        InsertOutcome::Created(booking) => booking,
        InsertOutcome::Duplicate => {
            info!("Concurrent delivery already created the booking for intent {}", intent.id);
            return Ok(());
        }
    };

    if let InsertOutcome::Duplicate = state
        .payment_repo
        .insert(&Payment::new(booking.id.clone(), intent.id.clone()))
        .await?
    {
        info!("Payment record already exists for intent {}", intent.id);
    }

    info!("Created booking {} from authorization hold {}", booking.id, intent.id);

    notifications::booking_received(state.email_service.clone(), state.templates.clone(), &booking);
    notifications::spawn_admin_alert(
        state.admin_notifier.clone(),
        booking.id.clone(),
        "New booking request",
        format!(
            "{} requested the {} on {} ({})",
            booking.contact_name, booking.space_type, booking.date, booking.confirmation_number
        ),
    );

    Ok(())
}

/// `setup_intent.succeeded`: deferred capture, only the card was saved. The
/// synchronous initiation flow already mailed the customer, so no
/// confirmation email goes out here.
async fn handle_card_saved(state: &AppState, setup: SetupIntentSnapshot) -> Result<(), AppError> {
    let metadata = IntentMetadata::from_map(&setup.metadata);

    if !metadata.create_booking_on_authorization {
        info!("Setup intent {} does not opt into booking creation; ignoring", setup.id);
        return Ok(());
    }

    if check_existing_booking(state.booking_repo.as_ref(), &setup.id).await? {
        info!("Booking already exists for setup intent {}; duplicate delivery", setup.id);
        return Ok(());
    }

    let outcome = create_booking_from_intent(
        state.booking_repo.as_ref(),
        &metadata,
        CorrelationIds {
            payment_intent_id: None,
            setup_intent_id: Some(setup.id.clone()),
            customer_id: setup.customer.clone(),
        },
        CAPTURE_DEFERRED,
        // The full amount is captured later; nothing is held now.
        0,
    )
    .await?;

    let booking = match outcome {
        InsertOutcome::Created(booking) => booking,
        InsertOutcome::Duplicate => {
            info!("Concurrent delivery already created the booking for setup intent {}", setup.id);
            return Ok(());
        }
    };

    if let InsertOutcome::Duplicate = state
        .payment_repo
        .insert(&Payment::new(booking.id.clone(), setup.id.clone()))
        .await?
    {
        info!("Payment record already exists for setup intent {}", setup.id);
    }

    info!("Created booking {} from setup intent {}", booking.id, setup.id);

    notifications::spawn_admin_alert(
        state.admin_notifier.clone(),
        booking.id.clone(),
        "New booking request (card on file)",
        format!(
            "{} requested the {} on {} ({})",
            booking.contact_name, booking.space_type, booking.date, booking.confirmation_number
        ),
    );

    Ok(())
}

async fn handle_payment_succeeded(
    state: &AppState,
    intent: PaymentIntentSnapshot,
) -> Result<(), AppError> {
    let Some(payment) = state.payment_repo.find_by_intent(&intent.id).await? else {
        info!("No payment record for succeeded intent {}; dropping event", intent.id);
        return Ok(());
    };

    let card = match &intent.latest_charge {
        Some(charge_id) => {
            let charge = state.gateway.retrieve_charge(charge_id).await?;
            let details = charge.payment_method_details.and_then(|d| d.card);
            CardDetails {
                brand: details.as_ref().and_then(|c| c.brand.clone()),
                last4: details.as_ref().and_then(|c| c.last4.clone()),
                exp_month: details.as_ref().and_then(|c| c.exp_month),
                exp_year: details.as_ref().and_then(|c| c.exp_year),
                receipt_url: charge.receipt_url,
            }
        }
        None => CardDetails::default(),
    };

    // The payment row carries the monotonicity guard; a no-op there means a
    // stale redelivery and the booking must stay untouched too.
    let transitioned = state
        .payment_repo
        .mark_succeeded(&intent.id, intent.latest_charge.as_deref(), &card, Utc::now())
        .await?;
    if !transitioned {
        info!("Payment {} already settled past SUCCEEDED; dropping stale event", intent.id);
        return Ok(());
    }

    state
        .booking_repo
        .mark_paid_and_confirmed(&payment.booking_id, Utc::now())
        .await?;

    info!("Payment {} succeeded; booking {} is paid and confirmed", intent.id, payment.booking_id);
    Ok(())
}

async fn handle_payment_failed(
    state: &AppState,
    intent: PaymentIntentSnapshot,
) -> Result<(), AppError> {
    let Some(payment) = state.payment_repo.find_by_intent(&intent.id).await? else {
        info!("No payment record for failed intent {}; dropping event", intent.id);
        return Ok(());
    };

    let reason = intent
        .last_payment_error
        .and_then(|e| e.message)
        .unwrap_or_else(|| "Payment failed".to_string());

    let transitioned = state.payment_repo.mark_failed(&intent.id, &reason, Utc::now()).await?;
    if !transitioned {
        info!("Payment {} already settled; dropping stale failure event", intent.id);
        return Ok(());
    }

    state
        .booking_repo
        .set_payment_status(&payment.booking_id, PAYMENT_FAILED)
        .await?;

    info!("Payment {} failed for booking {}: {}", intent.id, payment.booking_id, reason);
    Ok(())
}

async fn handle_status_update(
    state: &AppState,
    intent_id: &str,
    status: &str,
) -> Result<(), AppError> {
    if state.payment_repo.find_by_intent(intent_id).await?.is_none() {
        info!("No payment record for intent {}; dropping {} event", intent_id, status);
        return Ok(());
    }

    if state.payment_repo.set_status(intent_id, status).await? {
        info!("Payment {} moved to {}", intent_id, status);
    } else {
        info!("Payment {} already settled; ignoring {} event", intent_id, status);
    }
    Ok(())
}

/// `charge.refunded`: lookup is by charge id, not intent id.
async fn handle_charge_refunded(state: &AppState, charge: ChargeSnapshot) -> Result<(), AppError> {
    let Some(payment) = state.payment_repo.find_by_charge(&charge.id).await? else {
        info!("No payment record for refunded charge {}; dropping event", charge.id);
        return Ok(());
    };

    let Some(refund) = charge.refunds.as_ref().and_then(|r| r.data.first()) else {
        info!("Refunded charge {} carries no refund record; dropping event", charge.id);
        return Ok(());
    };

    let details = RefundDetails {
        refund_id: refund.id.clone(),
        amount: refund.amount,
        reason: refund.reason.clone(),
    };

    if !state.payment_repo.mark_refunded(&charge.id, &details).await? {
        info!("Charge {} already recorded as refunded; duplicate delivery", charge.id);
        return Ok(());
    }

    state
        .booking_repo
        .set_payment_status(&payment.booking_id, PAYMENT_REFUNDED)
        .await?;

    info!("Charge {} refunded ({}); booking {} marked refunded", charge.id, refund.id, payment.booking_id);
    Ok(())
}
