use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crate::api::dtos::requests::{AttendanceRequest, CancelBookingRequest, UpdatePaymentStatusRequest};
use crate::api::dtos::responses::CancellationQuote;
use crate::api::extractors::auth::{AdminUser, StaffUser};
use crate::domain::models::booking::{
    Booking, ATTENDANCE_ABSENT, ATTENDANCE_PRESENT, CAPTURE_MANUAL, PAYMENT_FAILED,
    PAYMENT_PAID, PAYMENT_PENDING, PAYMENT_REFUNDED, STATUS_CANCELLED, STATUS_PENDING,
};
use crate::domain::models::closure::ScheduleClosure;
use crate::domain::services::cancellation::assess_cancellation;
use crate::domain::services::metadata::deposit_from_policy;
use crate::domain::services::notifications;
use crate::error::AppError;
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

const EVENT_SPACE: &str = "eventSpace";

// Gateway intent statuses under which a confirm may proceed.
const INTENT_AUTHORIZED: &[&str] = &["requires_capture", "succeeded"];

pub async fn get_booking(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let booking = find_booking(&state, &booking_id).await?;
    Ok(Json(booking))
}

/// Admin approval of a pending booking.
///
/// When the booking still awaits payment, the gateway is consulted live
/// before anything mutates: a stale local snapshot must not let a booking
/// through whose card authorization has since lapsed.
pub async fn confirm_booking(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let booking = find_booking(&state, &booking_id).await?;

    if booking.status == STATUS_CANCELLED {
        return Err(AppError::Conflict("Booking has been cancelled".to_string()));
    }

    if booking.requires_payment
        && let Some(intent_id) = &booking.payment_intent_id
    {
        let gateway_status = state.gateway.payment_intent_status(intent_id).await?;
        if !INTENT_AUTHORIZED.contains(&gateway_status.as_str()) {
            return Err(AppError::PaymentNotAuthorized { gateway_status });
        }
    }

    let confirmed = state.booking_repo.mark_confirmed(&booking.id, Utc::now()).await?;

    if confirmed.space_type == EVENT_SPACE && !confirmed.is_partial {
        insert_event_closure(&state, &confirmed).await?;
    }

    info!("Booking {} confirmed by admin", confirmed.id);
    notifications::booking_confirmed(state.email_service.clone(), state.templates.clone(), &confirmed);

    Ok(Json(confirmed))
}

/// Closes the shared schedule for the day of a full event-space booking.
/// Keyed by reason text so a re-confirmation attempt cannot double-insert.
async fn insert_event_closure(state: &AppState, booking: &Booking) -> Result<(), AppError> {
    let reason = format!("Event booking {}", booking.confirmation_number);

    if state.closure_repo.exists_for(booking.date, &reason).await? {
        info!("Schedule closure for {} already present", booking.confirmation_number);
        return Ok(());
    }

    let closure = ScheduleClosure::new(booking.date, booking.start_time, booking.end_time, reason);
    state.closure_repo.insert(&closure).await?;
    info!("Closed schedule on {} for event booking {}", booking.date, booking.confirmation_number);
    Ok(())
}

/// Cancels (or rejects, if still pending) a booking. Already-cancelled
/// bookings are returned as-is so retried calls stay harmless.
pub async fn cancel_booking(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    body: Option<Json<CancelBookingRequest>>,
) -> Result<Json<Booking>, AppError> {
    let booking = find_booking(&state, &booking_id).await?;

    if booking.status == STATUS_CANCELLED {
        return Ok(Json(booking));
    }

    let was_pending = booking.status == STATUS_PENDING;
    let reason = body.as_ref().and_then(|b| b.reason.clone());

    let cancelled = state
        .booking_repo
        .mark_cancelled(&booking.id, reason.as_deref(), Utc::now())
        .await?;

    info!(
        "Booking {} {} by admin",
        cancelled.id,
        if was_pending { "rejected" } else { "cancelled" }
    );

    if was_pending {
        notifications::booking_rejected(
            state.email_service.clone(),
            state.templates.clone(),
            &cancelled,
            reason.as_deref(),
        );
    } else {
        notifications::booking_cancelled(state.email_service.clone(), state.templates.clone(), &cancelled);
    }

    Ok(Json(cancelled))
}

/// What cancelling this booking right now would cost, without cancelling it.
pub async fn cancellation_quote(
    _staff: StaffUser,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = find_booking(&state, &booking_id).await?;

    let policy = state
        .policies
        .get(&booking.space_type)
        .cloned()
        .unwrap_or_default();

    Ok(Json(CancellationQuote {
        assessment: assess_cancellation(&booking, &policy, Utc::now()),
        policy_deposit_amount: deposit_from_policy(booking.total_price, &policy.deposit),
    }))
}

/// Front-desk attendance marking. For manual-capture bookings this is the
/// moment the deposit outcome is decided: presence releases the hold,
/// absence captures it, and the customer is told either way.
pub async fn mark_attendance(
    _staff: StaffUser,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(request): Json<AttendanceRequest>,
) -> Result<Json<Booking>, AppError> {
    let attendance_status = match request.attendance.as_str() {
        "present" => ATTENDANCE_PRESENT,
        "absent" => ATTENDANCE_ABSENT,
        other => {
            return Err(AppError::Validation(format!(
                "Unknown attendance value '{}', expected 'present' or 'absent'",
                other
            )));
        }
    };

    let booking = find_booking(&state, &booking_id).await?;

    if booking.status == STATUS_CANCELLED {
        return Err(AppError::Conflict("Booking has been cancelled".to_string()));
    }

    let updated = state.booking_repo.set_attendance(&booking.id, attendance_status).await?;
    info!("Booking {} attendance set to {}", updated.id, attendance_status);

    if updated.capture_method == CAPTURE_MANUAL && updated.requires_payment {
        let captured = attendance_status == ATTENDANCE_ABSENT;
        notifications::deposit_notice(
            state.email_service.clone(),
            state.templates.clone(),
            &updated,
            captured,
        );
    }

    Ok(Json(updated))
}

/// Manual payment-status override, for reconciling out-of-band settlements
/// (bank transfers, on-site card terminal).
pub async fn update_payment_status(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let allowed = [PAYMENT_PENDING, PAYMENT_PAID, PAYMENT_FAILED, PAYMENT_REFUNDED];
    if !allowed.contains(&request.payment_status.as_str()) {
        return Err(AppError::Validation(format!(
            "Unknown payment status '{}'",
            request.payment_status
        )));
    }

    let booking = find_booking(&state, &booking_id).await?;

    state
        .booking_repo
        .set_payment_status(&booking.id, &request.payment_status)
        .await?;

    info!("Booking {} payment status set to {} by admin", booking.id, request.payment_status);
    Ok(StatusCode::NO_CONTENT)
}

async fn find_booking(state: &AppState, booking_id: &str) -> Result<Booking, AppError> {
    state
        .booking_repo
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))
}
