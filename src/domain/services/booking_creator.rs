use crate::domain::models::booking::{
    self, Booking, ATTENDANCE_UNSET, PAYMENT_PENDING, STATUS_PENDING,
};
use crate::domain::ports::{BookingRepository, InsertOutcome};
use crate::domain::services::metadata::IntentMetadata;
use crate::error::AppError;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

/// Gateway correlation for a new booking: exactly one of the two intent ids.
pub struct CorrelationIds {
    pub payment_intent_id: Option<String>,
    pub setup_intent_id: Option<String>,
    pub customer_id: Option<String>,
}

/// Pre-check by correlation id. Cheap short-circuit only; the insert
/// constraint is what actually closes the time-of-check/time-of-use gap.
pub async fn check_existing_booking(
    repo: &dyn BookingRepository,
    correlation_id: &str,
) -> Result<bool, AppError> {
    Ok(repo.find_by_correlation_id(correlation_id).await?.is_some())
}

/// Builds the full booking document from parsed intent metadata and inserts
/// it behind the correlation-id uniqueness constraint.
///
/// Concurrent deliveries of the same event collapse into
/// `InsertOutcome::Duplicate`, which callers treat as "already handled",
/// not as a failure.
pub async fn create_booking_from_intent(
    repo: &dyn BookingRepository,
    metadata: &IntentMetadata,
    correlation: CorrelationIds,
    capture_method: &str,
    deposit_amount: i64,
) -> Result<InsertOutcome<Booking>, AppError> {
    let now = Utc::now();

    let new_booking = Booking {
        id: Uuid::new_v4().to_string(),
        space_type: metadata.space_type.clone(),
        date: metadata.date.unwrap_or_else(|| now.date_naive()),
        start_time: metadata.start_time,
        end_time: metadata.end_time,
        number_of_people: metadata.number_of_people,
        reservation_type: metadata.reservation_type.clone(),
        total_price: metadata.total_price,
        additional_services: Json(metadata.additional_services.clone()),
        user_id: metadata.user_id.clone(),
        contact_name: metadata.contact_name.clone().unwrap_or_default(),
        contact_email: metadata.contact_email.clone().unwrap_or_default(),
        contact_phone: metadata.contact_phone.clone(),
        company_name: metadata.company_name.clone(),
        message: metadata.message.clone(),
        invoice_requested: metadata.invoice_requested,
        invoice_details: metadata.invoice_details.clone().map(Json),
        confirmation_number: booking::generate_confirmation_number(),
        status: STATUS_PENDING.to_string(),
        payment_status: PAYMENT_PENDING.to_string(),
        attendance_status: ATTENDANCE_UNSET.to_string(),
        payment_intent_id: correlation.payment_intent_id,
        setup_intent_id: correlation.setup_intent_id,
        customer_id: correlation.customer_id,
        capture_method: capture_method.to_string(),
        deposit_amount,
        requires_payment: true,
        is_partial: metadata.is_partial,
        cancellation_reason: None,
        created_at: now,
        confirmed_at: None,
        cancelled_at: None,
        completed_at: None,
    };

    repo.insert(&new_booking).await
}
