use crate::domain::models::{
    booking::Booking,
    closure::ScheduleClosure,
    event::ChargeSnapshot,
    payment::{CardDetails, Payment, RefundDetails},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Outcome of a constraint-guarded insert. Duplicate deliveries of the same
/// gateway event surface as `Duplicate`, never as an error.
#[derive(Debug)]
pub enum InsertOutcome<T> {
    Created(T),
    Duplicate,
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Single insert guarded by the uniqueness constraints on
    /// `payment_intent_id` / `setup_intent_id`.
    async fn insert(&self, booking: &Booking) -> Result<InsertOutcome<Booking>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    /// Lookup by payment-intent or setup-intent id.
    async fn find_by_correlation_id(&self, correlation_id: &str) -> Result<Option<Booking>, AppError>;
    async fn set_payment_status(&self, id: &str, payment_status: &str) -> Result<(), AppError>;
    /// `payment_status = PAID` implies `status = CONFIRMED`; one statement.
    async fn mark_paid_and_confirmed(&self, id: &str, at: DateTime<Utc>) -> Result<(), AppError>;
    async fn mark_confirmed(&self, id: &str, at: DateTime<Utc>) -> Result<Booking, AppError>;
    async fn mark_cancelled(
        &self,
        id: &str,
        reason: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Booking, AppError>;
    async fn set_attendance(&self, id: &str, attendance_status: &str) -> Result<Booking, AppError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, payment: &Payment) -> Result<InsertOutcome<Payment>, AppError>;
    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Payment>, AppError>;
    async fn find_by_charge(&self, charge_id: &str) -> Result<Option<Payment>, AppError>;
    /// Returns whether a row actually transitioned. A `false` means the
    /// payment is already settled past this state and the caller must not
    /// touch the booking either.
    async fn mark_succeeded(
        &self,
        intent_id: &str,
        charge_id: Option<&str>,
        card: &CardDetails,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
    async fn mark_failed(
        &self,
        intent_id: &str,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
    /// Guarded status move for PROCESSING / CANCELLED; never downgrades a
    /// settled payment.
    async fn set_status(&self, intent_id: &str, status: &str) -> Result<bool, AppError>;
    async fn mark_refunded(&self, charge_id: &str, refund: &RefundDetails)
        -> Result<bool, AppError>;
}

#[async_trait]
pub trait ClosureRepository: Send + Sync {
    async fn exists_for(&self, date: NaiveDate, reason: &str) -> Result<bool, AppError>;
    async fn insert(&self, closure: &ScheduleClosure) -> Result<(), AppError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Verifies the webhook signature header against the shared secret.
    fn verify_signature(&self, payload: &[u8], signature_header: &str) -> Result<(), AppError>;
    /// Live payment-intent status; stored state can be stale.
    async fn payment_intent_status(&self, intent_id: &str) -> Result<String, AppError>;
    async fn retrieve_charge(&self, charge_id: &str) -> Result<ChargeSnapshot, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AdminNotifier: Send + Sync {
    async fn push(&self, booking_id: &str, title: &str, body: &str) -> Result<(), AppError>;
}
