use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const PAY_REQUIRES_ACTION: &str = "REQUIRES_ACTION";
pub const PAY_PROCESSING: &str = "PROCESSING";
pub const PAY_SUCCEEDED: &str = "SUCCEEDED";
pub const PAY_FAILED: &str = "FAILED";
pub const PAY_CANCELLED: &str = "CANCELLED";
pub const PAY_REFUNDED: &str = "REFUNDED";

/// One gateway payment attempt, tied 1:1 to a booking.
///
/// `intent_id` holds the payment-intent id, or the setup-intent id for
/// deferred-capture flows, and carries the uniqueness constraint.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub intent_id: String,
    pub charge_id: Option<String>,
    pub status: String,
    pub failure_reason: Option<String>,
    pub card_brand: Option<String>,
    pub card_last4: Option<String>,
    pub card_exp_month: Option<i32>,
    pub card_exp_year: Option<i32>,
    pub receipt_url: Option<String>,
    pub refund_id: Option<String>,
    pub refund_amount: Option<i64>,
    pub refund_reason: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(booking_id: String, intent_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            intent_id,
            charge_id: None,
            status: PAY_REQUIRES_ACTION.to_string(),
            failure_reason: None,
            card_brand: None,
            card_last4: None,
            card_exp_month: None,
            card_exp_year: None,
            receipt_url: None,
            refund_id: None,
            refund_amount: None,
            refund_reason: None,
            completed_at: None,
            failed_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Card details extracted from a captured charge.
#[derive(Debug, Clone, Default)]
pub struct CardDetails {
    pub brand: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<i32>,
    pub exp_year: Option<i32>,
    pub receipt_url: Option<String>,
}

/// Refund details extracted from a refunded charge.
#[derive(Debug, Clone)]
pub struct RefundDetails {
    pub refund_id: String,
    pub amount: i64,
    pub reason: Option<String>,
}
