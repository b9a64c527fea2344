use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_CONFIRMED: &str = "CONFIRMED";
pub const STATUS_CANCELLED: &str = "CANCELLED";
pub const STATUS_COMPLETED: &str = "COMPLETED";

pub const PAYMENT_PENDING: &str = "PENDING";
pub const PAYMENT_PAID: &str = "PAID";
pub const PAYMENT_FAILED: &str = "FAILED";
pub const PAYMENT_REFUNDED: &str = "REFUNDED";

pub const ATTENDANCE_UNSET: &str = "UNSET";
pub const ATTENDANCE_PRESENT: &str = "PRESENT";
pub const ATTENDANCE_ABSENT: &str = "ABSENT";

pub const CAPTURE_MANUAL: &str = "MANUAL";
pub const CAPTURE_DEFERRED: &str = "DEFERRED";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct AdditionalService {
    pub name: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default, alias = "unitPrice")]
    pub unit_price: f64,
    #[serde(default, alias = "totalPrice")]
    pub total_price: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct InvoiceDetails {
    #[serde(alias = "companyName")]
    pub company_name: Option<String>,
    #[serde(alias = "vatNumber")]
    pub vat_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[serde(alias = "postalCode")]
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub space_type: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub number_of_people: i32,
    pub reservation_type: String,
    /// Minor currency units.
    pub total_price: i64,
    pub additional_services: Json<Vec<AdditionalService>>,
    pub user_id: Option<String>,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub company_name: Option<String>,
    pub message: Option<String>,
    pub invoice_requested: bool,
    pub invoice_details: Option<Json<InvoiceDetails>>,
    pub confirmation_number: String,
    pub status: String,
    pub payment_status: String,
    pub attendance_status: String,
    pub payment_intent_id: Option<String>,
    pub setup_intent_id: Option<String>,
    pub customer_id: Option<String>,
    pub capture_method: String,
    /// Minor currency units actually held against the customer's card.
    pub deposit_amount: i64,
    pub requires_payment: bool,
    pub is_partial: bool,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// The gateway correlation id this booking is keyed by.
    pub fn correlation_id(&self) -> Option<&str> {
        self.payment_intent_id
            .as_deref()
            .or(self.setup_intent_id.as_deref())
    }
}

/// `"BT-" + millisecond timestamp + "-" + 9 uppercase alphanumeric chars`.
///
/// Collisions are accepted as negligible; the real uniqueness guard is the
/// store constraint on the gateway correlation id.
pub fn generate_confirmation_number() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();

    format!("BT-{}-{}", Utc::now().timestamp_millis(), token)
}
