use crate::domain::models::booking::{AdditionalService, InvoiceDetails};
use crate::domain::models::policy::DepositPolicy;
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use tracing::debug;

/// Typed view of the flat string metadata attached to a gateway intent.
///
/// Every field tolerates absence or malformation; a bad value degrades to
/// its default and never fails the event.
#[derive(Debug, Clone, Default)]
pub struct IntentMetadata {
    pub create_booking_on_authorization: bool,
    pub space_type: String,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub number_of_people: i32,
    pub reservation_type: String,
    /// Minor currency units.
    pub total_price: i64,
    pub user_id: Option<String>,
    pub contact_email: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub company_name: Option<String>,
    pub invoice_requested: bool,
    pub invoice_details: Option<InvoiceDetails>,
    pub additional_services: Vec<AdditionalService>,
    /// Explicit deposit in minor currency units, when the initiating flow
    /// set one.
    pub deposit_amount: Option<i64>,
    pub capture_method: Option<String>,
    pub is_partial: bool,
    pub message: Option<String>,
}

impl IntentMetadata {
    pub fn from_map(raw: &HashMap<String, String>) -> Self {
        let get = |key: &str| raw.get(key).map(String::as_str);

        Self {
            create_booking_on_authorization: flag(get("createBookingOnAuthorization")),
            space_type: get("spaceType").unwrap_or("unknown").to_string(),
            date: get("date").and_then(parse_date),
            start_time: get("startTime").and_then(parse_time),
            end_time: get("endTime").and_then(parse_time),
            number_of_people: get("numberOfPeople")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            reservation_type: get("reservationType").unwrap_or("HOURLY").to_string(),
            total_price: get("totalPrice").map(parse_major_amount).unwrap_or(0),
            user_id: get("userId").map(str::to_string),
            contact_email: get("contactEmail").map(str::to_string),
            contact_name: get("contactName").map(str::to_string),
            contact_phone: get("contactPhone").map(str::to_string),
            company_name: get("companyName").map(str::to_string),
            invoice_requested: flag(get("invoiceOption")),
            invoice_details: parse_invoice_details(get("invoiceDetails")),
            additional_services: parse_additional_services(get("additionalServices")),
            deposit_amount: get("depositAmount").and_then(|v| v.parse().ok()),
            capture_method: get("captureMethod").map(str::to_string),
            is_partial: flag(get("isPartialPrivatization")),
            message: get("message").map(str::to_string),
        }
    }
}

fn flag(value: Option<&str>) -> bool {
    value == Some("true")
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// `"100.00"` (major units) → `10000` minor units.
fn parse_major_amount(raw: &str) -> i64 {
    raw.parse::<f64>()
        .map(|v| (v * 100.0).round() as i64)
        .unwrap_or(0)
}

/// Missing or malformed JSON means "no services booked".
pub fn parse_additional_services(raw: Option<&str>) -> Vec<AdditionalService> {
    let Some(raw) = raw else { return Vec::new() };

    match serde_json::from_str(raw) {
        Ok(services) => services,
        Err(e) => {
            debug!("Ignoring malformed additionalServices metadata: {}", e);
            Vec::new()
        }
    }
}

/// Missing or malformed JSON means "no invoice requested".
pub fn parse_invoice_details(raw: Option<&str>) -> Option<InvoiceDetails> {
    let raw = raw?;

    match serde_json::from_str(raw) {
        Ok(details) => Some(details),
        Err(e) => {
            debug!("Ignoring malformed invoiceDetails metadata: {}", e);
            None
        }
    }
}

/// The deposit actually held: the explicit metadata amount when the
/// initiating flow set one, otherwise the full total price.
///
/// Single source of truth for both booking creation and the confirmation
/// notification, so the two never disagree.
pub fn calculate_deposit_amount(metadata: &IntentMetadata) -> i64 {
    metadata.deposit_amount.unwrap_or(metadata.total_price)
}

/// Policy-side deposit sizing (percentage or fixed amount, with a floor).
pub fn deposit_from_policy(total_price: i64, policy: &DepositPolicy) -> i64 {
    if !policy.enabled {
        return 0;
    }

    let base = match (policy.percentage, policy.fixed_amount) {
        (Some(pct), _) => total_price * i64::from(pct) / 100,
        (None, Some(fixed)) => fixed,
        (None, None) => total_price,
    };

    base.max(policy.minimum_amount.unwrap_or(0))
}
