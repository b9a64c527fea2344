use serde::Deserialize;
use std::collections::HashMap;

/// Payment-intent state carried on a gateway event.
#[derive(Debug, Deserialize, Clone)]
pub struct PaymentIntentSnapshot {
    pub id: String,
    pub customer: Option<String>,
    #[serde(default)]
    pub status: String,
    pub latest_charge: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub last_payment_error: Option<LastPaymentError>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LastPaymentError {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SetupIntentSnapshot {
    pub id: String,
    pub customer: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChargeSnapshot {
    pub id: String,
    pub payment_intent: Option<String>,
    pub receipt_url: Option<String>,
    pub payment_method_details: Option<PaymentMethodDetails>,
    pub refunds: Option<RefundList>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentMethodDetails {
    pub card: Option<CardSnapshot>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CardSnapshot {
    pub brand: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<i32>,
    pub exp_year: Option<i32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefundList {
    #[serde(default)]
    pub data: Vec<RefundSnapshot>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefundSnapshot {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    pub reason: Option<String>,
}

/// The closed set of gateway lifecycle events this core reconciles.
///
/// Unhandled wire kinds land in `Ignored` so the dispatch match stays
/// exhaustive and acknowledges them without side effects.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    /// `payment_intent.amount_capturable_updated`
    AuthorizationHold(PaymentIntentSnapshot),
    /// `setup_intent.succeeded`
    CardSaved(SetupIntentSnapshot),
    /// `payment_intent.succeeded`
    PaymentSucceeded(PaymentIntentSnapshot),
    /// `payment_intent.payment_failed`
    PaymentFailed(PaymentIntentSnapshot),
    /// `payment_intent.processing`
    PaymentProcessing(PaymentIntentSnapshot),
    /// `payment_intent.canceled`
    PaymentCancelled(PaymentIntentSnapshot),
    /// `charge.refunded`
    ChargeRefunded(ChargeSnapshot),
    Ignored(String),
}

#[derive(Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Deserialize)]
struct EventData {
    object: serde_json::Value,
}

impl GatewayEvent {
    /// Parses a raw webhook body into the tagged union. The wire names are a
    /// gateway-defined contract and must be matched verbatim.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        let envelope: EventEnvelope = serde_json::from_slice(body)?;
        let object = envelope.data.object;

        let event = match envelope.kind.as_str() {
            "payment_intent.amount_capturable_updated" => {
                GatewayEvent::AuthorizationHold(serde_json::from_value(object)?)
            }
            "setup_intent.succeeded" => GatewayEvent::CardSaved(serde_json::from_value(object)?),
            "payment_intent.succeeded" => {
                GatewayEvent::PaymentSucceeded(serde_json::from_value(object)?)
            }
            "payment_intent.payment_failed" => {
                GatewayEvent::PaymentFailed(serde_json::from_value(object)?)
            }
            "payment_intent.processing" => {
                GatewayEvent::PaymentProcessing(serde_json::from_value(object)?)
            }
            "payment_intent.canceled" => {
                GatewayEvent::PaymentCancelled(serde_json::from_value(object)?)
            }
            "charge.refunded" => GatewayEvent::ChargeRefunded(serde_json::from_value(object)?),
            other => GatewayEvent::Ignored(other.to_string()),
        };

        Ok(event)
    }
}
