use crate::domain::models::event::ChargeSnapshot;
use crate::domain::ports::PaymentGateway;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use tracing::error;

const API_BASE: &str = "https://api.stripe.com/v1";

/// Replay window for the webhook signature timestamp.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

pub struct StripeGateway {
    client: Client,
    secret_key: String,
    webhook_secret: String,
}

impl StripeGateway {
    pub fn new(secret_key: String, webhook_secret: String) -> Self {
        Self {
            client: Client::new(),
            secret_key,
            webhook_secret,
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, AppError> {
        let res = self
            .client
            .get(format!("{}/{}", API_BASE, path))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Gateway connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Gateway request failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        res.json().await.map_err(|e| {
            let msg = format!("Gateway response decode error: {}", e);
            error!("{}", msg);
            AppError::InternalWithMsg(msg)
        })
    }
}

#[derive(Deserialize)]
struct IntentStatusResponse {
    status: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    /// Checks the `t=...,v1=...` signature header: HMAC-SHA256 over
    /// `"{timestamp}.{raw body}"` with the shared webhook secret, within the
    /// replay tolerance.
    fn verify_signature(&self, payload: &[u8], signature_header: &str) -> Result<(), AppError> {
        let mut timestamp: Option<i64> = None;
        let mut candidates: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse().ok(),
                Some(("v1", value)) => candidates.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| AppError::Validation("Malformed webhook signature header".into()))?;

        if (Utc::now().timestamp() - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(AppError::Validation(
                "Webhook signature timestamp outside tolerance".into(),
            ));
        }

        for candidate in candidates {
            let Ok(decoded) = hex::decode(candidate) else {
                continue;
            };

            let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
                .map_err(|_| AppError::Internal)?;
            mac.update(timestamp.to_string().as_bytes());
            mac.update(b".");
            mac.update(payload);

            if mac.verify_slice(&decoded).is_ok() {
                return Ok(());
            }
        }

        Err(AppError::Validation(
            "Webhook signature verification failed".into(),
        ))
    }

    async fn payment_intent_status(&self, intent_id: &str) -> Result<String, AppError> {
        let response: IntentStatusResponse =
            self.get_json(&format!("payment_intents/{}", intent_id)).await?;
        Ok(response.status)
    }

    async fn retrieve_charge(&self, charge_id: &str) -> Result<ChargeSnapshot, AppError> {
        self.get_json(&format!("charges/{}", charge_id)).await
    }
}
