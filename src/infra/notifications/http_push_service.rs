use crate::domain::ports::AdminNotifier;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Pushes short booking alerts to the staff dashboard channel.
pub struct HttpPushService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpPushService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct PushPayload {
    booking_id: String,
    title: String,
    body: String,
}

#[async_trait]
impl AdminNotifier for HttpPushService {
    async fn push(&self, booking_id: &str, title: &str, body: &str) -> Result<(), AppError> {
        let payload = PushPayload {
            booking_id: booking_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Push service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Push service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}
