use coworking_backend::{
    api::router::create_router,
    config::Config,
    domain::models::event::ChargeSnapshot,
    domain::models::policy::{CancellationTier, DepositPolicy, SpacePolicy},
    domain::ports::{AdminNotifier, EmailService, PaymentGateway},
    error::AppError,
    infra::factory::load_templates,
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo, sqlite_closure_repo::SqliteClosureRepo,
        sqlite_payment_repo::SqlitePaymentRepo,
    },
    state::AppState,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SIGNATURE: &str = "t=0,v1=valid-test-signature";
pub const ADMIN_TOKEN: &str = "admin-test-token";
pub const STAFF_TOKEN: &str = "staff-test-token";

/// Scripted gateway: signature checks compare against a fixed test header,
/// intent statuses and charges come from in-memory tables the test seeds.
#[derive(Default)]
pub struct MockGateway {
    pub intent_statuses: Mutex<HashMap<String, String>>,
    pub charges: Mutex<HashMap<String, ChargeSnapshot>>,
    pub status_lookups: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn set_intent_status(&self, intent_id: &str, status: &str) {
        self.intent_statuses
            .lock()
            .unwrap()
            .insert(intent_id.to_string(), status.to_string());
    }

    pub fn set_charge(&self, charge: ChargeSnapshot) {
        self.charges
            .lock()
            .unwrap()
            .insert(charge.id.clone(), charge);
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn verify_signature(&self, _payload: &[u8], signature_header: &str) -> Result<(), AppError> {
        if signature_header == TEST_SIGNATURE {
            Ok(())
        } else {
            Err(AppError::Validation("Invalid webhook signature".to_string()))
        }
    }

    async fn payment_intent_status(&self, intent_id: &str) -> Result<String, AppError> {
        self.status_lookups.lock().unwrap().push(intent_id.to_string());
        Ok(self
            .intent_statuses
            .lock()
            .unwrap()
            .get(intent_id)
            .cloned()
            .unwrap_or_else(|| "requires_payment_method".to_string()))
    }

    async fn retrieve_charge(&self, charge_id: &str) -> Result<ChargeSnapshot, AppError> {
        self.charges
            .lock()
            .unwrap()
            .get(charge_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Charge {} not found", charge_id)))
    }
}

/// Records every send instead of talking to the mail relay.
#[derive(Default)]
pub struct RecordingEmailService {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingEmailService {
    pub fn subjects_for(&self, recipient: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == recipient)
            .map(|(_, s)| s.clone())
            .collect()
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send(&self, recipient: &str, subject: &str, _html_body: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), subject.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub pushes: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl AdminNotifier for RecordingNotifier {
    async fn push(&self, booking_id: &str, title: &str, _body: &str) -> Result<(), AppError> {
        self.pushes
            .lock()
            .unwrap()
            .push((booking_id.to_string(), title.to_string()));
        Ok(())
    }
}

fn test_policies() -> HashMap<String, SpacePolicy> {
    let mut policies = HashMap::new();
    policies.insert(
        "meetingRoom".to_string(),
        SpacePolicy {
            deposit: DepositPolicy {
                enabled: true,
                percentage: Some(50),
                fixed_amount: None,
                minimum_amount: None,
            },
            cancellation_tiers: vec![
                CancellationTier { days_before_booking: 7, charge_percentage: 0 },
                CancellationTier { days_before_booking: 3, charge_percentage: 50 },
                CancellationTier { days_before_booking: 0, charge_percentage: 100 },
            ],
        },
    );
    policies
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub gateway: Arc<MockGateway>,
    pub emails: Arc<RecordingEmailService>,
    pub pushes: Arc<RecordingNotifier>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            stripe_secret_key: "sk_test".to_string(),
            stripe_webhook_secret: "whsec_test".to_string(),
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            push_service_url: "http://localhost".to_string(),
            push_service_token: "token".to_string(),
            admin_api_token: ADMIN_TOKEN.to_string(),
            staff_api_token: STAFF_TOKEN.to_string(),
            policy_config_path: "./does-not-exist.json".to_string(),
        };

        let gateway = Arc::new(MockGateway::default());
        let emails = Arc::new(RecordingEmailService::default());
        let pushes = Arc::new(RecordingNotifier::default());

        let state = Arc::new(AppState {
            config,
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            payment_repo: Arc::new(SqlitePaymentRepo::new(pool.clone())),
            closure_repo: Arc::new(SqliteClosureRepo::new(pool.clone())),
            gateway: gateway.clone(),
            email_service: emails.clone(),
            admin_notifier: pushes.clone(),
            policies: Arc::new(test_policies()),
            templates: Arc::new(load_templates()),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            gateway,
            emails,
            pushes,
        }
    }

    /// Delivers a webhook body carrying the accepted test signature.
    pub async fn deliver_webhook(&self, body: &serde_json::Value) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/webhooks/stripe")
                    .header("stripe-signature", TEST_SIGNATURE)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Lets detached notification tasks run to completion.
    pub async fn settle(&self) {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

#[allow(dead_code)]
pub async fn parse_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Webhook payload for a manual-capture authorization hold that opts into
/// booking creation.
#[allow(dead_code)]
pub fn authorization_hold_event(intent_id: &str, metadata: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "type": "payment_intent.amount_capturable_updated",
        "data": { "object": {
            "id": intent_id,
            "customer": "cus_test",
            "status": "requires_capture",
            "metadata": metadata,
        }}
    })
}

/// Intent metadata for a booking 30 days out, so cancellation-schedule
/// assertions stay stable regardless of when the suite runs.
#[allow(dead_code)]
pub fn default_metadata() -> serde_json::Value {
    let date = (chrono::Utc::now() + chrono::Duration::days(30))
        .date_naive()
        .to_string();
    serde_json::json!({
        "createBookingOnAuthorization": "true",
        "spaceType": "meetingRoom",
        "date": date,
        "startTime": "09:00",
        "endTime": "12:00",
        "numberOfPeople": "4",
        "reservationType": "HOURLY",
        "totalPrice": "100.00",
        "contactEmail": "alice@example.com",
        "contactName": "Alice",
        "depositAmount": "5000",
    })
}
