use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgConnectOptions, PgPoolOptions}, sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use tracing::{info, warn};
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::domain::models::policy::SpacePolicy;
use crate::state::AppState;
use crate::infra::gateway::stripe_gateway::StripeGateway;
use crate::infra::notifications::http_email_service::HttpEmailService;
use crate::infra::notifications::http_push_service::HttpPushService;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_closure_repo::PostgresClosureRepo,
    postgres_payment_repo::PostgresPaymentRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_closure_repo::SqliteClosureRepo, sqlite_payment_repo::SqlitePaymentRepo,
};

pub fn load_templates() -> Tera {
    let mut tera = Tera::default();
    tera.add_raw_template("booking_received.html", include_str!("../templates/booking_received.html"))
        .expect("Failed to load booking_received template");
    tera.add_raw_template("booking_confirmed.html", include_str!("../templates/booking_confirmed.html"))
        .expect("Failed to load booking_confirmed template");
    tera.add_raw_template("booking_rejected.html", include_str!("../templates/booking_rejected.html"))
        .expect("Failed to load booking_rejected template");
    tera.add_raw_template("booking_cancelled.html", include_str!("../templates/booking_cancelled.html"))
        .expect("Failed to load booking_cancelled template");
    tera.add_raw_template("deposit_released.html", include_str!("../templates/deposit_released.html"))
        .expect("Failed to load deposit_released template");
    tera.add_raw_template("deposit_captured.html", include_str!("../templates/deposit_captured.html"))
        .expect("Failed to load deposit_captured template");
    tera
}

pub fn load_policies(path: &str) -> HashMap<String, SpacePolicy> {
    match std::fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(policies) => policies,
            Err(e) => {
                warn!("Invalid policy config at {}: {}. Using empty policy set.", path, e);
                HashMap::new()
            }
        },
        Err(e) => {
            warn!("No policy config at {} ({}). Using empty policy set.", path, e);
            HashMap::new()
        }
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let email_service = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
    ));
    let admin_notifier = Arc::new(HttpPushService::new(
        config.push_service_url.clone(),
        config.push_service_token.clone(),
    ));
    let gateway = Arc::new(StripeGateway::new(
        config.stripe_secret_key.clone(),
        config.stripe_webhook_secret.clone(),
    ));

    let templates = Arc::new(load_templates());
    let policies = Arc::new(load_policies(&config.policy_config_path));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        AppState {
            config: config.clone(),
            booking_repo: Arc::new(PostgresBookingRepo::new(pool.clone())),
            payment_repo: Arc::new(PostgresPaymentRepo::new(pool.clone())),
            closure_repo: Arc::new(PostgresClosureRepo::new(pool.clone())),
            gateway,
            email_service,
            admin_notifier,
            policies,
            templates,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        AppState {
            config: config.clone(),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            payment_repo: Arc::new(SqlitePaymentRepo::new(pool.clone())),
            closure_repo: Arc::new(SqliteClosureRepo::new(pool.clone())),
            gateway,
            email_service,
            admin_notifier,
            policies,
            templates,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
