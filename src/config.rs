use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub push_service_url: String,
    pub push_service_token: String,
    pub admin_api_token: String,
    pub staff_api_token: String,
    pub policy_config_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set"),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").expect("STRIPE_WEBHOOK_SECRET must be set"),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            push_service_url: env::var("PUSH_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8001/api/v1/push".to_string()),
            push_service_token: env::var("PUSH_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-2".to_string()),
            admin_api_token: env::var("ADMIN_API_TOKEN").expect("ADMIN_API_TOKEN must be set"),
            staff_api_token: env::var("STAFF_API_TOKEN").expect("STAFF_API_TOKEN must be set"),
            policy_config_path: env::var("POLICY_CONFIG_PATH").unwrap_or_else(|_| "./policies.json".to_string()),
        }
    }
}
