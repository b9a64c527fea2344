use std::collections::HashMap;
use std::sync::Arc;
use crate::config::Config;
use crate::domain::models::policy::SpacePolicy;
use crate::domain::ports::{
    AdminNotifier, BookingRepository, ClosureRepository, EmailService, PaymentGateway,
    PaymentRepository,
};
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub closure_repo: Arc<dyn ClosureRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub email_service: Arc<dyn EmailService>,
    pub admin_notifier: Arc<dyn AdminNotifier>,
    /// Deposit and cancellation policy per space type, read-only.
    pub policies: Arc<HashMap<String, SpacePolicy>>,
    pub templates: Arc<Tera>,
}
