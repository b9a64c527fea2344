use crate::domain::services::cancellation::CancellationAssessment;
use serde::Serialize;

/// Acknowledgement returned to the gateway for every dispatched event,
/// including benign no-ops and duplicates.
#[derive(Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Cancellation assessment plus what the deposit policy would size the hold
/// at today, so staff can spot bookings whose held deposit has drifted from
/// current policy.
#[derive(Serialize)]
pub struct CancellationQuote {
    #[serde(flatten)]
    pub assessment: CancellationAssessment,
    /// Minor units.
    pub policy_deposit_amount: i64,
}
