use serde::Deserialize;

#[derive(Deserialize)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct AttendanceRequest {
    /// "present" or "absent".
    pub attendance: String,
}

#[derive(Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: String,
}
