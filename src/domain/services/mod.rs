pub mod booking_creator;
pub mod cancellation;
pub mod metadata;
pub mod notifications;
