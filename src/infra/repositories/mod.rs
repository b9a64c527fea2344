pub mod postgres_booking_repo;
pub mod postgres_closure_repo;
pub mod postgres_payment_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_closure_repo;
pub mod sqlite_payment_repo;
