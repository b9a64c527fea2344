pub mod booking;
pub mod closure;
pub mod event;
pub mod payment;
pub mod policy;
