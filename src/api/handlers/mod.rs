pub mod booking_admin;
pub mod health;
pub mod webhook;
