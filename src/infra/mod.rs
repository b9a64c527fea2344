pub mod factory;
pub mod gateway;
pub mod notifications;
pub mod repositories;
