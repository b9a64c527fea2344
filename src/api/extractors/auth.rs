use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use std::sync::Arc;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Full operations access: confirm/cancel bookings, override payment status.
pub struct AdminUser;

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(StatusCode::UNAUTHORIZED)?;
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        if token == app_state.config.admin_api_token {
            Ok(AdminUser)
        } else if token == app_state.config.staff_api_token {
            Err(StatusCode::FORBIDDEN)
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Front-desk access: attendance marking and cancellation quotes. Admin
/// tokens are accepted here too.
pub struct StaffUser;

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(StatusCode::UNAUTHORIZED)?;
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        if token == app_state.config.staff_api_token || token == app_state.config.admin_api_token {
            Ok(StaffUser)
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
