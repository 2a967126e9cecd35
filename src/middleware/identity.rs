use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{error::ApiError, models::user::User, AppState};

/// Caller identity, resolved from the `X-User-Id` header against the user
/// directory. The authentication mechanism itself (sessions, cookies) is an
/// external collaborator; by the time a request reaches this service the
/// identity has already been established upstream.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Like [`CurrentUser`], but the account must be an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

pub fn caller_id(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let id = caller_id(parts).ok_or(ApiError::AuthRequired)?;
        let user = state.users.get(id).await.ok_or(ApiError::AuthRequired)?;
        Ok(CurrentUser(user))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
