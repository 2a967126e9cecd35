use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

/// Domain error surface. Every rejection carries a human-readable reason so
/// clients can tell "closed" from "invalid" from "server error".
#[derive(Error, Debug)]
pub enum ApiError {
    /// The seven-row schedule is incomplete. This is an operator problem,
    /// never guessed around: eligibility refuses to answer.
    #[error("No opt-in schedule configured for day of week {0}")]
    ConfigIntegrity(u8),

    #[error("Opt-in is closed for {0}")]
    WindowClosed(NaiveDate),

    /// Stale, superseded or unknown QR token.
    #[error("Invalid QR code")]
    TokenInvalid,

    /// Control signal, not a failure: the caller must supply an identity.
    #[error("Please log in to access this page")]
    AuthRequired,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Invalid meal type")]
    UnknownMealType(i64),

    #[error("Schedule not found")]
    UnknownSchedule(i64),

    #[error("User not found")]
    UnknownUser,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid date format. Use YYYY-MM-DD format.")]
    InvalidDate,

    #[error("Invalid time format. Use HH:MM format.")]
    InvalidTime,

    #[error("Server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ConfigIntegrity(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::WindowClosed(_) | ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::TokenInvalid | ApiError::UnknownSchedule(_) | ApiError::UnknownUser => {
                StatusCode::NOT_FOUND
            }
            ApiError::AuthRequired => StatusCode::UNAUTHORIZED,
            ApiError::UnknownMealType(_)
            | ApiError::DuplicateEmail
            | ApiError::InvalidDate
            | ApiError::InvalidTime => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
        }
        (
            status,
            Json(json!({ "success": false, "message": self.to_string() })),
        )
            .into_response()
    }
}
