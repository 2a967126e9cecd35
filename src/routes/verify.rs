use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::ApiError,
    routes::parse_date,
    services::verification::VerificationResult,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    user_id: Option<Uuid>,
}

/// GET /api/verify-meal/{date}/{token}?user_id=: the public scan endpoint.
/// No session is created; counter and user clients poll this on an interval
/// to observe ledger changes.
pub async fn verify_meal(
    State(state): State<AppState>,
    Path((date, token)): Path<(String, String)>,
    Query(params): Query<VerifyQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let date = parse_date(&date)?;
    // Identity may arrive either as an explicit query parameter (the scanned
    // link opened in an already-identified app) or as the usual header.
    let caller = params.user_id.or_else(|| {
        headers
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    });

    match state.verification.verify(date, &token, caller).await? {
        VerificationResult::RequiresLogin => Ok(Json(json!({
            "success": true,
            "date": date,
            "message": "Please log in to see your meal status",
            "requires_login": true,
        }))),
        VerificationResult::Resolved { user, meals } => Ok(Json(json!({
            "success": true,
            "date": date,
            "user": { "name": user.name, "email": user.email },
            "meals": meals,
        }))),
    }
}
