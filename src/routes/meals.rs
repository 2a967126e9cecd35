use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    middleware::identity::CurrentUser,
    models::opt_in::{OptInRequest, WeeklyOptInRequest},
    routes::parse_date,
    AppState,
};

/// GET /api/meals: the immutable meal catalog.
pub async fn get_meal_types(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Json<Value> {
    Json(json!({ "success": true, "meal_types": state.catalog.list() }))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    date: Option<String>,
}

/// GET /api/meals/opt-in-status?date=: the caller's opt-in state for a date,
/// defaulting to the date the open window currently governs. Weekly defaults
/// for the date are materialized here, on first read after the window opens.
pub async fn get_opt_in_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<StatusQuery>,
) -> Result<Json<Value>, ApiError> {
    let now = state.clock.now();
    let date = match params.date {
        Some(raw) => parse_date(&raw)?,
        None => state.eligibility.resolve_target_date(now).await?,
    };

    state.ledger.apply_weekly_defaults(user.id, date, now).await?;
    let is_open = state.eligibility.is_open(now, date).await?;
    let meals = state.ledger.get_status(user.id, date).await;

    Ok(Json(json!({
        "success": true,
        "date": date,
        "is_opt_in_open": is_open,
        "meals": meals,
    })))
}

/// POST /api/meals/opt-in: toggle one meal for one date, only while the
/// governing window is open.
pub async fn meal_opt_in(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<OptInRequest>,
) -> Result<Json<Value>, ApiError> {
    let now = state.clock.now();
    let record = state
        .ledger
        .set_opt_in(user.id, body.date, body.meal_type_id, body.opted_in, now)
        .await?;
    tracing::debug!(
        "User {} set meal {} on {} to {}",
        user.id,
        record.meal_type_id,
        record.date,
        record.opted_in
    );

    Ok(Json(json!({
        "success": true,
        "meal_type_id": record.meal_type_id,
        "date": record.date,
        "opted_in": record.opted_in,
        "opt_in_time": record.opt_in_time,
    })))
}

/// GET /api/meals/weekly-status: the caller's weekly templates per meal type.
pub async fn get_weekly_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<Value> {
    let prefs: Vec<Value> = state
        .ledger
        .weekly_status(user.id)
        .await
        .into_iter()
        .map(|(meal, days)| {
            json!({
                "meal_type_id": meal.id,
                "name": meal.name,
                "days": days,
            })
        })
        .collect();
    Json(json!({ "success": true, "weekly_preferences": prefs }))
}

/// POST /api/meals/weekly-opt-in: merge-update one meal's weekly template.
/// Unconstrained by any opt-in window; it only shapes future defaults.
pub async fn weekly_opt_in(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<WeeklyOptInRequest>,
) -> Result<Json<Value>, ApiError> {
    let days = state
        .ledger
        .set_weekly_preference(user.id, body.meal_type_id, &body.days)
        .await?;
    Ok(Json(json!({
        "success": true,
        "meal_type_id": body.meal_type_id,
        "days": days,
    })))
}
