use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    middleware::identity::AdminUser,
    models::schedule::{ScheduleGroup, UpdateScheduleRequest},
    routes::parse_date,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    date: Option<String>,
}

fn target_date(state: &AppState, raw: Option<String>) -> Result<NaiveDate, ApiError> {
    match raw {
        Some(raw) => parse_date(&raw),
        None => Ok(state.clock.today()),
    }
}

/// GET /api/admin/daily-qr?date=: the QR payload for a date, issuing the
/// token on first call.
pub async fn get_daily_qr(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<DateQuery>,
) -> Result<Json<Value>, ApiError> {
    let date = target_date(&state, params.date)?;
    let token = state.qr.get_or_issue(date, state.clock.now()).await;

    Ok(Json(json!({
        "success": true,
        "date": date,
        "qr_code_url": state.qr.qr_image_url(date),
        "verification_url": state.qr.verification_url(date, &token.token),
    })))
}

#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    pub date: NaiveDate,
}

/// POST /api/admin/regenerate-qr: rotate a date's token. Every link printed
/// or scanned before this call stops verifying.
pub async fn regenerate_qr(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(body): Json<RegenerateRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = state.qr.regenerate(body.date, state.clock.now()).await;
    tracing::info!("QR token for {} regenerated by {}", body.date, admin.email);

    Ok(Json(json!({
        "success": true,
        "date": body.date,
        "qr_code_url": state.qr.qr_image_url(body.date),
        "verification_url": state.qr.verification_url(body.date, &token.token),
        "message": "QR code regenerated successfully",
    })))
}

/// GET /api/admin/qr-image/{date}: the live token rendered as SVG.
pub async fn qr_image(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(date): Path<String>,
) -> Result<Response, ApiError> {
    let date = parse_date(&date)?;
    let token = state.qr.get_or_issue(date, state.clock.now()).await;
    let svg = state
        .qr
        .qr_svg(&state.qr.verification_url(date, &token.token))?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    date: Option<String>,
    meal_type_id: Option<i64>,
}

/// GET /api/admin/opted-meals?date=&meal_type_id=: who is coming, grouped by
/// meal type. Weekly defaults are materialized before the read so the list is
/// complete even for users who never opened the app during the window.
pub async fn opted_meals(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<RosterQuery>,
) -> Result<Json<Value>, ApiError> {
    let date = target_date(&state, params.date)?;
    let roster = state.ledger.roster(date, state.clock.now()).await?;

    let mut groups = Vec::new();
    for (meal, records) in roster {
        if params.meal_type_id.is_some_and(|id| id != meal.id) {
            continue;
        }
        let mut users = Vec::new();
        for record in records {
            // Records always trace back to a registered account.
            let user = state.users.require(record.user_id).await?;
            users.push(json!({
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "opt_in_time": record.opt_in_time,
            }));
        }
        groups.push(json!({ "id": meal.id, "name": meal.name, "users": users }));
    }

    Ok(Json(json!({
        "success": true,
        "date": date,
        "meal_types": groups,
    })))
}

/// GET /api/admin/schedules: the seven windows, grouped for the admin UI.
pub async fn get_schedules(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Json<Value> {
    let mut weekday = Vec::new();
    let mut weekend = Vec::new();
    for row in state.schedule.list().await {
        match row.group {
            ScheduleGroup::Weekday => weekday.push(row.to_json()),
            ScheduleGroup::Weekend => weekend.push(row.to_json()),
        }
    }
    Json(json!({
        "success": true,
        "weekday_schedules": weekday,
        "weekend_schedules": weekend,
    }))
}

/// PUT /api/admin/schedules/{id}: update one window's times (HH:MM). Both
/// fields replace atomically; eligibility readers see old or new, never a mix.
pub async fn update_schedule(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateScheduleRequest>,
) -> Result<Json<Value>, ApiError> {
    let open_time = parse_time(&body.open_time)?;
    let close_time = parse_time(&body.close_time)?;

    let row = state.schedule.update(id, open_time, close_time).await?;
    tracing::info!(
        "Schedule {} updated to {}–{} by {}",
        id,
        body.open_time,
        body.close_time,
        admin.email
    );
    Ok(Json(json!({ "success": true, "schedule": row.to_json() })))
}

fn parse_time(raw: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| ApiError::InvalidTime)
}
