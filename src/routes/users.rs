use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    middleware::identity::{AdminUser, CurrentUser},
    models::user::CreateUserRequest,
    AppState,
};

/// GET /api/user: the caller's own profile.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "is_admin": user.is_admin,
    }))
}

/// POST /api/users: admin-only account registration.
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .users
        .register(&body.name, &body.email, body.is_admin)
        .await?;
    tracing::info!("Registered user {} ({})", user.email, user.id);
    Ok(Json(json!({ "success": true, "user": user })))
}
