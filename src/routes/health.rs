use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "meal_types": state.catalog.list().len(),
        "time": state.clock.now().to_rfc3339(),
    }))
}
