use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Catalog entry (breakfast, lunch, dinner, ...). Created from configuration
/// at startup, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct MealType {
    pub id: i64,
    pub name: String,
}

/// One meal's opt-in state for a user on a date, catalog-complete: meals the
/// user never touched appear with `opted_in = false`.
#[derive(Debug, Clone, Serialize)]
pub struct MealStatus {
    pub meal_type_id: i64,
    pub name: String,
    pub opted_in: bool,
    pub opt_in_time: Option<DateTime<FixedOffset>>,
}
