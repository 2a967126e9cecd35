use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user's answer for one meal on one date. Created lazily on the first
/// toggle (or seeded from a weekly preference when the window opens).
#[derive(Debug, Clone, Serialize)]
pub struct OptInRecord {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub meal_type_id: i64,
    pub opted_in: bool,
    /// Set only when `opted_in` transitions false → true.
    pub opt_in_time: Option<DateTime<FixedOffset>>,
}

/// Default template applied to weekday dates when their window opens.
/// Editing it never rewrites records that already exist.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeeklyPreference {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
}

impl WeeklyPreference {
    /// Flag for a weekday index (0 = Monday .. 4 = Friday); weekends have no
    /// weekly-default path.
    pub fn day(&self, weekday: u8) -> Option<bool> {
        match weekday {
            0 => Some(self.monday),
            1 => Some(self.tuesday),
            2 => Some(self.wednesday),
            3 => Some(self.thursday),
            4 => Some(self.friday),
            _ => None,
        }
    }
}

/// Body for POST /api/meals/opt-in.
#[derive(Debug, Deserialize)]
pub struct OptInRequest {
    pub meal_type_id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub opted_in: bool,
}

/// Body for POST /api/meals/weekly-opt-in. Absent days keep their stored
/// value (merge semantics).
#[derive(Debug, Deserialize)]
pub struct WeeklyOptInRequest {
    pub meal_type_id: i64,
    #[serde(default)]
    pub days: WeeklyDaysPatch,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeeklyDaysPatch {
    pub monday: Option<bool>,
    pub tuesday: Option<bool>,
    pub wednesday: Option<bool>,
    pub thursday: Option<bool>,
    pub friday: Option<bool>,
}
