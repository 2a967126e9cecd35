use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Which anchoring rule a window follows: weekday rows open the evening
/// before the governed date; the weekend rows describe the single
/// Friday-evening → Sunday-afternoon span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleGroup {
    Weekday,
    Weekend,
}

/// One of the seven per-day opt-in windows. `open_time`/`close_time` are
/// civil clock times in the operational timezone; the Eligibility Engine
/// decides which calendar days they land on.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleWindow {
    pub id: i64,
    pub group: ScheduleGroup,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u8,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

impl ScheduleWindow {
    /// Wire shape used by the admin schedule endpoints (24-hour HH:MM).
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "day_of_week": self.day_of_week,
            "day_name": DAY_NAMES[self.day_of_week as usize],
            "open_time": self.open_time.format("%H:%M").to_string(),
            "close_time": self.close_time.format("%H:%M").to_string(),
            "group": self.group,
        })
    }
}

/// Body for PUT /api/admin/schedules/{id}.
#[derive(Debug, Deserialize)]
pub struct UpdateScheduleRequest {
    pub open_time: String,
    pub close_time: String,
}
