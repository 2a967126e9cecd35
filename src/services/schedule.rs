use std::collections::HashMap;

use chrono::NaiveTime;
use tokio::sync::RwLock;

use crate::{
    error::ApiError,
    models::schedule::{ScheduleGroup, ScheduleWindow},
};

/// Owns the seven per-weekday opt-in windows. Rows are seeded at startup and
/// only ever have their times edited; day-of-week and group are fixed, rows
/// are never deleted, so the one-row-per-day invariant holds structurally.
pub struct ScheduleStore {
    windows: RwLock<HashMap<u8, ScheduleWindow>>,
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

impl ScheduleStore {
    pub fn new(rows: Vec<ScheduleWindow>) -> Self {
        let windows = rows.into_iter().map(|w| (w.day_of_week, w)).collect();
        Self {
            windows: RwLock::new(windows),
        }
    }

    /// The schedule the original deployment shipped with: Mon–Fri open the
    /// evening before at 20:00 and close at 09:00 on the governed day; the
    /// Saturday row is the Friday-20:00 → Sunday-16:00 weekend span; the
    /// Sunday row (16:00 → 20:00) anchors Monday.
    pub fn with_defaults() -> Self {
        let mut rows = Vec::with_capacity(7);
        for day in 0u8..5 {
            rows.push(ScheduleWindow {
                id: day as i64 + 1,
                group: ScheduleGroup::Weekday,
                day_of_week: day,
                open_time: hm(20, 0),
                close_time: hm(9, 0),
            });
        }
        rows.push(ScheduleWindow {
            id: 6,
            group: ScheduleGroup::Weekend,
            day_of_week: 5,
            open_time: hm(20, 0),
            close_time: hm(16, 0),
        });
        rows.push(ScheduleWindow {
            id: 7,
            group: ScheduleGroup::Weekend,
            day_of_week: 6,
            open_time: hm(16, 0),
            close_time: hm(20, 0),
        });
        Self::new(rows)
    }

    /// Row for a day of week (0 = Monday .. 6 = Sunday). A missing row means
    /// the deployment is misconfigured; eligibility refuses to answer rather
    /// than guessing open or closed.
    pub async fn get(&self, day_of_week: u8) -> Result<ScheduleWindow, ApiError> {
        self.windows
            .read()
            .await
            .get(&day_of_week)
            .cloned()
            .ok_or(ApiError::ConfigIntegrity(day_of_week))
    }

    pub async fn list(&self) -> Vec<ScheduleWindow> {
        let mut rows: Vec<_> = self.windows.read().await.values().cloned().collect();
        rows.sort_by_key(|w| w.day_of_week);
        rows
    }

    /// Replace a row's times as one unit. Readers either see the old pair or
    /// the new pair, never a mix.
    pub async fn update(
        &self,
        id: i64,
        open_time: NaiveTime,
        close_time: NaiveTime,
    ) -> Result<ScheduleWindow, ApiError> {
        let mut windows = self.windows.write().await;
        let row = windows
            .values_mut()
            .find(|w| w.id == id)
            .ok_or(ApiError::UnknownSchedule(id))?;
        row.open_time = open_time;
        row.close_time = close_time;
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_cover_all_seven_days() {
        let store = ScheduleStore::with_defaults();
        for day in 0u8..7 {
            let row = store.get(day).await.unwrap();
            assert_eq!(row.day_of_week, day);
            let expected = if day >= 5 {
                ScheduleGroup::Weekend
            } else {
                ScheduleGroup::Weekday
            };
            assert_eq!(row.group, expected);
        }
    }

    #[tokio::test]
    async fn update_replaces_both_times_and_keeps_the_day() {
        let store = ScheduleStore::with_defaults();
        let updated = store.update(1, hm(19, 30), hm(8, 0)).await.unwrap();
        assert_eq!(updated.day_of_week, 0);
        assert_eq!(updated.open_time, hm(19, 30));
        assert_eq!(updated.close_time, hm(8, 0));
        assert_eq!(store.get(0).await.unwrap().open_time, hm(19, 30));
    }

    #[tokio::test]
    async fn missing_row_is_a_config_integrity_error() {
        let store = ScheduleStore::new(vec![]);
        assert!(matches!(
            store.get(2).await,
            Err(ApiError::ConfigIntegrity(2))
        ));
    }
}
