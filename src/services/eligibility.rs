use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate};

use crate::{
    error::ApiError,
    services::{clock::civil_instant, schedule::ScheduleStore},
};

/// The half-open interval during which a date's opt-in may be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenWindow {
    pub opens: DateTime<FixedOffset>,
    pub closes: DateTime<FixedOffset>,
}

impl OpenWindow {
    pub fn contains(&self, now: DateTime<FixedOffset>) -> bool {
        self.opens <= now && now < self.closes
    }
}

/// Decides, for any instant, whether opt-in is open for a given meal date.
///
/// Weekday dates are governed by the row of the previous calendar day: the
/// window opens the evening before and closes on the governed date itself
/// (Monday's row, 20:00 → 09:00, governs Tuesday). Saturday and Sunday share
/// one continuous window that opens on Friday evening and closes on Sunday
/// afternoon, taken from the Saturday row.
pub struct EligibilityEngine {
    schedule: Arc<ScheduleStore>,
    offset: FixedOffset,
}

impl EligibilityEngine {
    pub fn new(schedule: Arc<ScheduleStore>, offset: FixedOffset) -> Self {
        Self { schedule, offset }
    }

    /// Resolve the window governing `date`.
    pub async fn window_for(&self, date: NaiveDate) -> Result<OpenWindow, ApiError> {
        let dow = date.weekday().num_days_from_monday() as u8;
        if dow >= 5 {
            // Weekend: both dates resolve to the same Friday-to-Sunday span.
            let friday = date - Duration::days((dow - 4) as i64);
            let sunday = friday + Duration::days(2);
            let row = self.schedule.get(5).await?;
            Ok(OpenWindow {
                opens: civil_instant(self.offset, friday, row.open_time),
                closes: civil_instant(self.offset, sunday, row.close_time),
            })
        } else {
            // Weekday: anchored the previous calendar day. The close always
            // lands on the governed date, which is the overnight reading when
            // close_time <= open_time.
            let anchor = date - Duration::days(1);
            let anchor_dow = anchor.weekday().num_days_from_monday() as u8;
            let row = self.schedule.get(anchor_dow).await?;
            Ok(OpenWindow {
                opens: civil_instant(self.offset, anchor, row.open_time),
                closes: civil_instant(self.offset, date, row.close_time),
            })
        }
    }

    /// True iff `now` falls inside the window governing `date`. The closing
    /// instant itself is already closed.
    pub async fn is_open(
        &self,
        now: DateTime<FixedOffset>,
        date: NaiveDate,
    ) -> Result<bool, ApiError> {
        Ok(self.window_for(date).await?.contains(now))
    }

    /// The date opt-in currently governs when the caller supplies none.
    /// Scans today through the day after tomorrow (the Friday-evening case,
    /// where the weekend window already governs Saturday) and falls back to
    /// tomorrow when nothing is open.
    pub async fn resolve_target_date(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<NaiveDate, ApiError> {
        let today = now.date_naive();
        for ahead in 0..=2 {
            let candidate = today + Duration::days(ahead);
            if self.is_open(now, candidate).await? {
                return Ok(candidate);
            }
        }
        Ok(today + Duration::days(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock;
    use chrono::NaiveTime;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn engine() -> EligibilityEngine {
        EligibilityEngine::new(Arc::new(ScheduleStore::with_defaults()), ist())
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> DateTime<FixedOffset> {
        clock::civil_instant(ist(), date, NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2024-06-10 is a Monday.

    #[tokio::test]
    async fn tuesday_is_governed_by_mondays_overnight_row() {
        let eng = engine();
        let monday = d(2024, 6, 10);
        let tuesday = d(2024, 6, 11);

        // Monday 19:59: not yet open.
        assert!(!eng.is_open(at(monday, 19, 59), tuesday).await.unwrap());
        // Monday 20:00: opens.
        assert!(eng.is_open(at(monday, 20, 0), tuesday).await.unwrap());
        // Tuesday 08:00: still open.
        assert!(eng.is_open(at(tuesday, 8, 0), tuesday).await.unwrap());
        // Tuesday 09:00: the closing instant itself is closed.
        assert!(!eng.is_open(at(tuesday, 9, 0), tuesday).await.unwrap());
    }

    #[tokio::test]
    async fn weekend_window_spans_friday_evening_to_sunday_afternoon() {
        let eng = engine();
        let friday = d(2024, 6, 14);
        let saturday = d(2024, 6, 15);
        let sunday = d(2024, 6, 16);

        // Friday 19:00: weekend not open yet, for either governed date.
        assert!(!eng.is_open(at(friday, 19, 0), saturday).await.unwrap());
        assert!(!eng.is_open(at(friday, 19, 0), sunday).await.unwrap());
        // Friday 20:00 through Sunday 15:59: continuously open for both.
        assert!(eng.is_open(at(friday, 20, 0), saturday).await.unwrap());
        assert!(eng.is_open(at(saturday, 12, 0), saturday).await.unwrap());
        assert!(eng.is_open(at(saturday, 12, 0), sunday).await.unwrap());
        assert!(eng.is_open(at(sunday, 15, 59), sunday).await.unwrap());
        assert!(eng.is_open(at(sunday, 15, 59), saturday).await.unwrap());
        // Sunday 16:00: closed.
        assert!(!eng.is_open(at(sunday, 16, 0), saturday).await.unwrap());
        assert!(!eng.is_open(at(sunday, 16, 0), sunday).await.unwrap());
    }

    #[tokio::test]
    async fn monday_is_anchored_by_the_sunday_row() {
        let eng = engine();
        let sunday = d(2024, 6, 16);
        let monday = d(2024, 6, 17);

        // Default Sunday row: 16:00 → 20:00, i.e. Monday's window runs from
        // Sunday 16:00 (the weekend close) to Monday 20:00.
        assert!(!eng.is_open(at(sunday, 15, 0), monday).await.unwrap());
        assert!(eng.is_open(at(sunday, 16, 0), monday).await.unwrap());
        assert!(eng.is_open(at(monday, 8, 0), monday).await.unwrap());
        assert!(!eng.is_open(at(monday, 20, 0), monday).await.unwrap());
    }

    #[tokio::test]
    async fn window_reflects_schedule_updates_atomically() {
        let store = Arc::new(ScheduleStore::with_defaults());
        let eng = EligibilityEngine::new(store.clone(), ist());
        let monday = d(2024, 6, 10);
        let tuesday = d(2024, 6, 11);

        assert!(!eng.is_open(at(monday, 19, 0), tuesday).await.unwrap());
        // Widen Monday's row (id 1) to 18:00 → 10:00.
        store
            .update(
                1,
                NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            )
            .await
            .unwrap();
        assert!(eng.is_open(at(monday, 19, 0), tuesday).await.unwrap());
        assert!(eng.is_open(at(tuesday, 9, 30), tuesday).await.unwrap());
    }

    #[tokio::test]
    async fn missing_schedule_row_is_reported_not_guessed() {
        let eng = EligibilityEngine::new(Arc::new(ScheduleStore::new(vec![])), ist());
        let tuesday = d(2024, 6, 11);
        assert!(matches!(
            eng.is_open(at(tuesday, 8, 0), tuesday).await,
            Err(ApiError::ConfigIntegrity(0))
        ));
    }

    #[tokio::test]
    async fn target_date_is_the_governed_date_inside_a_window() {
        let eng = engine();
        let monday = d(2024, 6, 10);
        let tuesday = d(2024, 6, 11);

        // Monday evening: Tuesday's window is open.
        assert_eq!(
            eng.resolve_target_date(at(monday, 21, 0)).await.unwrap(),
            tuesday
        );
        // Tuesday 08:00: Tuesday itself is still governed.
        assert_eq!(
            eng.resolve_target_date(at(tuesday, 8, 0)).await.unwrap(),
            tuesday
        );
        // Tuesday mid-afternoon: nothing open, default to tomorrow.
        assert_eq!(
            eng.resolve_target_date(at(tuesday, 14, 0)).await.unwrap(),
            d(2024, 6, 12)
        );
    }

    #[tokio::test]
    async fn friday_evening_resolves_to_saturday() {
        let eng = engine();
        let friday = d(2024, 6, 14);
        assert_eq!(
            eng.resolve_target_date(at(friday, 21, 0)).await.unwrap(),
            d(2024, 6, 15)
        );
    }
}
