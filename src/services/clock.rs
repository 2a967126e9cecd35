use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

/// Where "now" comes from. Production uses the system clock; tests pin it.
pub trait TimeSource: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Normalizes wall-clock time into the operational civil timezone. All
/// eligibility arithmetic downstream works on instants produced here, so the
/// timezone conversion happens exactly once, at this boundary.
pub struct CivilClock {
    offset: FixedOffset,
    source: Arc<dyn TimeSource>,
}

impl CivilClock {
    pub fn new(offset_minutes: i32) -> anyhow::Result<Self> {
        let offset = FixedOffset::east_opt(offset_minutes * 60)
            .ok_or_else(|| anyhow::anyhow!("Invalid timezone offset: {offset_minutes} minutes"))?;
        Ok(Self {
            offset,
            source: Arc::new(SystemTimeSource),
        })
    }

    pub fn with_source(offset: FixedOffset, source: Arc<dyn TimeSource>) -> Self {
        Self { offset, source }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.source.now_utc().with_timezone(&self.offset)
    }

    /// Current civil date in the operational timezone.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn tomorrow(&self) -> NaiveDate {
        self.today() + Duration::days(1)
    }
}

/// Converts a civil (date, time-of-day) pair into a comparable instant in the
/// given fixed offset. Infallible: fixed offsets have no gaps or folds.
pub fn civil_instant(offset: FixedOffset, date: NaiveDate, time: NaiveTime) -> DateTime<FixedOffset> {
    let local = date.and_time(time);
    let utc = local - Duration::seconds(offset.local_minus_utc() as i64);
    DateTime::from_naive_utc_and_offset(utc, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FixedSource(DateTime<Utc>);

    impl TimeSource for FixedSource {
        fn now_utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    #[test]
    fn today_crosses_the_utc_date_line() {
        // 2024-06-10 20:00 UTC is already 2024-06-11 01:30 in IST.
        let source = Arc::new(FixedSource(
            Utc.with_ymd_and_hms(2024, 6, 10, 20, 0, 0).unwrap(),
        ));
        let clock = CivilClock::with_source(ist(), source);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 6, 11).unwrap());
        assert_eq!(clock.tomorrow(), NaiveDate::from_ymd_opt(2024, 6, 12).unwrap());
    }

    #[test]
    fn civil_instant_round_trips_through_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let instant = civil_instant(ist(), date, time);
        assert_eq!(instant.date_naive(), date);
        assert_eq!(instant.time(), time);
        // 09:00 IST == 03:30 UTC the same day.
        assert_eq!(
            instant.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 6, 11, 3, 30, 0).unwrap()
        );
    }
}
