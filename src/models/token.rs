use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

/// One issued verification token. Regeneration never overwrites in place:
/// the old token is kept with `superseded = true` so the arena stays
/// auditable and stale scans can be rejected explicitly.
#[derive(Debug, Clone, Serialize)]
pub struct QrToken {
    pub date: NaiveDate,
    pub token: String,
    pub issued_at: DateTime<FixedOffset>,
    pub superseded: bool,
}
