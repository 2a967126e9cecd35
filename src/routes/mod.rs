pub mod admin;
pub mod health;
pub mod meals;
pub mod users;
pub mod verify;

use chrono::NaiveDate;

use crate::error::ApiError;

/// Dates travel as ISO `YYYY-MM-DD` strings, parsed here so a malformed one
/// is rejected with the domain message rather than a generic extractor error.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ApiError::InvalidDate)
}
