use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{meal::MealStatus, user::User},
    services::{ledger::OptInLedger, qr::QrTokenService, users::UserDirectory},
};

/// Outcome of one verification attempt. `RequiresLogin` is a control signal,
/// not a failure: the token checked out but nobody is identified yet, so the
/// client re-calls with an identity.
#[derive(Debug)]
pub enum VerificationResult {
    RequiresLogin,
    Resolved { user: User, meals: Vec<MealStatus> },
}

/// Confirms a user's opt-in state at the serving counter. Stateless across
/// calls and strictly read-only: it never mutates records and creates no
/// session, so both counter and user clients can poll it freely.
pub struct VerificationService {
    tokens: Arc<QrTokenService>,
    ledger: Arc<OptInLedger>,
    users: Arc<UserDirectory>,
}

impl VerificationService {
    pub fn new(
        tokens: Arc<QrTokenService>,
        ledger: Arc<OptInLedger>,
        users: Arc<UserDirectory>,
    ) -> Self {
        Self {
            tokens,
            ledger,
            users,
        }
    }

    pub async fn verify(
        &self,
        date: NaiveDate,
        token: &str,
        caller: Option<Uuid>,
    ) -> Result<VerificationResult, ApiError> {
        let live = self.tokens.live(date).await.ok_or(ApiError::TokenInvalid)?;
        if live.token != token {
            // Superseded or unknown: stale printouts and in-flight scans of
            // a regenerated code land here.
            return Err(ApiError::TokenInvalid);
        }

        let Some(caller) = caller else {
            return Ok(VerificationResult::RequiresLogin);
        };
        let Some(user) = self.users.get(caller).await else {
            return Ok(VerificationResult::RequiresLogin);
        };

        let meals = self.ledger.get_status(user.id, date).await;
        Ok(VerificationResult::Resolved { user, meals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        catalog::MealCatalog, clock, eligibility::EligibilityEngine, schedule::ScheduleStore,
    };
    use chrono::{DateTime, FixedOffset, NaiveTime};

    fn at(date: NaiveDate, h: u32, m: u32) -> DateTime<FixedOffset> {
        clock::civil_instant(
            FixedOffset::east_opt(330 * 60).unwrap(),
            date,
            NaiveTime::from_hms_opt(h, m, 0).unwrap(),
        )
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    struct Fixture {
        service: VerificationService,
        tokens: Arc<QrTokenService>,
        ledger: Arc<OptInLedger>,
        users: Arc<UserDirectory>,
    }

    fn fixture() -> Fixture {
        let catalog = Arc::new(MealCatalog::from_names(&["Breakfast", "Lunch", "Dinner"]));
        let eligibility = Arc::new(EligibilityEngine::new(
            Arc::new(ScheduleStore::with_defaults()),
            FixedOffset::east_opt(330 * 60).unwrap(),
        ));
        let ledger = Arc::new(OptInLedger::new(catalog, eligibility));
        let tokens = Arc::new(QrTokenService::new("http://localhost:8080"));
        let users = Arc::new(UserDirectory::new());
        Fixture {
            service: VerificationService::new(tokens.clone(), ledger.clone(), users.clone()),
            tokens,
            ledger,
            users,
        }
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let f = fixture();
        let date = d(2024, 6, 10);
        let err = f.service.verify(date, "abc", None).await.unwrap_err();
        assert!(matches!(err, ApiError::TokenInvalid));
    }

    #[tokio::test]
    async fn regeneration_invalidates_the_in_flight_token() {
        let f = fixture();
        let date = d(2024, 6, 10);
        let old = f.tokens.get_or_issue(date, at(date, 7, 0)).await;
        let user = f.users.register("John Doe", "john@example.com", false).await.unwrap();

        // Old link works before the rotation.
        assert!(matches!(
            f.service.verify(date, &old.token, Some(user.id)).await.unwrap(),
            VerificationResult::Resolved { .. }
        ));

        let new = f.tokens.regenerate(date, at(date, 9, 0)).await;

        // The scan that was already in flight now fails.
        let err = f
            .service
            .verify(date, &old.token, Some(user.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::TokenInvalid));

        // The replacement resolves normally.
        assert!(matches!(
            f.service.verify(date, &new.token, Some(user.id)).await.unwrap(),
            VerificationResult::Resolved { .. }
        ));
    }

    #[tokio::test]
    async fn valid_token_without_identity_requires_login() {
        let f = fixture();
        let date = d(2024, 6, 10);
        let live = f.tokens.get_or_issue(date, at(date, 7, 0)).await;

        assert!(matches!(
            f.service.verify(date, &live.token, None).await.unwrap(),
            VerificationResult::RequiresLogin
        ));
        // An identity the directory cannot resolve behaves the same way.
        assert!(matches!(
            f.service
                .verify(date, &live.token, Some(Uuid::new_v4()))
                .await
                .unwrap(),
            VerificationResult::RequiresLogin
        ));
    }

    #[tokio::test]
    async fn resolved_result_reports_the_ledger_state() {
        let f = fixture();
        let tuesday = d(2024, 6, 11);
        let user = f.users.register("Jane Smith", "jane@example.com", false).await.unwrap();
        f.ledger
            .set_opt_in(user.id, tuesday, 2, true, at(tuesday, 8, 30))
            .await
            .unwrap();
        let live = f.tokens.get_or_issue(tuesday, at(tuesday, 7, 0)).await;

        let result = f
            .service
            .verify(tuesday, &live.token, Some(user.id))
            .await
            .unwrap();
        match result {
            VerificationResult::Resolved { user: resolved, meals } => {
                assert_eq!(resolved.email, "jane@example.com");
                assert!(meals[1].opted_in);
                assert!(!meals[0].opted_in);
            }
            other => panic!("expected Resolved, got {other:?}"),
        }
    }
}
