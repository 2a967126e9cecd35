// Library exports for the api binary and tests
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use services::{
    catalog::MealCatalog, clock::CivilClock, eligibility::EligibilityEngine, ledger::OptInLedger,
    qr::QrTokenService, schedule::ScheduleStore, users::UserDirectory,
    verification::VerificationService,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub clock: Arc<CivilClock>,
    pub catalog: Arc<MealCatalog>,
    pub users: Arc<UserDirectory>,
    pub schedule: Arc<ScheduleStore>,
    pub eligibility: Arc<EligibilityEngine>,
    pub ledger: Arc<OptInLedger>,
    pub qr: Arc<QrTokenService>,
    pub verification: Arc<VerificationService>,
}

impl AppState {
    /// Wire up every component from configuration. The schedule is seeded
    /// with the shipped defaults and an admin account is registered so the
    /// service is usable immediately.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let clock = Arc::new(CivilClock::new(config.tz_offset_minutes)?);
        let catalog = Arc::new(MealCatalog::from_names(&config.meal_types));
        let users = Arc::new(UserDirectory::new());
        users
            .register(&config.seed_admin_name, &config.seed_admin_email, true)
            .await?;

        let schedule = Arc::new(ScheduleStore::with_defaults());
        let eligibility = Arc::new(EligibilityEngine::new(schedule.clone(), clock.offset()));
        let ledger = Arc::new(OptInLedger::new(catalog.clone(), eligibility.clone()));
        let qr = Arc::new(QrTokenService::new(&config.app_base_url));
        let verification = Arc::new(VerificationService::new(
            qr.clone(),
            ledger.clone(),
            users.clone(),
        ));

        Ok(Self {
            config,
            clock,
            catalog,
            users,
            schedule,
            eligibility,
            ledger,
            qr,
            verification,
        })
    }
}
