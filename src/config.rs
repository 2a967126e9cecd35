use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Public base URL embedded in verification links and QR payloads.
    pub app_base_url: String,
    /// Offset of the operational civil timezone from UTC, in minutes.
    /// The cafeteria runs on one fixed timezone (default IST, +05:30).
    pub tz_offset_minutes: i32,
    /// Meal catalog, comma-separated. Immutable once the service is up.
    pub meal_types: Vec<String>,
    pub seed_admin_name: String,
    pub seed_admin_email: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            tz_offset_minutes: env::var("TZ_OFFSET_MINUTES")
                .unwrap_or_else(|_| "330".into())
                .parse()?,
            meal_types: env::var("MEAL_TYPES")
                .unwrap_or_else(|_| "Breakfast,Lunch,Dinner".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            seed_admin_name: env::var("SEED_ADMIN_NAME")
                .unwrap_or_else(|_| "Admin User".into()),
            seed_admin_email: env::var("SEED_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@example.com".into()),
        })
    }
}
