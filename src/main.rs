use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lunchtrack_api::{config::Config, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(config).await?;
    info!(
        "Meal catalog: {}",
        state
            .catalog
            .list()
            .iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    info!("Admin account seeded: {}", state.config.seed_admin_email);

    // Allow the configured public origin, plus localhost for development.
    let base_url = state.config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") || o == base_url
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-user-id"),
        ]))
        .allow_origin(cors_origin);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Current user
        .route("/api/user", get(routes::users::me))
        .route("/api/users", post(routes::users::create_user))
        // Meal opt-in
        .route("/api/meals", get(routes::meals::get_meal_types))
        .route("/api/meals/opt-in-status", get(routes::meals::get_opt_in_status))
        .route("/api/meals/opt-in", post(routes::meals::meal_opt_in))
        .route("/api/meals/weekly-status", get(routes::meals::get_weekly_status))
        .route("/api/meals/weekly-opt-in", post(routes::meals::weekly_opt_in))
        // Public verification (polled by the serving counter)
        .route("/api/verify-meal/{date}/{token}", get(routes::verify::verify_meal))
        // Admin
        .route("/api/admin/daily-qr", get(routes::admin::get_daily_qr))
        .route("/api/admin/regenerate-qr", post(routes::admin::regenerate_qr))
        .route("/api/admin/qr-image/{date}", get(routes::admin::qr_image))
        .route("/api/admin/opted-meals", get(routes::admin::opted_meals))
        .route("/api/admin/schedules", get(routes::admin::get_schedules))
        .route("/api/admin/schedules/{id}", put(routes::admin::update_schedule))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state.clone());

    let addr = format!("{}:{}", state.config.host, state.config.port);
    info!("lunchtrack API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
