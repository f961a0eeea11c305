//! MessMate Backend
//!
//! REST backend for hostel mess management: meal tokens, weekly menu, notifications,
//! feedback and bills, persisted as JSON documents in a SQLite key-value table.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod stores;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::KvStore;
use stores::Stores;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub stores: Arc<Stores>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting MessMate Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.fallback_password == config::DEFAULT_FALLBACK_PASSWORD {
        tracing::warn!(
            "Seeded users accept the default fallback password (set MESSMATE_FALLBACK_PASSWORD)"
        );
    }

    // Initialize database and load every store
    let pool = db::init_database(&config.db_path).await?;
    let stores = Stores::open(KvStore::new(pool)).await?;

    let state = AppState {
        stores: Arc::new(stores),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // No session required
    let public_routes = Router::new()
        .route("/auth/register", post(api::register))
        .route("/auth/login", post(api::login))
        .route("/menu", get(api::get_menu))
        .route("/menu/today", get(api::today_menu));

    // Admin only; the session layer below runs first
    let admin_routes = Router::new()
        .route("/dashboard", get(api::dashboard))
        .route("/meals", get(api::list_meals))
        .route("/meals/{id}/verify", post(api::verify_token))
        .route("/menu", put(api::save_menu))
        .route("/menu/reset", post(api::reset_menu))
        .route("/menu/{day}/{meal_type}", patch(api::patch_meal))
        .route("/notifications", post(api::create_notification))
        .route("/notifications/{id}", delete(api::delete_notification))
        .route("/bills", post(api::create_bill))
        .route("/bills/{id}", delete(api::delete_bill))
        .route("/feedback", get(api::list_feedback))
        .route_layer(middleware::from_fn(auth::require_admin));

    // Any logged-in user
    let session_routes = Router::new()
        .route("/auth/logout", post(api::logout))
        .route("/auth/me", get(api::me))
        .route("/meals/select", post(api::select_meal))
        .route("/meals/history", get(api::meal_history))
        .route("/meals/summary", get(api::monthly_summary))
        .route("/notifications", get(api::list_notifications))
        .route("/bills", get(api::list_bills))
        .route("/feedback", post(api::submit_feedback))
        .route("/feedback/mine", get(api::my_feedback))
        .route(
            "/preferences/theme",
            get(api::get_theme).put(api::set_theme),
        )
        .route("/preferences/theme/toggle", post(api::toggle_theme))
        .nest("/admin", admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let api_routes = Router::new().merge(public_routes).merge(session_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
