//! Sitestock Server - Construction Site Equipment Tracking
//!
//! REST API server for per-site equipment inventories, requests and
//! transfers.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use sitestock_server::{
    api, config::AppConfig, logging, repository::Repository, services::Services, AppState,
};

/// Multipart framing on top of the photo itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = logging::init(&config.logging);

    tracing::info!("Starting Sitestock Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let repository = Repository::new(pool);
    let services = Services::new(repository, &config)?;

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let photo_limit = state.config.storage.max_upload_bytes + MULTIPART_OVERHEAD;

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/signup", post(api::auth::signup))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/refresh", post(api::auth::refresh))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/oauth", get(api::auth::oauth_url))
        .route("/auth/complete-signup", post(api::auth::complete_signup))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", put(api::auth::update_profile))
        // Users
        .route("/users", get(api::users::list_users))
        .route("/users/:id", get(api::users::get_user).delete(api::users::delete_user))
        .route("/users/:id/role", put(api::users::update_role))
        // Sites
        .route("/sites", get(api::sites::list_sites).post(api::sites::create_site))
        .route("/sites/:id", get(api::sites::get_site).delete(api::sites::delete_site))
        .route("/sites/:id/supervisor", put(api::sites::assign_supervisor))
        .route("/sites/:id/inventory", get(api::sites::site_inventory))
        // Equipment
        .route(
            "/equipment",
            get(api::equipment::list_inventory).post(api::equipment::create_equipment),
        )
        .route("/equipment/group", put(api::equipment::update_group))
        .route("/equipment/group/delete", post(api::equipment::delete_group))
        .route("/equipment/export", post(api::equipment::export_inventory))
        .route(
            "/equipment/:id",
            get(api::equipment::get_equipment)
                .put(api::equipment::update_equipment)
                .delete(api::equipment::delete_equipment),
        )
        // Requests
        .route(
            "/requests",
            get(api::requests::list_requests).post(api::requests::create_request),
        )
        .route(
            "/requests/:id",
            get(api::requests::get_request).put(api::requests::update_request),
        )
        .route("/requests/:id/approve", post(api::requests::approve_request))
        .route("/requests/:id/reject", post(api::requests::reject_request))
        // Transfers
        .route(
            "/transfers",
            get(api::transfers::list_transfers).post(api::transfers::create_transfer),
        )
        .route("/transfers/:id", get(api::transfers::get_transfer))
        .route("/transfers/:id/approve", post(api::transfers::approve_transfer))
        .route("/transfers/:id/reject", post(api::transfers::reject_transfer))
        .route("/transfers/:id/cancel", post(api::transfers::cancel_transfer))
        .route(
            "/transfers/:id/photo",
            post(api::transfers::upload_photo).layer(DefaultBodyLimit::max(photo_limit)),
        )
        // Dashboard
        .route("/dashboard", get(api::dashboard::supervisor_dashboard))
        .route("/stats", get(api::dashboard::stats))
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
