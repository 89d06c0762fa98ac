//! # aquamon: Water-Monitoring Backend
//!
//! `aquamon` is the backend service for a fleet of monitored water units. It provides a
//! RESTful API for managing units, the total-dissolved-solids (TDS) readings recorded
//! against them, and the maintenance reports filed by the people who look after them,
//! along with token-based authentication for the maintainers themselves.
//!
//! ## Overview
//!
//! A water unit is a physical installation at some location. Sensors (or people) record
//! TDS readings against a unit over time, and maintainers file reports when something
//! needs fixing. The service keeps all three resources in SQLite and exposes them over
//! HTTP so dashboards and field tools can share one source of truth.
//!
//! Reads are open: anyone can list units, readings, and reports. Writes require a
//! maintainer account. Registration and login both issue an opaque token which clients
//! present either as an `Authorization: Token <key>` header (CLI and scripts) or via the
//! `auth_token` session cookie (browsers).
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP
//! layer and uses SQLite via `sqlx` for persistence, so a single file on disk is the
//! whole deployment.
//!
//! The **API layer** ([`api`]) exposes the REST surface under `/api/*`. Request bodies
//! are validated into database requests before they touch a connection; validation
//! failures come back as `400` responses mapping field names to messages.
//!
//! The **authentication layer** ([`auth`]) resolves the presented token to a maintainer
//! through the [`CurrentMaintainer`](api::models::maintainers::CurrentMaintainer)
//! extractor. Handlers for mutating routes take the extractor as an argument; safe
//! methods never authenticate. Passwords are hashed with Argon2id, and hashing runs on
//! a blocking thread so it cannot stall the async runtime.
//!
//! The **database layer** ([`db`]) uses the repository pattern: each resource has a
//! repository that owns its queries and maps row-level failures (unique violations,
//! missing foreign keys) into typed errors the API layer can translate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use aquamon::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = aquamon::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize structured logging
//!     aquamon::telemetry::init_telemetry()?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The database file is created on first start and migrations run automatically. To run
//! them against an existing pool:
//!
//! ```no_run
//! # use sqlx::SqlitePool;
//! # async fn example(pool: SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
//! aquamon::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    auth::password::{self, Argon2Params},
    config::InitialAdminConfig,
    db::handlers::{Maintainers, Repository},
    db::models::maintainers::MaintainerCreateDBRequest,
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{MaintainerId, MaintenanceId, WaterQualityId, WaterUnitId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the aquamon database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin maintainer if it doesn't exist.
///
/// Idempotent: when the configured email already has an account, that account is left
/// untouched and its id returned. Called during startup when `initial_admin` is set,
/// so a fresh deployment always has one usable login.
#[instrument(skip_all)]
pub async fn create_initial_admin(admin: &InitialAdminConfig, params: Argon2Params, db: &SqlitePool) -> anyhow::Result<MaintainerId> {
    let mut tx = db.begin().await?;
    let mut repo = Maintainers::new(&mut tx);

    if let Some(existing) = repo.get_by_email(&admin.email).await? {
        debug!(maintainer_id = existing.id, "Initial admin already exists");
        tx.commit().await?;
        return Ok(existing.id);
    }

    let password_hash = password::hash_string_with_params(&admin.password, params)
        .map_err(|e| anyhow::anyhow!("Failed to hash initial admin password: {e}"))?;

    let created = repo
        .create(&MaintainerCreateDBRequest {
            name: admin.name.clone(),
            email: admin.email.clone(),
            password_hash,
            is_admin: true,
        })
        .await?;

    tx.commit().await?;
    info!(maintainer_id = created.id, email = %admin.email, "Created initial admin maintainer");
    Ok(created.id)
}

/// Open the SQLite pool, run migrations, and seed the initial admin.
#[instrument(skip_all)]
pub async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await?;

    info!("Running database migrations");
    migrator().run(&pool).await?;

    if let Some(admin) = &config.initial_admin {
        create_initial_admin(admin, Argon2Params::from(&config.password), &pool).await?;
    }

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    // Browser clients send the session cookie cross-origin, so preflights must
    // clear PATCH/DELETE and the CSRF header.
    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-csrftoken"),
        ])
        .allow_credentials(config.cors.allow_credentials);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - Authentication routes (register, login, logout, current user, CSRF)
/// - Resource routes for water units, quality readings, and maintenance reports
/// - OpenAPI document at `/api-docs/openapi.json` and Scalar UI at `/docs`
/// - CORS configuration
/// - Tracing middleware
///
/// Authorization happens inside the handlers: mutating handlers take the
/// [`CurrentMaintainer`](api::models::maintainers::CurrentMaintainer) extractor, so
/// `GET`/`HEAD`/`OPTIONS` requests never touch the token store.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route("/register/", post(api::handlers::auth::register))
        .route("/login/", post(api::handlers::auth::login))
        .route("/logout/", post(api::handlers::auth::logout))
        .route("/user/", get(api::handlers::auth::user_info))
        .route("/csrf/", get(api::handlers::auth::csrf))
        .route(
            "/water-unit/",
            get(api::handlers::water_units::list_water_units).post(api::handlers::water_units::create_water_unit),
        )
        .route(
            "/water-unit/{id}/",
            get(api::handlers::water_units::get_water_unit)
                .patch(api::handlers::water_units::update_water_unit)
                .delete(api::handlers::water_units::delete_water_unit),
        )
        .route(
            "/water-quality/",
            get(api::handlers::water_quality::list_water_quality).post(api::handlers::water_quality::create_water_quality),
        )
        .route(
            "/water-quality/{id}/",
            get(api::handlers::water_quality::get_water_quality)
                .patch(api::handlers::water_quality::update_water_quality)
                .delete(api::handlers::water_quality::delete_water_quality),
        )
        .route(
            "/maintenance/",
            get(api::handlers::maintenance::list_maintenance).post(api::handlers::maintenance::create_maintenance),
        )
        .route(
            "/maintenance/{id}/",
            get(api::handlers::maintenance::get_maintenance)
                .patch(api::handlers::maintenance::update_maintenance)
                .delete(api::handlers::maintenance::delete_maintenance),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns the router, configuration, and pool.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] opens the database, runs migrations, seeds the
///    initial admin, and builds the router
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests until the
///    shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting aquamon with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "aquamon listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_app;
    use serde_json::{Value, json};

    #[sqlx::test]
    #[test_log::test]
    async fn test_healthz(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.get("/healthz").await;

        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_openapi_document_is_served(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.get("/api-docs/openapi.json").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["paths"]["/api/water-unit/"].is_object());
        assert!(body["paths"]["/api/register/"].is_object());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_route_is_not_found(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        app.get("/api/frobnicator/").await.assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_to_logout_workflow(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        app.post("/api/register/")
            .json(&json!({
                "email": "field@example.com",
                "name": "Field Tech",
                "password": "longenoughpassword"
            }))
            .await
            .assert_status_ok();

        app.post("/api/login/")
            .json(&json!({
                "username": "field@example.com",
                "password": "longenoughpassword"
            }))
            .await
            .assert_status_ok();

        let response = app
            .post("/api/water-unit/")
            .json(&json!({"name": "Well 7", "location": "North field"}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let unit: Value = response.json();

        let response = app
            .post("/api/water-quality/")
            .json(&json!({"wu": unit["id"], "tds": 420.0}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let response = app.get("/api/water-quality/?min_tds=400").await;
        response.assert_status_ok();
        let readings: Value = response.json();
        assert_eq!(readings.as_array().unwrap().len(), 1);
        assert_eq!(readings[0]["tds"], 420.0);

        app.post("/api/logout/").await.assert_status_ok();
        app.get("/api/user/").await.assert_status_unauthorized();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_initial_admin_is_idempotent(pool: SqlitePool) {
        let admin = InitialAdminConfig {
            email: "admin@example.com".to_string(),
            name: "Admin".to_string(),
            password: "adminpassword".to_string(),
        };
        let params = Argon2Params {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        };

        let first = create_initial_admin(&admin, params, &pool).await.unwrap();
        let second = create_initial_admin(&admin, params, &pool).await.unwrap();

        assert_eq!(first, second);

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Maintainers::new(&mut conn);
        let stored = repo.get_by_email("admin@example.com").await.unwrap().unwrap();
        assert!(stored.is_admin);
    }
}
