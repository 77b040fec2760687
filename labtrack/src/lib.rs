//! # labtrack: Lab Inventory Tracking Backend
//!
//! `labtrack` is the backend for a shared-lab inventory: members of a lab
//! register items and rooms, take and return items, and manage each other's
//! permission flags. It exposes a RESTful management API and persists
//! everything in PostgreSQL.
//!
//! ## Overview
//!
//! Every user row carries independent boolean role flags (`is_part_of_lab`,
//! `can_edit_items`, `can_edit_labs`, `can_edit_users`, plus the account
//! flags `is_active` and `is_superuser`). Each route requires a capability
//! derived from those flags by a single policy function - there is no role
//! hierarchy. Items reference the user currently holding them; the "take"
//! transition assigns the caller as owner, stamps `taken_at`, and marks the
//! item unavailable unless the payload says otherwise.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence. Requests flow
//! through authentication (bearer token or session cookie), a per-route
//! permission check, and a repository that owns the SQL for one table.
//! Schema migrations are ordered, reversible SQL pairs applied on startup.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use labtrack::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = labtrack::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     labtrack::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
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
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    auth::password,
    db::handlers::{Repository, Users},
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    openapi::ApiDoc,
};
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, patch, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, instrument, warn, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{ItemId, RoomId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the labtrack database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial superuser if it doesn't exist.
///
/// Idempotent: creates the account on first startup, or refreshes its
/// password on subsequent ones. The account gets every role flag so a fresh
/// deployment is manageable out of the box. When no password is configured
/// and the account doesn't exist yet, nothing is created - an account that
/// can never log in is of no use.
#[instrument(skip_all)]
pub async fn create_initial_superuser(email: &str, password: Option<&str>, db: &PgPool) -> errors::Result<Option<UserId>> {
    let hashed_password = match password {
        Some(pwd) => Some(password::hash_string(pwd)?),
        None => None,
    };

    let mut tx = db.begin().await.map_err(|e| errors::Error::Database(e.into()))?;
    let mut users = Users::new(&mut tx);

    if let Some(existing) = users.get_by_email(email).await? {
        if let Some(hashed_password) = hashed_password {
            users
                .update(
                    existing.id,
                    &UserUpdateDBRequest {
                        hashed_password: Some(hashed_password),
                        ..Default::default()
                    },
                )
                .await?;
        }
        tx.commit().await.map_err(|e| errors::Error::Database(e.into()))?;
        return Ok(Some(existing.id));
    }

    let Some(hashed_password) = hashed_password else {
        warn!("No initial superuser password configured; skipping superuser creation");
        return Ok(None);
    };

    let created = users
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            full_name: None,
            hashed_password,
            is_active: true,
            is_superuser: true,
            is_part_of_lab: true,
            can_edit_items: true,
            can_edit_labs: true,
            can_edit_users: true,
        })
        .await?;

    tx.commit().await.map_err(|e| errors::Error::Database(e.into()))?;
    info!("Created initial superuser {}", email);
    Ok(Some(created.id))
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.cors;

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::new().allow_origin(tower_http::cors::Any));
    }

    let mut origins = Vec::new();
    for origin in &cors_config.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(cors_config.allow_credentials))
}

/// Build the main application router with all endpoints and middleware.
///
/// - Authentication routes at the root (`/authentication/*`)
/// - Management API nested under `/api/v1`
/// - OpenAPI document and interactive docs
/// - CORS and tracing layers
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Authentication routes (at root level)
    let auth_routes = Router::new()
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/register", post(api::handlers::auth::register))
        .with_state(state.clone());

    // API routes
    let api_routes = Router::new()
        // User management
        .route("/users", get(api::handlers::users::list_users))
        .route("/users", post(api::handlers::users::create_user))
        .route("/users/me", get(api::handlers::users::get_me))
        .route("/users/me", patch(api::handlers::users::update_me))
        .route("/users/{id}", get(api::handlers::users::get_user))
        .route("/users/{id}/permissions", patch(api::handlers::users::update_user_permissions))
        // Inventory items
        .route("/items", get(api::handlers::items::list_items))
        .route("/items", post(api::handlers::items::create_item))
        .route("/items/{id}", get(api::handlers::items::get_item))
        .route("/items/{id}", put(api::handlers::items::update_item))
        .route("/items/{id}/take", put(api::handlers::items::take_item))
        .route("/items/{id}", delete(api::handlers::items::delete_item))
        // Rooms
        .route("/rooms", get(api::handlers::rooms::list_rooms))
        .route("/rooms", post(api::handlers::rooms::create_room))
        .route("/rooms/{id}", get(api::handlers::rooms::get_room))
        .route("/rooms/{id}", put(api::handlers::rooms::update_room))
        .route("/rooms/{id}", delete(api::handlers::rooms::delete_room))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
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

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, and seeds the initial superuser
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = PgPool::connect(&config.database_url).await?;
        Self::new_with_pool(config, pool).await
    }

    /// Create a new application instance on an existing connection pool
    /// (used by tests, where the pool comes from the test harness).
    pub async fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        migrator().run(&pool).await?;

        create_initial_superuser(&config.first_superuser_email, config.first_superuser_password.as_deref(), &pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create initial superuser: {e}"))?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("labtrack listening on http://{}", bind_addr);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
