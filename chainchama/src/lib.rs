//! # chainchama: community savings groups
//!
//! `chainchama` runs the backend of a chama (rotating savings group) service. It provides a REST API
//! for users, groups and members, and a ledger that collects contributions in rounds, pools each
//! round's payout for a rotating grantee and tracks the group's savings.
//!
//! ## Architecture
//!
//! - **API layer** ([`api`]): Axum handlers and request/response models
//! - **Ledger rules** ([`chama`]): pure contribution, split and rotation rules
//! - **Database layer** ([`db`]): PostgreSQL repositories built on sqlx
//! - **Authentication** ([`auth`]): OIDC profile mapping and sign-in persistence
//! - **Configuration** ([`config`]): YAML + environment configuration via figment
//!
//! ## Usage
//!
//! ```no_run
//! use chainchama::{Application, Config, telemetry};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! telemetry::init_telemetry(config.enable_otel_export)?;
//!
//! let app = Application::new(config).await?;
//! app.serve(async { tokio::signal::ctrl_c().await.ok(); }).await
//! # }
//! ```
//!
//! Migrations run on startup. To run them by hand:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! chainchama::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
pub mod api;
pub mod auth;
pub mod chama;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::api::handlers::{ledger, members, organizations, users};
use crate::config::{CorsConfig, CorsOrigin, PoolSettings};
use crate::openapi::ApiDoc;
use axum::http::{self, HeaderValue, Method};
use axum::{
    Json, Router,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{MemberId, OrganizationId, UserId};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the chainchama database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Zero idle or lifetime limits disable the limit.
fn pool_options(settings: &PoolSettings) -> PgPoolOptions {
    let limit = |secs: u64| (secs > 0).then_some(Duration::from_secs(secs));

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(limit(settings.idle_timeout_secs))
        .max_lifetime(limit(settings.max_lifetime_secs))
}

/// Connect to the configured database and bring its schema up to date.
#[instrument(skip_all)]
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = pool_options(&config.database.pool).connect(&config.database.url).await?;
    migrator().run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Create CORS layer from configuration.
///
/// A `*` entry echoes the request origin back, which stays valid when credentials are allowed.
fn create_cors_layer(cors_config: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::mirror_request()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Origins never carry the trailing slash `Url` adds to bare hosts
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/user", get(users::list_users).post(users::create_user))
        .route(
            "/user/{id}",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/user/{id}/groups", get(users::get_user_groups))
        // Groups
        .route("/group/create", post(organizations::create_group))
        .route("/group/{id}", get(organizations::get_group))
        // Members
        .route("/group/members/create", post(members::create_member).get(members::list_members))
        .route("/group/members/{organization_id}", get(members::list_organization_members))
        // Ledger
        .route("/group/{id}/contributions", post(ledger::contribute))
        .route("/group/{id}/withdraw", post(ledger::withdraw))
        .route("/group/{id}/archive", post(ledger::archive))
        .route("/group/{id}/status", get(ledger::group_status))
}

/// Build the application router: the API under `/api`, a health check, the OpenAPI document and
/// its Scalar viewer, wrapped in CORS and request tracing.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors = create_cors_layer(&state.config.cors)?;

    let router = Router::new()
        .nest("/api", api_routes())
        .route("/healthz", get(|| async { "OK" }))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(cors),
        );

    Ok(router)
}

/// A configured server: database pool, state and router, ready to serve.
///
/// 1. **Create**: [`Application::new`] connects to the database and runs migrations
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests finish, then the pool
///    closes and telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance, connecting to `config.database.url`
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application on an existing pool. With `None`, connect and migrate as [`Application::new`] does.
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting chainchama with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => pool,
            None => setup_database(&config).await?,
        };

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("ChainChama listening on http://{}", bind_addr);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
