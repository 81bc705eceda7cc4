//! # CareBook API
//!
//! The API crate provides the web server for the CareBook appointment service.
//! It exposes slot discovery, conflict-checked booking, the appointment
//! lifecycle and doctor availability management over JSON.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into calls to `carebook_core::services`
//! - **Middleware**: Bearer-token authentication and error-to-status mapping
//! - **Config**: Handle environment and application configuration
//!
//! Handlers only see the store and notifier traits, so the same router runs on
//! PostgreSQL in production and on an in-memory store in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use carebook_core::store::{ClinicStore, Notifier};
use carebook_db::{
    DbPool,
    store::{PgNotifier, PgStore},
};
use eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::middleware::auth::JwtAuth;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Availability, appointment and directory persistence
    pub store: Arc<dyn ClinicStore>,
    /// Sink for user-facing notifications
    pub notifier: Arc<dyn Notifier>,
    /// Bearer-token verification
    pub auth: JwtAuth,
}

impl ApiState {
    pub fn new(store: Arc<dyn ClinicStore>, notifier: Arc<dyn Notifier>, auth: JwtAuth) -> Self {
        Self {
            store,
            notifier,
            auth,
        }
    }
}

/// Builds the router with every endpoint and the given state attached
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Slots, booking and appointment lifecycle
        .merge(routes::appointments::routes())
        // Doctor availability management
        .merge(routes::availability::routes())
        .with_state(state)
}

/// Builds the router and wraps it in the CORS, tracing and timeout layers
/// described by `config`
///
/// # Errors
///
/// Fails if one of the configured CORS origins is not a valid header value.
pub fn build_app(state: Arc<ApiState>, config: &config::ApiConfig) -> Result<Router> {
    let app = router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .wrap_err_with(|| format!("Invalid CORS origin '{}'", origin))
            })
            .collect::<Result<Vec<_>>>()?;

        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Request tracing and timeout
    Ok(app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    ))
}

/// Starts the API server with the provided configuration and database connection
///
/// Sets up logging, wires the PostgreSQL store and notifier into the shared
/// state, and serves until the process is stopped.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// let config = carebook_api::config::ApiConfig::from_env()?;
/// let db_pool = carebook_db::create_pool(&config.database_url, config.max_connections).await?;
/// carebook_api::start_server(config, db_pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState::new(
        Arc::new(PgStore::new(db_pool.clone())),
        Arc::new(PgNotifier::new(db_pool)),
        JwtAuth::new(&config.jwt_secret),
    ));

    let app = build_app(state, &config)?;

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
