//! Roster Backend
//!
//! REST and realtime backend for raid roster management, with SQLite
//! persistence and a game API client for character lookups.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod events;
mod lookup;
mod models;
mod roster;
mod sweep;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::AdminVerifier;
use config::Config;
use db::Repository;
use events::ChangeFeed;
use lookup::CharacterLookup;
use sweep::ExpirySweeper;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub lookup: Arc<CharacterLookup>,
    pub feed: Arc<ChangeFeed>,
    pub admin: Option<Arc<AdminVerifier>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        let lookup = CharacterLookup::new(
            config.lookup_base_url.clone(),
            config.lookup_api_key.clone(),
        );
        let admin = config
            .admin_secret
            .as_deref()
            .map(|secret| Arc::new(AdminVerifier::new(secret)));

        Self {
            repo,
            lookup: Arc::new(lookup),
            feed: Arc::new(ChangeFeed::new()),
            admin,
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let (config, config_fallbacks) = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Roster Backend");
    for fallback in &config_fallbacks {
        tracing::warn!("{}", fallback);
    }
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "Sessions expire {} minutes after their start",
        config.expiry_grace.num_minutes()
    );

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (ROSTER_API_PSK). Authentication is disabled!");
    }
    if config.admin_secret.is_none() {
        tracing::warn!("No admin secret configured (ROSTER_ADMIN_SECRET). Admin override is disabled");
    }
    if config.lookup_api_key.is_none() {
        tracing::warn!("No game API key configured (ROSTER_LOOKUP_API_KEY). Character search will fail");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let bind_addr = config.bind_addr;
    let sweep_interval = config.sweep_interval;
    let state = AppState::new(repo, config);

    // Start the expiry sweep
    let sweeper = Arc::new(ExpirySweeper::new(
        state.repo.clone(),
        state.feed.clone(),
        state.config.expiry_grace,
    ));
    sweeper.spawn(sweep_interval);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

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

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Snapshot
        .route("/snapshot", get(api::get_snapshot))
        .route("/snapshot/revision", get(api::get_revision))
        .route("/subscribe", get(api::subscribe))
        // Characters
        .route("/characters/search", get(api::search_characters))
        // Sessions
        .route(
            "/sessions",
            get(api::list_sessions).post(api::create_session),
        )
        .route(
            "/sessions/{id}",
            get(api::get_session)
                .put(api::update_session)
                .delete(api::delete_session),
        )
        .route("/sessions/{id}/stats", get(api::session_stats))
        // Roster
        .route("/sessions/{id}/assign", post(api::assign_character))
        .route("/sessions/{id}/remove", post(api::remove_character))
        .route(
            "/sessions/{id}/sync-combat-power",
            post(api::sync_combat_power),
        )
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
