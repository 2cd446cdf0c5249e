pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::identity::TokenIdentity;
use crate::services::sessions::SessionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub identity: Arc<TokenIdentity>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        let identity = TokenIdentity::with_tokens(config.auth_tokens.iter().cloned());
        Self {
            db: Arc::new(db),
            identity: Arc::new(identity),
            sessions: Arc::new(SessionRegistry::with_idle_timeout(config.session_idle_timeout)),
            config: Arc::new(config),
        }
    }
}

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        // Note routes
        .route("/api/notes", get(routes::notes::list).post(routes::notes::create))
        .route(
            "/api/notes/:id",
            get(routes::notes::get)
                .put(routes::notes::update)
                .delete(routes::notes::delete),
        )
        .route("/api/notes/:id/quizzes", post(routes::notes::generate))
        // Quiz routes
        .route("/api/quizzes", get(routes::quizzes::list))
        .route("/api/quizzes/:id", get(routes::quizzes::get))
        .route("/api/quizzes/:id/attempts", get(routes::quizzes::attempts))
        .route("/api/quizzes/:id/sessions", post(routes::quizzes::start_session))
        // Session routes
        .route("/api/sessions/:id", get(routes::sessions::get))
        .route("/api/sessions/:id/answer", put(routes::sessions::answer))
        .route("/api/sessions/:id/advance", post(routes::sessions::advance))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(routes::auth::register))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Connecting to record store...");
    let db = Database::connect(&config).await?;
    tracing::info!(backend = db.backend(), "Record store ready");

    let addr = config.addr();
    let state = AppState::new(db, config);
    tracing::info!(
        tokens = state.identity.token_count().await,
        "Loaded configured auth tokens"
    );

    let app = build_router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
