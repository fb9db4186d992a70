pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::catalog::ContentCatalog;
use crate::services::progress::ProgressStore;
use crate::services::submission::SubmissionCoordinator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub catalog: Arc<ContentCatalog>,
    pub progress: Arc<ProgressStore>,
    pub submissions: SubmissionCoordinator,
}

impl AppState {
    pub fn new(db: Database, catalog: ContentCatalog) -> Self {
        let catalog = Arc::new(catalog);
        let progress = Arc::new(ProgressStore::new(db.clone(), catalog.clone()));
        let submissions = SubmissionCoordinator::new(progress.clone());

        Self {
            db,
            catalog,
            progress,
            submissions,
        }
    }
}

/// Build the API router.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let user_routes = Router::new()
        .route("/api/topics", get(routes::topics::list))
        .route(
            "/api/topics/:topic_id/items/:item_id/answer",
            post(routes::answers::submit),
        )
        .route("/api/topics/:topic_id/ring", get(routes::progress::ring))
        .route(
            "/api/topics/:topic_id/checklist",
            get(routes::progress::checklist),
        )
        .route("/api/progress", get(routes::progress::overview))
        .route("/api/progress/:scope", delete(routes::progress::reset))
        .layer(middleware::from_fn(routes::identity::identity_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(user_routes)
        .layer(TimeoutLayer::new(request_timeout))
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

    tracing::info!("Loading content from {}...", config.content_dir.display());
    let catalog = ContentCatalog::load_dir(&config.content_dir)
        .with_context(|| format!("loading content from {}", config.content_dir.display()))?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.database_max_connections).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let state = AppState::new(db, catalog);
    let app = build_router(state, config.request_timeout);

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
