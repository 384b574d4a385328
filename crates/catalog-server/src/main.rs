//! Sheet Catalog Server
//!
//! REST API over sheets and categories with real-time change notifications
//! over WebSocket. Persists to SQLite when `DATABASE_URL` is set, to flat
//! JSON documents otherwise.

mod config;
mod extractors;
mod handlers;
mod services;
mod storage;


use anyhow::{Context, Result};
use axum::{
    routing::{get, post, put},
    Router,
};
use catalog_core::RecordStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use config::ServerConfig;
use services::{Broadcaster, CategoryService, IntegrityCoordinator, Migrator, SheetService};
use storage::JsonFileStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub sheets: Arc<SheetService>,
    pub categories: Arc<CategoryService>,
    pub migrator: Arc<Migrator>,
    pub broadcaster: Arc<Broadcaster>,
}

impl AppState {
    /// Wire the services around the store chosen at startup
    pub fn new(store: Arc<dyn RecordStore>, files: Arc<JsonFileStore>) -> Self {
        let broadcaster = Arc::new(Broadcaster::new());
        let integrity = Arc::new(IntegrityCoordinator::new(
            store.clone(),
            broadcaster.clone(),
        ));
        let sheets = Arc::new(SheetService::new(
            store.clone(),
            integrity.clone(),
            broadcaster.clone(),
        ));
        let categories = Arc::new(CategoryService::new(
            store.clone(),
            integrity,
            broadcaster.clone(),
        ));
        let migrator = Arc::new(Migrator::new(files, store.clone(), broadcaster.clone()));

        Self {
            store,
            sheets,
            categories,
            migrator,
            broadcaster,
        }
    }
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Sheet Catalog Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = ServerConfig::from_env().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, data_dir={}",
        config.bind_address,
        config.data_dir.display()
    );

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create data directory {}",
                config.data_dir.display()
            )
        })?;

    let backends = storage::open(&config).await?;
    info!("Storage backend: {}", backends.active.backend());

    let state = AppState::new(backends.active, backends.files);
    let broadcaster = state.broadcaster.clone();

    info!("Static files directory: {}", config.static_dir.display());

    let app = app(state)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(broadcaster))
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Routes without static files or middleware
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/ws", get(handlers::ws::handler))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sheets",
            get(handlers::sheets::list)
                .post(handlers::sheets::create)
                .delete(handlers::sheets::delete_all),
        )
        .route(
            "/sheets/:id",
            get(handlers::sheets::get)
                .put(handlers::sheets::update)
                .delete(handlers::sheets::delete),
        )
        .route(
            "/sheets/:id/categories",
            put(handlers::sheets::set_categories),
        )
        .route(
            "/categories",
            get(handlers::categories::list)
                .post(handlers::categories::create)
                .delete(handlers::categories::delete_all),
        )
        .route(
            "/categories/:id",
            get(handlers::categories::get)
                .put(handlers::categories::update)
                .delete(handlers::categories::delete),
        )
        .route("/migrate", post(handlers::migrate::migrate))
}

/// Resolves on Ctrl-C after dropping every real-time client
async fn shutdown_signal(broadcaster: Arc<Broadcaster>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
    broadcaster.close_all();
}
