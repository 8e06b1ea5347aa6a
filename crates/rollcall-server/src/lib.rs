//! # Rollcall Server
//!
//! Live check-in board. Scanners `POST /log_user` with a badge identifier
//! and an activity; the server resolves the badge to a name, records the
//! check-in once per (badge, activity) pair and pushes the updated log to
//! every viewer connected on `/ws`.
//!
//! ## Components
//!
//! - [`AdmissionController`]: validate → resolve → dedupe → commit
//! - [`BroadcastHub`]: fan-out of snapshots and notifications to viewers
//! - [`viewer`]: per-viewer WebSocket sessions and search
//! - [`routes`]: HTTP handlers

pub mod admission;
pub mod config;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod viewer;

pub use admission::{AdmissionController, AdmissionError, CheckInRequest};
pub use config::{Cli, Command, DirectoryConfig, ServeArgs, ServerConfig};
pub use error::{ApiError, ErrorBody, MessageBody, ServerError};
pub use hub::{BroadcastHub, ViewerSubscription};
pub use protocol::{ClientMessage, Notification, ProtocolError, ServerMessage};
pub use state::{AppState, StateOptions};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use rollcall_directory::{DirectoryResolver, HttpDirectory, StaticDirectory};
use rollcall_storage::JsonFileBackend;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, services::ServeFile, trace::TraceLayer};
use tracing::{info, warn};

/// Build the HTTP/WebSocket router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/log_user", post(routes::log_user))
        .route("/delete_log_entry", post(routes::delete_log_entry))
        .route("/health", get(routes::health))
        .route("/ws", get(viewer::ws_handler))
        .route_service("/", ServeFile::new(state.static_dir.join("index.html")))
        .route_service("/log", ServeFile::new(state.static_dir.join("log.html")))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Open the configured directory
pub async fn open_directory(
    config: &ServerConfig,
) -> Result<Arc<dyn DirectoryResolver>, ServerError> {
    let directory: Arc<dyn DirectoryResolver> = match &config.directory {
        DirectoryConfig::Roster { path } => Arc::new(StaticDirectory::from_roster_file(path).await?),
        DirectoryConfig::Http { url } => {
            Arc::new(HttpDirectory::with_timeout(url, config.resolver_timeout())?)
        }
    };
    Ok(directory)
}

/// Load the log and directory and wire up shared state
pub async fn build_state(config: &ServerConfig) -> Result<Arc<AppState>, ServerError> {
    let directory = open_directory(config).await?;
    let backend = Arc::new(JsonFileBackend::new(&config.data_file));

    let options = StateOptions {
        resolver_timeout: config.resolver_timeout(),
        static_dir: config.static_dir.clone(),
        ..StateOptions::default()
    };
    Ok(AppState::assemble(backend, directory, options).await?)
}

/// Serve until Ctrl-C or SIGTERM
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    info!("Initializing state...");
    let state = build_state(&config).await?;
    let app = router(state);

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;
    info!(address = %config.bind, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Summary produced by the `check` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub entries: usize,
    pub activities: usize,
    pub directory: &'static str,
}

/// Load everything `run` would load, without serving
pub async fn check(config: &ServerConfig) -> Result<CheckReport, ServerError> {
    let state = build_state(config).await?;
    let log = state.store.list().await;
    let activities: HashSet<&str> = log.iter().map(|e| e.activity.as_str()).collect();

    Ok(CheckReport {
        entries: log.len(),
        activities: activities.len(),
        directory: match config.directory {
            DirectoryConfig::Roster { .. } => "roster",
            DirectoryConfig::Http { .. } => "http",
        },
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
