//! picsort-ts (Triage Server) - Main entry point
//!
//! Single-operator image triage service: serves images from the input
//! folder, suggests categories via the bundled classifier, queues
//! reversible move decisions, and applies them in batches with
//! incremental retraining on commit.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use picsort_common::config::resolve_root_folder;
use picsort_common::db::{get_port, get_session_timeout_seconds, init_database};
use picsort_ts::classify::CentroidClassifier;
use picsort_ts::engine::{HashLedger, TriageEngine};
use picsort_ts::storage::FsStorage;
use picsort_ts::{build_router, AppState};

/// Command-line arguments for picsort-ts
#[derive(Parser, Debug)]
#[command(name = "picsort-ts")]
#[command(about = "Image triage server for picsort")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the database setting)
    #[arg(short, long, env = "PICSORT_TS_PORT")]
    port: Option<u16>,

    /// Working folder containing the input and category directories
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "picsort_ts=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Picsort Triage Server v{}", env!("CARGO_PKG_VERSION"));

    // Parse command-line arguments
    let args = Args::parse();

    let cli_root = args.root_folder.as_ref().map(|p| p.to_string_lossy().into_owned());
    let root_folder = resolve_root_folder(cli_root.as_deref(), "PICSORT_ROOT_FOLDER")
        .context("Failed to resolve root folder")?;
    info!("Root folder: {}", root_folder.display());

    let db_path = root_folder.join("picsort.db");
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let session_timeout = Duration::from_secs(
        get_session_timeout_seconds(&pool)
            .await
            .context("Failed to read session timeout")?,
    );
    let port = match args.port {
        Some(port) => port,
        None => get_port(&pool).await.context("Failed to read port")?,
    };

    // Assemble the engine: filesystem storage (creates the input folder
    // on first run), bundled classifier, durable hash ledger
    let storage = FsStorage::new(&root_folder).context("Failed to open working folder")?;
    let classifier = CentroidClassifier::new();
    let ledger = HashLedger::new(pool);
    let engine = TriageEngine::new(
        Box::new(storage),
        Box::new(classifier),
        ledger,
        session_timeout,
    );

    let state = AppState::new(engine);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("picsort-ts listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
