mod config;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::{Config, InspectorKind, LogFormat};
use services::{
    BrowserInspector, BrowserPool, ClipboardSink, DisabledClipboard, ExportService,
    ExtractionService, FileStore, KeyValueStore, MemoryStore, PageInspector, SecurityService,
    SnapshotRepository, StaticInspector, SystemClipboard, ViewerService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub browser_pool: Option<Arc<BrowserPool>>,
    pub extraction: Arc<ExtractionService>,
    pub viewer: Arc<ViewerService>,
    pub exporter: Arc<ExportService>,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    info!("Starting Page Debug Reporter v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded");
    info!("  Port: {}", config.api_port);
    info!("  Inspector: {:?}", config.inspector);
    info!("  Export directory: {}", config.export_dir.display());

    info!("Initializing services...");

    let (inspector, browser_pool) = match config.inspector {
        InspectorKind::Browser => {
            info!("  Browser pool size: {}", config.browser_pool_size);
            let pool = Arc::new(BrowserPool::new(config.clone()).await?);
            info!("Browser pool initialized");
            let inspector: Arc<dyn PageInspector> = Arc::new(BrowserInspector::new(pool.clone()));
            (inspector, Some(pool))
        }
        InspectorKind::Static => {
            let inspector: Arc<dyn PageInspector> = Arc::new(StaticInspector::new(&config)?);
            (inspector, None)
        }
    };

    let store: Arc<dyn KeyValueStore> = match config.store_path {
        Some(ref path) => Arc::new(FileStore::new(path.clone())),
        None => {
            warn!("STORE_PATH not set, the last report will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };
    let snapshots = Arc::new(SnapshotRepository::new(store));
    info!("Snapshot store initialized ({})", snapshots.backend());

    let clipboard: Arc<dyn ClipboardSink> = if config.copy_to_clipboard {
        Arc::new(SystemClipboard::new())
    } else {
        Arc::new(DisabledClipboard)
    };

    let extraction = Arc::new(ExtractionService::new(
        Arc::new(SecurityService::new(&config)),
        inspector,
        snapshots.clone(),
        clipboard.clone(),
        Duration::from_secs(config.inspection_timeout),
        config.copy_to_clipboard,
    ));
    info!("Extraction service initialized");

    let state = AppState {
        config: config.clone(),
        browser_pool,
        extraction,
        viewer: Arc::new(ViewerService::new(snapshots, clipboard)),
        exporter: Arc::new(ExportService::new(&config)),
    };

    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        },
        _ = terminate => {
            info!("Received terminate signal, initiating shutdown...");
        },
    }
}
