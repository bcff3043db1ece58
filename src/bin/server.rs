//! Meal cache server
//!
//! Serves the cached menus over HTTP and syncs with the upstream site on a
//! fixed interval.
//!
//! # Configuration
//!
//! Same file and `MEALCACHE_*` variables as the `mealcache` CLI. The config
//! file path can be set with `MEALCACHE_CONFIG`
//! (default: ~/.config/mealcache/config.yaml).
//!
//! The server holds `<data_dir>/mealcache.lock` while running; CLI commands
//! that write the cursor or store refuse to run until it exits.
//!
//! # Endpoints
//!
//! - `GET /`: cached meals as JSON, optionally `?since=YYYY-MM-DD|today`
//! - `GET /beautify`: the same as an HTML listing
//! - `GET /health`: health check

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mealcache::clock::{Clock, SystemClock};
use mealcache::config::Config;
use mealcache::cursor::Cursor;
use mealcache::fetch::HttpPageFetcher;
use mealcache::lock::DataLock;
use mealcache::server::{router, AppState};
use mealcache::store::MealStore;
use mealcache::sync::{run_scheduler, SyncEngine};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mealcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config_path = std::env::var("MEALCACHE_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path)?;

    tracing::info!("Data directory: {}", config.data_dir.value.display());
    if let Some(path) = &config.config_file {
        tracing::info!("Config file: {}", path.display());
    }

    // The server owns the cursor and store for as long as it runs
    let mut lock = DataLock::open(&config.data_dir.value)?;
    let _guard = lock.try_acquire()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::with_offset_hours(
        config.utc_offset_hours.value,
    ));

    let store = MealStore::open(
        config.store_path(),
        config.retention_days.value,
        Arc::clone(&clock),
    )?
    .into_inner();
    let store = Arc::new(RwLock::new(store));

    let cursor = Cursor::load(config.cursor_path(), config.initial_page.value)?.into_inner();
    let fetcher = HttpPageFetcher::new(config.fetch_config())?;
    let engine = Arc::new(SyncEngine::new(
        fetcher,
        cursor,
        Arc::clone(&store),
        config.sync_options(),
    ));

    // Both the scheduler and the HTTP server stop on ctrl-c
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(run_scheduler(
        engine,
        config.sync_interval(),
        wait_for(shutdown_rx.clone()),
    ));

    let app = router(AppState { store, clock });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port.value));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
            }
            tracing::info!("Shutting down");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    scheduler.await?;
    Ok(())
}

async fn wait_for(mut shutdown: watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            break;
        }
    }
}
