//! Gatestore - a TTL key-value store with admission control
//!
//! Serves a Redis-like HTTP API backed by an in-process map or a remote
//! Redis, with every request passing a fixed-window rate limiter first.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatestore::api::{create_router, AppState};
use gatestore::config::{BackendKind, Config};
use gatestore::limit::RateLimiter;
use gatestore::store::{MemoryBackend, RedisBackend, Store, StoreBackend};
use gatestore::tasks::spawn_sweeper_task;

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration (bad limiter config is fatal)
/// 3. Build the configured backend and the store facade
/// 4. Construct the rate limiter
/// 5. Start the background expiry sweeper
/// 6. Start the HTTP server, all routes behind the admission middleware
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Defaults to "info" level, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatestore=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gatestore");

    let config = Config::from_env();
    if let Err(e) = config.validate() {
        error!("Refusing to start: {e}");
        std::process::exit(1);
    }
    info!(
        "Configuration loaded: backend={:?}, prefix={:?}, default_ttl={}s, rate_limit={}/{}s, port={}",
        config.backend,
        config.key_prefix,
        config.default_ttl,
        config.rate_limit,
        config.rate_window_secs,
        config.server_port
    );

    let backend: Arc<dyn StoreBackend> = match config.backend {
        BackendKind::Memory => Arc::new(MemoryBackend::new()),
        BackendKind::Redis => match RedisBackend::new(&config.redis_url) {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                error!("Refusing to start: {e}");
                std::process::exit(1);
            }
        },
    };

    // Application keys live under "<prefix>cache:", limiter state under
    // "<prefix>ratelimit:". Disjoint subtrees: /clear only sweeps the
    // cache side, and no user-chosen key can name limiter state.
    let store = Store::new(
        backend.clone(),
        format!("{}cache:", config.key_prefix),
        config.default_ttl,
        Duration::from_millis(config.op_timeout_ms),
    );
    info!("Store initialized");

    // The limiter gets its own facade over the same backend: same medium,
    // its own key namespace, and its bookkeeping reads stay out of the
    // application cache statistics.
    let limiter_store = Store::new(
        backend.clone(),
        config.key_prefix.clone(),
        0,
        Duration::from_millis(config.op_timeout_ms),
    );
    let limiter = match RateLimiter::new(
        limiter_store,
        config.rate_limit,
        Duration::from_secs(config.rate_window_secs),
    ) {
        Ok(limiter) => Arc::new(limiter),
        Err(e) => {
            error!("Refusing to start: {e}");
            std::process::exit(1);
        }
    };

    let sweeper_handle = spawn_sweeper_task(backend, config.sweep_interval);
    info!("Background expiry sweeper started");

    let app = create_router(AppState::new(store), limiter);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Server listening on http://{}", addr);

    // ConnectInfo feeds the limiter's client identity fallback.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(sweeper_handle))
    .await
    .unwrap();

    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweeper.
async fn shutdown_signal(sweeper_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweeper_handle.abort();
    warn!("Sweeper task aborted");
}
