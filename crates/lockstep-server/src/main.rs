//! Lockstep HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use lockstep::config::Config;
use lockstep::{CacheStore, FileStore, HttpUpstream, MemoryStore, MockUpstream, Signer, UpstreamClient};
use lockstep_server::gateway::{HandlerState, create_router_with_state};
use lockstep_server::health_check;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        service = %config.service_name,
        "Lockstep starting"
    );

    let signer = Signer::new(&config.signing_secret)?;

    let store: Arc<dyn CacheStore> = match &config.storage_path {
        Some(path) => {
            let store = FileStore::new(path.clone());
            store.ensure_root()?;
            tracing::info!(path = %path.display(), "Using file store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("No LOCKSTEP_STORAGE_PATH configured, entries are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let upstream: Arc<dyn UpstreamClient> = if config.mock_provider {
        tracing::warn!("LOCKSTEP_MOCK_PROVIDER set, serving canned responses");
        Arc::new(MockUpstream::new())
    } else {
        let api_key = config.upstream_api_key.clone().unwrap_or_default();
        let upstream = HttpUpstream::new(&config.upstream_url, api_key, config.upstream_timeout());
        tracing::info!(endpoint = %upstream.endpoint(), "Using HTTP upstream");
        Arc::new(upstream)
    };

    let state = HandlerState::new(
        store,
        upstream,
        signer,
        config.retention_days,
        config.service_name.clone(),
    );

    match config.sweep_interval() {
        Some(interval) => {
            state.sweeper.start(interval);
            tracing::info!(
                interval_secs = interval.as_secs(),
                retention_days = config.retention_days,
                "Background retention sweep enabled"
            );
        }
        None => tracing::info!("Background retention sweep disabled"),
    }

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Lockstep shutdown complete");
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or_else(|| Config::default().port);

    health_check::probe(port).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
