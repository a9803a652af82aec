//! Test server harness.

use lockstep::{CacheStore, FileStore, MemoryStore, MockUpstream, Signer, UpstreamClient};
use lockstep_server::gateway::{HandlerState, create_router_with_state};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;
pub const TEST_SECRET: &str = "harness-secret";

pub struct TestServerConfig {
    /// Defaults to [`MockUpstream`].
    pub upstream: Option<Arc<dyn UpstreamClient>>,
    /// Use a file store in a temp dir instead of memory.
    pub file_store: bool,
    pub retention_days: u64,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            upstream: None,
            file_store: false,
            retention_days: 90,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<dyn CacheStore>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: Option<TempDir>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server on an ephemeral port with no external dependencies.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let (store, _temp_dir): (Arc<dyn CacheStore>, Option<TempDir>) = if config.file_store {
        let temp_dir =
            TempDir::new().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
        (Arc::new(FileStore::new(temp_dir.path())), Some(temp_dir))
    } else {
        (Arc::new(MemoryStore::new()), None)
    };

    let upstream: Arc<dyn UpstreamClient> = match config.upstream {
        Some(upstream) => upstream,
        None => Arc::new(MockUpstream::new()),
    };
    let signer =
        Signer::new(TEST_SECRET).map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let state = HandlerState::new(
        Arc::clone(&store),
        upstream,
        signer,
        config.retention_days,
        "lockstep-harness",
    );
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        store,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir,
    })
}
