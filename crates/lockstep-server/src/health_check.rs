//! `--health-check` probe used by container runtimes.

use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Hits `GET /health` on `127.0.0.1:port`. Returns the process exit code:
/// 0 when the server answers 2xx, 1 otherwise.
///
/// Must be awaited on an existing runtime.
pub async fn probe(port: u16) -> i32 {
    let url = format!("http://127.0.0.1:{}/health", port);

    let Ok(client) = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}
