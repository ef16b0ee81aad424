// In app/src/heartbeat.rs

use anyhow::{Context, Result};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Periodically POSTs to a dashboard's `/api/ping` endpoint so that its ping
/// log shows the host is alive.
pub struct Heartbeat {
    http_client: reqwest::Client,
    endpoint: String,
    interval: Duration,
}

impl Heartbeat {
    pub fn new(server_url: &str, interval: Duration) -> Result<Self> {
        let server_url = server_url.trim().trim_end_matches('/');
        if server_url.is_empty() {
            anyhow::bail!("A server URL is required to send pings.");
        }
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build the HTTP client")?;

        Ok(Self {
            http_client,
            endpoint: format!("{server_url}/api/ping"),
            interval,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a single ping and returns the server's message.
    pub async fn send(&self) -> Result<String> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.endpoint))?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        Ok(body["message"].as_str().unwrap_or_default().to_string())
    }

    /// Pings immediately and then once per interval until Ctrl-C.
    /// Failed pings are logged and never stop the loop.
    pub async fn run(&self) -> Result<()> {
        self.run_until(tokio::signal::ctrl_c()).await
    }

    /// Runs the ping loop until `shutdown` completes, including while a ping
    /// is in flight.
    pub async fn run_until<F: Future>(&self, shutdown: F) -> Result<()> {
        tracing::info!(endpoint = %self.endpoint, interval = ?self.interval, "Starting heartbeat.");
        let mut ticker = tokio::time::interval(self.interval);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => break,
            }
            tokio::select! {
                result = self.send() => match result {
                    Ok(message) => tracing::info!(%message, "Ping sent."),
                    Err(e) => tracing::warn!(error = ?e, "Ping failed."),
                },
                _ = &mut shutdown => break,
            }
        }

        tracing::info!("Heartbeat stopped.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::SeriesBuilder;
    use app_config::DataSettings;
    use core_types::Mode;
    use result_store::PingLog;
    use std::sync::Arc;
    use web_server::{create_router, AppState};

    #[test]
    fn builds_the_ping_endpoint() {
        let heartbeat = Heartbeat::new("http://localhost:3000/", Duration::from_secs(60)).unwrap();
        assert_eq!(heartbeat.endpoint(), "http://localhost:3000/api/ping");
        assert!(Heartbeat::new("  ", Duration::from_secs(60)).is_err());
    }

    #[tokio::test]
    async fn pings_a_running_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let ping_log = PingLog::new(dir.path().join("ping.txt"), 100);
        let router = create_router(AppState {
            data: Arc::new(DataSettings {
                backtest_dir: dir.path().join("data"),
                live_dir: dir.path().join("live"),
                default_mode: Mode::Backtest,
            }),
            series_builder: SeriesBuilder::default(),
            ping_log: ping_log.clone(),
            ping_utc_offset_minutes: 0,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });

        let heartbeat = Heartbeat::new(&format!("http://{address}"), Duration::from_secs(60)).unwrap();
        let message = heartbeat.send().await.unwrap();

        assert_eq!(message, "Ping logged successfully");
        assert_eq!(ping_log.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stops_while_a_ping_is_in_flight() {
        // Accepts connections into the backlog but never answers them.
        let silent = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = silent.local_addr().unwrap();
        let heartbeat = Heartbeat::new(&format!("http://{address}"), Duration::from_secs(60)).unwrap();

        let stopped = tokio::time::timeout(
            Duration::from_secs(5),
            heartbeat.run_until(tokio::time::sleep(Duration::from_millis(200))),
        )
        .await;

        assert!(matches!(stopped, Ok(Ok(()))));
        drop(silent);
    }

    #[tokio::test]
    async fn unreachable_servers_are_reported_as_errors() {
        let heartbeat = Heartbeat::new("http://127.0.0.1:9", Duration::from_secs(60)).unwrap();
        assert!(heartbeat.send().await.is_err());
    }
}
