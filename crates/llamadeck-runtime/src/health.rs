//! HTTP readiness probe for llama-server.
//!
//! llama-server answers `GET /health` with 503 while the model is loading and
//! 200 once it can serve requests.

use std::time::Duration;

use async_trait::async_trait;
use llamadeck_core::ports::{ProbeOutcome, ReadinessProbe};
use reqwest::{Client, StatusCode};
use tracing::debug;

/// Probes `http://<address>/health`.
#[derive(Debug, Clone, Default)]
pub struct HttpReadinessProbe {
    client: Client,
}

impl HttpReadinessProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL of the health endpoint for a bound address.
    ///
    /// A wildcard bind is probed over loopback.
    pub fn health_url(address: &str) -> String {
        let address = address
            .strip_prefix("0.0.0.0:")
            .map_or_else(|| address.to_string(), |port| format!("127.0.0.1:{port}"));
        format!("http://{address}/health")
    }
}

#[async_trait]
impl ReadinessProbe for HttpReadinessProbe {
    async fn probe(&self, address: &str, timeout: Duration) -> ProbeOutcome {
        let url = Self::health_url(address);

        match self.client.get(&url).timeout(timeout).send().await {
            Ok(response) => match response.status() {
                StatusCode::OK => ProbeOutcome::Ready,
                StatusCode::SERVICE_UNAVAILABLE => ProbeOutcome::not_ready("loading model"),
                status => {
                    debug!(%url, %status, "Health check returned unexpected status");
                    ProbeOutcome::not_ready(format!("unexpected status {status}"))
                }
            },
            Err(e) => {
                let reason = if e.is_timeout() {
                    "Health check timeout".to_string()
                } else if e.is_connect() {
                    "Connection refused".to_string()
                } else {
                    format!("Request failed: {e}")
                };
                debug!(%url, %reason, "Health check failed");
                ProbeOutcome::NotReady { reason }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_url_for_loopback() {
        assert_eq!(
            HttpReadinessProbe::health_url("127.0.0.1:8080"),
            "http://127.0.0.1:8080/health"
        );
    }

    #[test]
    fn wildcard_bind_probed_on_loopback() {
        assert_eq!(
            HttpReadinessProbe::health_url("0.0.0.0:9000"),
            "http://127.0.0.1:9000/health"
        );
    }

    #[tokio::test]
    async fn closed_port_is_not_ready() {
        // Bind then drop to get a port nobody listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let outcome = HttpReadinessProbe::new()
            .probe(&format!("127.0.0.1:{port}"), Duration::from_millis(500))
            .await;
        assert!(!outcome.is_ready());
    }
}
