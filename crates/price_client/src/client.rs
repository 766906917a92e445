//! reqwest-backed implementation of [`AnalysisTransport`].

use async_trait::async_trait;
use common::{AnalysisRequest, AnalysisResult, ClientConfig, Error, HealthStatus};
use std::error::Error as StdError;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::failure::{classify_response, AnalysisFailure};
use crate::AnalysisTransport;

fn format_reqwest_error(err: &reqwest::Error) -> String {
    // reqwest's top-level message hides the underlying cause; append each
    // distinct source in the chain.
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

fn classify_send_error(err: &reqwest::Error) -> AnalysisFailure {
    if err.is_timeout() {
        AnalysisFailure::Timeout
    } else {
        AnalysisFailure::unknown(format_reqwest_error(err))
    }
}

/// Async client for the price-analysis service.
#[derive(Debug, Clone)]
pub struct PriceClient {
    client: reqwest::Client,
    compare_url: String,
    health_url: String,
    health_timeout: Duration,
}

impl PriceClient {
    pub fn new(config: &ClientConfig) -> common::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(2)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            compare_url: config.compare_url(),
            health_url: config.health_url(),
            health_timeout: config.health_timeout(),
        })
    }

    pub fn compare_url(&self) -> &str {
        &self.compare_url
    }

    /// Probe the service health endpoint.
    pub async fn health(&self) -> common::Result<HealthStatus> {
        debug!("GET {}", self.health_url);

        let resp = self
            .client
            .get(&self.health_url)
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http(format!(
                "health check returned {} from {}",
                status.as_u16(),
                self.health_url
            )));
        }

        resp.json::<HealthStatus>()
            .await
            .map_err(|e| Error::Http(format!("health response parse error: {}", e)))
    }
}

#[async_trait]
impl AnalysisTransport for PriceClient {
    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    async fn compare_price(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalysisFailure> {
        debug!(
            "POST {} ({} chars of description)",
            self.compare_url,
            request.content.chars().count()
        );

        let resp = self
            .client
            .post(&self.compare_url)
            .json(request)
            .send()
            .await
            .map_err(|e| classify_send_error(&e))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| classify_send_error(&e))?;
        debug!("compare-price answered status={} bytes={}", status, body.len());

        classify_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_resolves_urls_from_config() {
        let cfg = ClientConfig {
            base_url: "http://localhost:5173/".into(),
            ..ClientConfig::default()
        };
        let client = PriceClient::new(&cfg).expect("client should build");
        assert_eq!(client.compare_url(), "http://localhost:5173/api/compare-price");
        assert_eq!(client.health_url, "http://localhost:5173/api/health");
    }

    #[tokio::test]
    async fn test_client_timeout_is_classified_as_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let cfg = ClientConfig {
            base_url: format!("http://{}", addr),
            request_timeout_ms: 200,
            ..ClientConfig::default()
        };
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(cfg.request_timeout())
            .build()
            .unwrap();
        let client = PriceClient {
            client: http,
            compare_url: cfg.compare_url(),
            health_url: cfg.health_url(),
            health_timeout: cfg.health_timeout(),
        };

        let request = AnalysisRequest::new("Trek Domane SL5, size 56").unwrap();
        let failure = client.compare_price(&request).await.unwrap_err();
        assert_eq!(failure, AnalysisFailure::Timeout);

        server.abort();
    }
}
