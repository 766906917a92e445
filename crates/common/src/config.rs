//! Client configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the analysis service (scheme + host + optional port).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the price comparison endpoint.
    #[serde(default = "default_compare_path")]
    pub compare_path: String,

    /// Path of the service health endpoint.
    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Hard deadline for one analysis request, measured from issuance.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Interval between progress label advances.
    #[serde(default = "default_progress_interval")]
    pub progress_interval_ms: u64,

    /// Deadline for the health probe.
    #[serde(default = "default_health_timeout")]
    pub health_timeout_ms: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ClientConfig {
    /// Full URL of the comparison endpoint.
    pub fn compare_url(&self) -> String {
        join_url(&self.base_url, &self.compare_path)
    }

    /// Full URL of the health endpoint.
    pub fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim().trim_start_matches('/')
    )
}

// ── Defaults ──────────────────────────────────────────────────────────

/// Origin of the dev proxy that serves the `/api` routes.
fn default_base_url() -> String {
    "http://127.0.0.1:5173".into()
}
fn default_compare_path() -> String {
    "/api/compare-price".into()
}
fn default_health_path() -> String {
    "/api/health".into()
}

fn default_request_timeout() -> u64 {
    180_000
}
fn default_progress_interval() -> u64 {
    15_000
}
fn default_health_timeout() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    concat!("price-predictor/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            compare_path: default_compare_path(),
            health_path: default_health_path(),
            request_timeout_ms: default_request_timeout(),
            progress_interval_ms: default_progress_interval(),
            health_timeout_ms: default_health_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.compare_url(), "http://127.0.0.1:5173/api/compare-price");
        assert_eq!(cfg.health_url(), "http://127.0.0.1:5173/api/health");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(180));
        assert_eq!(cfg.progress_interval(), Duration::from_secs(15));
    }

    #[test]
    fn test_join_url_normalizes_slashes() {
        let cfg = ClientConfig {
            base_url: "https://prices.example.com/".into(),
            health_path: "health".into(),
            ..ClientConfig::default()
        };
        assert_eq!(cfg.health_url(), "https://prices.example.com/health");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://localhost:3000"}"#).unwrap();
        assert_eq!(cfg.base_url, "http://localhost:3000");
        assert_eq!(cfg.compare_path, "/api/compare-price");
        assert_eq!(cfg.request_timeout_ms, 180_000);
    }
}
