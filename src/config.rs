//! Configuration loader: merges .env, an optional config.toml and env vars.

use common::{ClientConfig, Error};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn validate_config(config: &ClientConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    let base = config.base_url.trim();
    if base.is_empty() {
        issues.push("base_url must not be empty".into());
    } else if !(base.starts_with("http://") || base.starts_with("https://")) {
        issues.push("base_url must start with http:// or https://".into());
    }
    if !config.compare_path.starts_with('/') {
        issues.push("compare_path must start with '/'".into());
    }
    if !config.health_path.starts_with('/') {
        issues.push("health_path must start with '/'".into());
    }

    if config.request_timeout_ms == 0 {
        issues.push("request_timeout_ms must be > 0".into());
    }
    if config.progress_interval_ms == 0 {
        issues.push("progress_interval_ms must be > 0".into());
    }
    if config.health_timeout_ms == 0 {
        issues.push("health_timeout_ms must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply `PRICE_*` overrides. `lookup` stands in for `std::env::var`.
fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("PRICE_API_BASE_URL").and_then(non_empty) {
        tracing::info!("Using PRICE_API_BASE_URL override: {}", url);
        config.base_url = url;
    }
    if let Some(path) = lookup("PRICE_COMPARE_PATH").and_then(non_empty) {
        config.compare_path = path;
    }
    if let Some(path) = lookup("PRICE_HEALTH_PATH").and_then(non_empty) {
        config.health_path = path;
    }
    if let Some(raw) = lookup("PRICE_REQUEST_TIMEOUT_MS") {
        config.request_timeout_ms = parse_positive_u64(&raw, "PRICE_REQUEST_TIMEOUT_MS")?;
    }
    if let Some(raw) = lookup("PRICE_PROGRESS_INTERVAL_MS") {
        config.progress_interval_ms = parse_positive_u64(&raw, "PRICE_PROGRESS_INTERVAL_MS")?;
    }
    if let Some(raw) = lookup("PRICE_HEALTH_TIMEOUT_MS") {
        config.health_timeout_ms = parse_positive_u64(&raw, "PRICE_HEALTH_TIMEOUT_MS")?;
    }
    Ok(())
}

/// Load client configuration.
///
/// `path` names a config file that must exist; without it, `config.toml` in
/// the working directory is used when present.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, Error> {
    // 1. Load .env file from the working directory or its parents.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = ClientConfig::default();

    // 3. Config file, if any.
    let (config_path, required) = match path {
        Some(p) => (p, true),
        None => (Path::new(DEFAULT_CONFIG_PATH), false),
    };
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;
        config = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;
    } else if required {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            config_path.display()
        )));
    }

    // 4. Environment variables (highest priority).
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate_config(&config)?;

    Ok(config)
}
