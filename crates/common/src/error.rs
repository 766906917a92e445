//! Unified error type for the price-predictor client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Config error: {0}")]
    Config(String),
}
