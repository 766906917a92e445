//! Failure taxonomy for one analysis call.

use common::{AnalysisResult, ErrorBody};
use thiserror::Error;

pub const TIMEOUT_MESSAGE: &str =
    "Request timed out. The analysis is taking longer than expected. Please try again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to get price prediction";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisFailure {
    /// The client deadline elapsed before the service answered.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a structured `detail` message.
    #[error("service error (status={status}): {detail}")]
    Service { status: u16, detail: String },

    /// Network failure, malformed body, or an error without a usable detail.
    #[error("analysis failed: {cause}")]
    Unknown { cause: String },
}

impl AnalysisFailure {
    pub fn unknown(cause: impl Into<String>) -> Self {
        Self::Unknown {
            cause: cause.into(),
        }
    }

    /// The message shown to the user for this failure.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Timeout => TIMEOUT_MESSAGE,
            Self::Service { detail, .. } => detail,
            Self::Unknown { .. } => GENERIC_FAILURE_MESSAGE,
        }
    }

    /// Short stable code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout => "ANALYSIS_TIMEOUT",
            Self::Service { .. } => "ANALYSIS_SERVICE_ERROR",
            Self::Unknown { .. } => "ANALYSIS_UNKNOWN_ERROR",
        }
    }
}

/// Classify a settled HTTP exchange (status + raw body).
pub fn classify_response(status: u16, body: &str) -> Result<AnalysisResult, AnalysisFailure> {
    if !(200..300).contains(&status) {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message().map(ToString::to_string));

        return Err(match detail {
            Some(detail) => AnalysisFailure::Service { status, detail },
            None => AnalysisFailure::unknown(format!(
                "HTTP {} without detail: {}",
                status,
                summarize_body(body)
            )),
        });
    }

    serde_json::from_str::<AnalysisResult>(body).map_err(|e| {
        AnalysisFailure::unknown(format!(
            "malformed response body ({}): {}",
            e,
            summarize_body(body)
        ))
    })
}

fn summarize_body(raw: &str) -> String {
    const MAX_CHARS: usize = 300;
    let compact = raw.replace(['\n', '\r'], " ");
    if compact.chars().count() > MAX_CHARS {
        let cut: String = compact.chars().take(MAX_CHARS).collect();
        format!("{}…", cut)
    } else {
        compact
    }
}
