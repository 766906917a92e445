//! Wire types shared between the HTTP client and the orchestrator.
//!
//! Deserialization is lenient: optional numbers may be absent or `null`, and
//! container fields that are missing or `null` fall back to empty values
//! instead of failing the whole payload.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// One user-submitted item description.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    /// Client-side correlation id. Only used for logging, never sent.
    #[serde(skip)]
    pub request_id: Uuid,
    /// Trimmed, non-empty description.
    pub content: String,
}

impl AnalysisRequest {
    /// Build a request from raw input. Returns `None` for blank text.
    pub fn new(text: &str) -> Option<Self> {
        let content = text.trim();
        if content.is_empty() {
            return None;
        }
        Some(Self {
            request_id: Uuid::new_v4(),
            content: content.to_string(),
        })
    }
}

/// Successful response body of `POST /api/compare-price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub description: String,
    pub predicted_price: String,
    pub market_price: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub market_analysis: MarketAnalysis,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub comparison: Option<Comparison>,
}

/// Aggregate statistics over the scraped listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub average_price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_sources: u64,
}

/// One listing/page used as pricing evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    /// Quotes found at the source, in page order. Missing or `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub prices: Vec<f64>,
}

/// The service's assessment of the prediction against the market average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    pub accuracy_assessment: String,
    /// Signed difference; positive means the prediction is above the market average.
    #[serde(default)]
    pub prediction_vs_market: Option<f64>,
}

impl Comparison {
    pub const WITHIN_RANGE: &'static str = "within_range";

    pub fn is_within_range(&self) -> bool {
        self.accuracy_assessment == Self::WITHIN_RANGE
    }
}

/// Error body returned by the service on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The human-readable detail, if the service sent a non-empty string.
    pub fn message(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|d| d.as_str())
            .filter(|d| !d.trim().is_empty())
    }
}

/// Response of the health endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_blank_input() {
        assert!(AnalysisRequest::new("").is_none());
        assert!(AnalysisRequest::new("   \n\t ").is_none());
    }

    #[test]
    fn test_request_trims_content_and_skips_id_on_wire() {
        let req = AnalysisRequest::new("  Used MacBook Pro 14-inch \n").unwrap();
        assert_eq!(req.content, "Used MacBook Pro 14-inch");

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, serde_json::json!({ "content": "Used MacBook Pro 14-inch" }));
    }

    #[test]
    fn test_result_tolerates_nulls_and_missing_parts() {
        let raw = r#"{
            "description": "No market pricing data was found online.",
            "predicted_price": "$120.00",
            "market_price": "No market data found",
            "market_analysis": {
                "average_price": null,
                "min_price": null,
                "max_price": null,
                "total_sources": 0
            },
            "sources": [
                {"url": "http://a", "title": null},
                {"url": "http://b", "title": "B", "prices": null},
                {"url": "http://c", "title": "C", "prices": []}
            ],
            "comparison": null
        }"#;
        let result: AnalysisResult = serde_json::from_str(raw).unwrap();

        assert_eq!(result.market_analysis, MarketAnalysis::default());
        assert_eq!(result.sources.len(), 3);
        assert!(result.sources.iter().all(|s| s.prices.is_empty()));
        assert!(result.sources[0].title.is_none());
        assert!(result.comparison.is_none());
    }

    #[test]
    fn test_result_without_optional_blocks() {
        let raw = r#"{"description": "d", "predicted_price": "$1", "market_price": "$2"}"#;
        let result: AnalysisResult = serde_json::from_str(raw).unwrap();
        assert!(result.sources.is_empty());
        assert_eq!(result.market_analysis.total_sources, 0);
    }

    #[test]
    fn test_result_missing_required_string_is_rejected() {
        let raw = r#"{"predicted_price": "$1", "market_price": "$2"}"#;
        assert!(serde_json::from_str::<AnalysisResult>(raw).is_err());
    }

    #[test]
    fn test_source_without_url_is_rejected() {
        let raw = r#"{
            "description": "d",
            "predicted_price": "$1",
            "market_price": "$2",
            "sources": [{"title": "No link", "prices": [10]}]
        }"#;
        assert!(serde_json::from_str::<AnalysisResult>(raw).is_err());
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "rate limited"}"#).unwrap();
        assert_eq!(body.message(), Some("rate limited"));

        let body: ErrorBody = serde_json::from_str(r#"{"detail": ""}"#).unwrap();
        assert_eq!(body.message(), None);

        // FastAPI validation errors carry a list, not a sentence.
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#)
                .unwrap();
        assert_eq!(body.message(), None);

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.message(), None);
    }

    #[test]
    fn test_comparison_within_range() {
        let c = Comparison {
            accuracy_assessment: "within_range".into(),
            prediction_vs_market: Some(10.0),
        };
        assert!(c.is_within_range());

        let c = Comparison {
            accuracy_assessment: "outside_range".into(),
            prediction_vs_market: None,
        };
        assert!(!c.is_within_range());
    }
}
