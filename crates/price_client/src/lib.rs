//! HTTP client for the price-analysis service.
//!
//! One `compare_price` call is exactly one POST. The raw
//! transport outcome is classified here, once, into [`AnalysisFailure`];
//! callers never look at reqwest errors or HTTP statuses themselves.

pub mod client;
pub mod failure;

pub use client::PriceClient;
pub use failure::{AnalysisFailure, GENERIC_FAILURE_MESSAGE, TIMEOUT_MESSAGE};

use async_trait::async_trait;
use common::{AnalysisRequest, AnalysisResult};
use std::sync::Arc;

/// The network seam used by the orchestrator.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Issue a single analysis request. Implementations must not retry.
    async fn compare_price(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalysisFailure>;
}

#[async_trait]
impl<T: AnalysisTransport + ?Sized> AnalysisTransport for Arc<T> {
    async fn compare_price(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalysisFailure> {
        (**self).compare_price(request).await
    }
}
