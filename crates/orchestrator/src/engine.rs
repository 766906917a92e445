//! The request orchestrator: single-flight guard, progress narration,
//! deadline, and the transition into a terminal state.

use common::{AnalysisRequest, AnalysisResult, ClientConfig};
use price_client::{AnalysisFailure, AnalysisTransport, GENERIC_FAILURE_MESSAGE};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::state::{OrchestratorState, ProgressLabel};
use crate::ticker::ProgressTicker;

/// Why a `submit` call was a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyInput,
    AlreadyInFlight,
}

/// Outcome of one `submit` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Ignored(IgnoreReason),
    /// The request ran to settlement; carries the terminal state.
    Settled(OrchestratorState),
}

/// Settles an accepted request as `Failed` if its `submit` future is dropped
/// before reaching a terminal state, so the guard never stays closed.
struct InFlightGuard<'a> {
    state: &'a watch::Sender<OrchestratorState>,
    armed: bool,
}

impl<'a> InFlightGuard<'a> {
    fn new(state: &'a watch::Sender<OrchestratorState>) -> Self {
        Self { state, armed: true }
    }

    fn settle(mut self, terminal: OrchestratorState) {
        self.armed = false;
        self.state.send_replace(terminal);
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Analysis abandoned before settling");
            self.state.send_replace(OrchestratorState::Failed {
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            });
        }
    }
}

/// Owns the lifecycle of one analysis request at a time.
///
/// State is published through a `watch` channel so the presentation layer
/// can render every transition without being able to mutate anything.
pub struct RequestOrchestrator<T> {
    transport: T,
    state: watch::Sender<OrchestratorState>,
    deadline: Duration,
    progress_interval: Duration,
}

impl<T: AnalysisTransport> RequestOrchestrator<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self::with_timing(
            transport,
            config.request_timeout(),
            config.progress_interval(),
        )
    }

    pub fn with_timing(transport: T, deadline: Duration, progress_interval: Duration) -> Self {
        let (state, _) = watch::channel(OrchestratorState::Idle);
        Self {
            transport,
            state,
            deadline,
            progress_interval,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> OrchestratorState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.borrow().is_in_flight()
    }

    /// Submit a description for analysis.
    ///
    /// Blank input, or a call made while another request is in flight, is
    /// ignored without touching the state. Otherwise the previous result or
    /// error is replaced by `InFlight` immediately, exactly one network call
    /// is issued, and the terminal state is returned once it settles.
    pub async fn submit(&self, text: &str) -> Submission {
        let Some(request) = AnalysisRequest::new(text) else {
            debug!("Ignoring blank submission");
            return Submission::Ignored(IgnoreReason::EmptyInput);
        };

        // Guard check and transition happen under the same channel lock.
        let accepted = self.state.send_if_modified(|state| {
            if state.is_in_flight() {
                return false;
            }
            *state = OrchestratorState::in_flight();
            true
        });
        if !accepted {
            debug!("Ignoring submission while a request is in flight");
            return Submission::Ignored(IgnoreReason::AlreadyInFlight);
        }
        let guard = InFlightGuard::new(&self.state);

        let span = info_span!("analysis", request_id = %request.request_id);
        let started = Instant::now();
        let outcome = self.run(&request).instrument(span.clone()).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let settled = span.in_scope(|| match outcome {
            Ok(result) => {
                info!(
                    elapsed_ms,
                    sources = result.sources.len(),
                    "Analysis succeeded: predicted={} market={}",
                    result.predicted_price,
                    result.market_price
                );
                OrchestratorState::Succeeded { result }
            }
            Err(failure) => {
                warn!(elapsed_ms, code = failure.code(), "Analysis failed: {}", failure);
                OrchestratorState::Failed {
                    message: failure.user_message().to_string(),
                }
            }
        });

        debug!(state = settled.kind(), "Publishing terminal state");
        guard.settle(settled.clone());
        Submission::Settled(settled)
    }

    /// Drive the network call and the progress ticker together until the
    /// call settles or the deadline passes. The ticker is local to this
    /// function, so it is dropped on every return path.
    async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisFailure> {
        info!(
            "Submitting analysis ({} chars, deadline {}s)",
            request.content.chars().count(),
            self.deadline.as_secs()
        );

        let call = tokio::time::timeout(self.deadline, self.transport.compare_price(request));
        tokio::pin!(call);
        let mut ticker = ProgressTicker::start(self.progress_interval);

        loop {
            tokio::select! {
                biased;

                settled = &mut call => {
                    return match settled {
                        Ok(outcome) => outcome,
                        Err(_elapsed) => Err(AnalysisFailure::Timeout),
                    };
                }
                label = ticker.next_label() => self.publish_label(label),
            }
        }
    }

    fn publish_label(&self, label: ProgressLabel) {
        let changed = self.state.send_if_modified(|state| match state {
            OrchestratorState::InFlight { progress_label } if *progress_label != label => {
                *progress_label = label;
                true
            }
            _ => false,
        });
        if changed {
            debug!("Progress: {}", label);
        }
    }
}
