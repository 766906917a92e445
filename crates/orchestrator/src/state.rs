use common::AnalysisResult;
use std::fmt;

/// Cosmetic narration shown while a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressLabel {
    AiPrediction,
    SearchingWeb,
    ScrapingPrices,
    AnalyzingResults,
    AlmostDone,
}

impl ProgressLabel {
    pub const SEQUENCE: [ProgressLabel; 5] = [
        ProgressLabel::AiPrediction,
        ProgressLabel::SearchingWeb,
        ProgressLabel::ScrapingPrices,
        ProgressLabel::AnalyzingResults,
        ProgressLabel::AlmostDone,
    ];

    pub fn first() -> Self {
        ProgressLabel::AiPrediction
    }

    /// The following label; saturates at [`ProgressLabel::AlmostDone`].
    pub fn next(self) -> Self {
        match self {
            ProgressLabel::AiPrediction => ProgressLabel::SearchingWeb,
            ProgressLabel::SearchingWeb => ProgressLabel::ScrapingPrices,
            ProgressLabel::ScrapingPrices => ProgressLabel::AnalyzingResults,
            ProgressLabel::AnalyzingResults | ProgressLabel::AlmostDone => {
                ProgressLabel::AlmostDone
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProgressLabel::AiPrediction => "Getting AI prediction...",
            ProgressLabel::SearchingWeb => "Searching the web...",
            ProgressLabel::ScrapingPrices => "Scraping price data...",
            ProgressLabel::AnalyzingResults => "Analyzing results...",
            ProgressLabel::AlmostDone => "Almost done...",
        }
    }
}

impl fmt::Display for ProgressLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of the current analysis. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OrchestratorState {
    #[default]
    Idle,
    InFlight {
        progress_label: ProgressLabel,
    },
    Succeeded {
        result: AnalysisResult,
    },
    Failed {
        message: String,
    },
}

impl OrchestratorState {
    /// Fresh in-flight state with the first progress label.
    pub fn in_flight() -> Self {
        OrchestratorState::InFlight {
            progress_label: ProgressLabel::first(),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, OrchestratorState::InFlight { .. })
    }

    pub fn progress_label(&self) -> Option<ProgressLabel> {
        match self {
            OrchestratorState::InFlight { progress_label } => Some(*progress_label),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            OrchestratorState::Succeeded { result } => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            OrchestratorState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestratorState::Idle => "idle",
            OrchestratorState::InFlight { .. } => "in_flight",
            OrchestratorState::Succeeded { .. } => "succeeded",
            OrchestratorState::Failed { .. } => "failed",
        }
    }
}
