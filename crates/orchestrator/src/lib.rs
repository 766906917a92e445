//! Request orchestration for one price analysis at a time.
//!
//! [`RequestOrchestrator`] owns the single [`OrchestratorState`] and is the
//! only thing that mutates it. The [`view`] module turns a state snapshot
//! into display values; it holds no state of its own.

pub mod engine;
pub mod state;
pub mod ticker;
pub mod view;

pub use engine::{IgnoreReason, RequestOrchestrator, Submission};
pub use state::{OrchestratorState, ProgressLabel};
pub use ticker::ProgressTicker;
