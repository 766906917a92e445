//! Scoped progress-label timer.
//!
//! The ticker only lives as long as its owner. Dropping it drops the
//! underlying `Interval`, so no label can be produced after the owning
//! request has settled.

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::state::ProgressLabel;

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct ProgressTicker {
    interval: Interval,
    label: ProgressLabel,
}

impl ProgressTicker {
    /// Start ticking; the first advance happens one full `period` from now.
    pub fn start(period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let mut interval = time::interval_at(Instant::now() + period, period);
        // Late ticks are not bursted; narration just slows down.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            interval,
            label: ProgressLabel::first(),
        }
    }

    /// Wait for the next tick and return the advanced label.
    ///
    /// Cancel safe: usable as a `tokio::select!` branch.
    pub async fn next_label(&mut self) -> ProgressLabel {
        self.interval.tick().await;
        self.label = self.label.next();
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_advance_after_one_period() {
        let started = Instant::now();
        let mut ticker = ProgressTicker::start(Duration::from_secs(15));

        let label = ticker.next_label().await;
        assert_eq!(label, ProgressLabel::SearchingWeb);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(15) && elapsed < Duration::from_secs(16));
    }

    #[tokio::test(start_paused = true)]
    async fn test_holds_on_last_label() {
        let mut ticker = ProgressTicker::start(Duration::from_secs(15));
        let mut labels = Vec::new();
        for _ in 0..8 {
            labels.push(ticker.next_label().await);
        }

        assert_eq!(&labels[..4], &ProgressLabel::SEQUENCE[1..]);
        assert!(labels[4..].iter().all(|l| *l == ProgressLabel::AlmostDone));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_does_not_panic() {
        let mut ticker = ProgressTicker::start(Duration::ZERO);
        assert_eq!(ticker.next_label().await, ProgressLabel::SearchingWeb);
    }
}
