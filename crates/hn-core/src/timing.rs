//! Lightweight span timing.
//!
//! Timers report through `tracing` at debug level. A timer started with a
//! budget also warns when the span overruns it.

use std::time::{Duration, Instant};

/// A simple timer that measures elapsed time.
#[derive(Debug)]
pub struct Timer {
    label: &'static str,
    start: Instant,
    budget: Option<Duration>,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
            budget: None,
        }
    }

    /// Start a timer that warns when stopped after more than `budget`.
    pub fn with_budget(label: &'static str, budget: Duration) -> Self {
        Self {
            label,
            start: Instant::now(),
            budget: Some(budget),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer, log the span, and return its duration.
    pub fn stop(self) -> Duration {
        let elapsed = self.start.elapsed();
        match self.budget {
            Some(budget) if elapsed > budget => {
                tracing::warn!(
                    label = self.label,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    budget_ms = budget.as_secs_f64() * 1000.0,
                    "span exceeded its time budget"
                );
            }
            _ => {
                tracing::debug!(
                    label = self.label,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "span finished"
                );
            }
        }
        elapsed
    }
}
