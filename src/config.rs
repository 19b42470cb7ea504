// src/config.rs
// =============================================================================
// Runtime settings, assembled from the parsed command line.
// =============================================================================

use std::time::Duration;

use crate::cli::BudgetArgs;

pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Budget for one whole page analysis (fetch + probes).
    pub page_budget: Duration,
    /// Per-request timeout for the page fetch.
    pub fetch_timeout: Duration,
    /// Per-request timeout for each link probe, never above `page_budget`.
    pub probe_timeout: Duration,
    /// Events buffered per progress subscriber.
    pub subscriber_buffer: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_budget: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(10),
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
        }
    }
}

impl Settings {
    pub fn from_budget(budget: &BudgetArgs) -> Self {
        let page_budget = Duration::from_secs(budget.timeout_secs.max(1));
        Self {
            page_budget,
            fetch_timeout: Duration::from_secs(budget.fetch_timeout_secs.max(1)),
            probe_timeout: Duration::from_secs(budget.probe_timeout_secs.max(1)).min(page_budget),
            ..Self::default()
        }
    }

    pub fn with_subscriber_buffer(mut self, capacity: usize) -> Self {
        self.subscriber_buffer = capacity.max(1);
        self
    }
}
