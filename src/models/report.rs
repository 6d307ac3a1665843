// src/models/report.rs

//! Outcome of profiling one subreddit.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{FrequencyTable, Subreddit, TimeWindow};

/// Summary counters and the resulting table for one profile run.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub subreddit: Subreddit,
    pub subreddit_window: TimeWindow,
    pub redditor_window: TimeWindow,

    /// Unique participants found in the root subreddit
    pub participant_count: usize,

    /// Participants whose history was fetched successfully
    pub profiled_count: usize,

    /// Participants skipped because their account was inaccessible
    pub error_count: usize,

    /// Whether the run was interrupted before every participant was visited
    pub cancelled: bool,

    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    pub table: FrequencyTable,
}

impl ProfileReport {
    /// Participants visited, whatever the outcome.
    pub fn processed_count(&self) -> usize {
        self.profiled_count + self.error_count
    }

    /// Distinct subreddits discovered.
    pub fn subreddit_count(&self) -> usize {
        self.table.len()
    }

    /// Log the summary block.
    pub fn log_summary(&self) {
        log::info!("Summary of findings for r/{}:", self.subreddit);
        log::info!(
            "    Successfully analyzed {}/{} unique redditors ({} errors)",
            self.profiled_count,
            self.participant_count,
            self.error_count
        );
        log::info!(
            "    Discovered {} unique subreddits used by members of r/{}",
            self.subreddit_count(),
            self.subreddit
        );
        if self.cancelled {
            log::warn!(
                "    Interrupted after {}/{} redditors; results are partial",
                self.processed_count(),
                self.participant_count
            );
        }
        log::debug!(
            "    Took {}s",
            (self.end_time - self.start_time).num_seconds()
        );
    }
}
