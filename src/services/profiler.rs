// src/services/profiler.rs

//! Subreddit profiling service.
//!
//! Walks a subreddit's top submissions to collect its participants, then walks
//! each participant's own history to find the other subreddits they use.

use std::collections::HashSet;

use chrono::Utc;

use crate::error::{AppError, ErrorKind, Result};
use crate::models::{
    FrequencyTable, ProfileReport, Redditor, Subreddit, SubredditTarget, TimeWindow,
};
use crate::services::RedditGateway;
use crate::utils::CancelFlag;

/// Result of visiting one participant.
#[derive(Debug)]
enum RedditorOutcome {
    /// Distinct subreddits from the participant's history
    Profiled(Vec<String>),
    /// Account was inaccessible; nothing contributed
    Skipped(AppError),
    /// Interrupt observed before the visit; the traversal ends here
    Cancelled,
}

/// Two-level traversal engine.
///
/// Holds the participants and table of the most recent [`profile`] call;
/// both are cleared whenever a new profile starts.
///
/// [`profile`]: SubredditProfiler::profile
pub struct SubredditProfiler<'a> {
    gateway: &'a dyn RedditGateway,
    cancel: CancelFlag,
    participants: Vec<Redditor>,
    table: FrequencyTable,
}

impl<'a> SubredditProfiler<'a> {
    /// Create a profiler that never gets interrupted.
    pub fn new(gateway: &'a dyn RedditGateway) -> Self {
        Self::with_cancel(gateway, CancelFlag::new())
    }

    /// Create a profiler that stops between participants once `cancel` is raised.
    pub fn with_cancel(gateway: &'a dyn RedditGateway, cancel: CancelFlag) -> Self {
        Self {
            gateway,
            cancel,
            participants: Vec::new(),
            table: FrequencyTable::new(),
        }
    }

    /// Participants found by the last profile run, in discovery order.
    pub fn participants(&self) -> &[Redditor] {
        &self.participants
    }

    /// Table built by the last profile run.
    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    fn reset(&mut self) {
        self.participants.clear();
        self.table = FrequencyTable::new();
    }

    /// Collect every distinct, non-deleted author of the subreddit's top
    /// submissions and of all comments on them.
    ///
    /// Fails with [`AppError::Cancelled`] if interrupted between submissions.
    pub async fn discover_participants(
        &self,
        subreddit: &Subreddit,
        window: TimeWindow,
    ) -> Result<Vec<Redditor>> {
        let submissions = self.gateway.top_submissions(subreddit, window).await?;
        log::debug!(
            "r/{}: {} top submissions in the last '{}'",
            subreddit,
            submissions.len(),
            window
        );

        let mut seen = HashSet::new();
        let mut participants = Vec::new();
        let mut record = |author: Option<Redditor>| {
            if let Some(redditor) = author {
                if seen.insert(redditor.name.clone()) {
                    participants.push(redditor);
                }
            }
        };

        for submission in &submissions {
            if self.cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }
            record(submission.author.clone());
            if submission.num_comments == 0 {
                continue;
            }

            let comments = self.gateway.comments(submission).await?;
            log::debug!("Submission {}: {} comments", submission.id, comments.len());
            for comment in comments {
                record(comment.author);
            }
        }

        Ok(participants)
    }

    /// Distinct subreddits a redditor posted or commented in over `window`.
    ///
    /// An absent redditor yields an empty list without touching the gateway.
    pub async fn discover_subreddits_for_redditor(
        &self,
        redditor: Option<&Redditor>,
        window: TimeWindow,
    ) -> Result<Vec<String>> {
        let Some(redditor) = redditor else {
            return Ok(Vec::new());
        };

        let submissions = self.gateway.redditor_submissions(redditor, window).await?;
        let comments = self.gateway.redditor_comments(redditor, window).await?;

        let mut seen = HashSet::new();
        let subreddits = submissions
            .into_iter()
            .map(|s| s.subreddit.display_name)
            .chain(comments.into_iter().map(|c| c.subreddit.display_name))
            .filter(|name| seen.insert(name.clone()))
            .collect();

        Ok(subreddits)
    }

    /// Profile a subreddit.
    ///
    /// Inaccessible accounts are counted and skipped. An interrupt stops the
    /// walk between participants and returns what was gathered so far with
    /// `cancelled` set. Any other error aborts the run.
    pub async fn profile(
        &mut self,
        target: impl Into<SubredditTarget>,
        subreddit_window: TimeWindow,
        redditor_window: TimeWindow,
    ) -> Result<ProfileReport> {
        self.reset();
        let start_time = Utc::now();
        let subreddit = target.into().resolve()?;

        log::info!("Loading information for r/{}...", subreddit);
        let mut cancelled = false;
        match self
            .discover_participants(&subreddit, subreddit_window)
            .await
        {
            Ok(participants) => self.participants = participants,
            Err(error) if error.kind() == ErrorKind::Cancelled => {
                log::warn!("Interrupted while collecting participants of r/{}", subreddit);
                cancelled = true;
            }
            Err(error) => return Err(error),
        }
        let total = self.participants.len();
        if !cancelled {
            log::info!(
                "Found {} redditors that used r/{} in the last '{}'",
                total,
                subreddit,
                subreddit_window
            );
        }

        let mut table = FrequencyTable::new();
        let mut profiled_count = 0;
        let mut error_count = 0;

        for (i, redditor) in self.participants.iter().enumerate() {
            match self.visit(redditor, redditor_window).await? {
                RedditorOutcome::Profiled(subreddits) => {
                    log::info!(
                        "({}/{}) Analyzing r/{}: u/{}'s account... done ({} subreddits)",
                        i + 1,
                        total,
                        subreddit,
                        redditor,
                        subreddits.len()
                    );
                    table.add_contribution(&subreddits);
                    profiled_count += 1;
                }
                RedditorOutcome::Skipped(error) => {
                    log::warn!(
                        "({}/{}) Analyzing r/{}: u/{}'s account... ERROR: {}",
                        i + 1,
                        total,
                        subreddit,
                        redditor,
                        error
                    );
                    error_count += 1;
                }
                RedditorOutcome::Cancelled => {
                    log::warn!(
                        "Interrupted before u/{} ({}/{}); keeping partial results",
                        redditor,
                        i + 1,
                        total
                    );
                    cancelled = true;
                    break;
                }
            }
        }

        self.table = table;

        Ok(ProfileReport {
            subreddit,
            subreddit_window,
            redditor_window,
            participant_count: total,
            profiled_count,
            error_count,
            cancelled,
            start_time,
            end_time: Utc::now(),
            table: self.table.clone(),
        })
    }

    async fn visit(&self, redditor: &Redditor, window: TimeWindow) -> Result<RedditorOutcome> {
        let result = if self.cancel.is_cancelled() {
            Err(AppError::Cancelled)
        } else {
            self.discover_subreddits_for_redditor(Some(redditor), window)
                .await
        };

        match result {
            Ok(subreddits) => Ok(RedditorOutcome::Profiled(subreddits)),
            Err(error) => match error.kind() {
                ErrorKind::Forbidden => Ok(RedditorOutcome::Skipped(error)),
                ErrorKind::Cancelled => Ok(RedditorOutcome::Cancelled),
                ErrorKind::Fatal => Err(error),
            },
        }
    }
}
