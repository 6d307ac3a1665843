// src/pipeline/profile.rs

//! Subreddit profiling pipeline.

use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::models::{Config, TimeWindow};
use crate::services::{CsvExporter, RedditGateway, SubredditProfiler};
use crate::storage::LocalStorage;
use crate::utils::CancelFlag;

/// What to profile and how to export it.
#[derive(Debug, Clone)]
pub struct ProfileRequest {
    /// Root subreddit names, profiled in order
    pub targets: Vec<String>,
    pub subreddit_window: TimeWindow,
    pub redditor_window: TimeWindow,
    pub verbose: bool,
    /// Export file name; only allowed with a single target
    pub output: Option<String>,
}

impl ProfileRequest {
    /// Build a request from configuration defaults.
    pub fn from_config(config: &Config, targets: Vec<String>) -> Self {
        Self {
            targets,
            subreddit_window: config.profile.subreddit_window(),
            redditor_window: config.profile.redditor_window(),
            verbose: config.profile.verbose,
            output: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(AppError::config("No subreddits to profile"));
        }
        if self.output.is_some() && self.targets.len() > 1 {
            return Err(AppError::config(
                "--output needs exactly one subreddit; exports are named <subreddit>.csv otherwise",
            ));
        }
        Ok(())
    }

    fn filename_for(&self, subreddit: &str) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("{subreddit}.csv"))
    }
}

/// One written export.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub subreddit: String,
    pub path: PathBuf,
    pub rows: usize,
    /// The table behind this export is partial
    pub cancelled: bool,
}

/// Profile every requested subreddit and export each table.
///
/// An interrupt ends the current subreddit early, exports what it gathered
/// (unless no redditor was analyzed yet), and skips the remaining ones.
pub async fn run_profiles(
    request: &ProfileRequest,
    gateway: &dyn RedditGateway,
    storage: &LocalStorage,
    cancel: CancelFlag,
) -> Result<Vec<ExportSummary>> {
    request.validate()?;

    let mut profiler = SubredditProfiler::with_cancel(gateway, cancel.clone());
    let exporter = if request.verbose {
        CsvExporter::verbose(gateway)
    } else {
        CsvExporter::new()
    };

    let mut exports = Vec::new();
    for (i, target) in request.targets.iter().enumerate() {
        if cancel.is_cancelled() {
            log::warn!(
                "Interrupted; skipping {} remaining subreddit(s)",
                request.targets.len() - i
            );
            break;
        }

        let report = profiler
            .profile(target.as_str(), request.subreddit_window, request.redditor_window)
            .await?;
        report.log_summary();

        if report.cancelled && report.processed_count() == 0 {
            log::warn!(
                "Interrupted before any redditor of r/{} was analyzed; nothing to export",
                report.subreddit
            );
            break;
        }

        let subreddit = report.subreddit.display_name.clone();
        let filename = request.filename_for(&subreddit);
        log::info!("Writing results to '{}'...", filename);

        let bytes = exporter.render(&report.table).await?;
        let path = storage.write_bytes(&filename, &bytes).await?;
        log::info!("Saved {} rows to {}", report.subreddit_count(), path.display());

        exports.push(ExportSummary {
            subreddit,
            path,
            rows: report.subreddit_count(),
            cancelled: report.cancelled,
        });

        if report.cancelled {
            let remaining = request.targets.len() - i - 1;
            if remaining > 0 {
                log::warn!("Interrupted; skipping {} remaining subreddit(s)", remaining);
            }
            break;
        }
    }

    Ok(exports)
}
