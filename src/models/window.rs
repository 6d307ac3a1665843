// src/models/window.rs

//! Lookback windows for "top" listings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// How far back a "top" listing looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeWindow {
    /// Every accepted window, shortest first.
    pub const ALL: [TimeWindow; 6] = [
        TimeWindow::Hour,
        TimeWindow::Day,
        TimeWindow::Week,
        TimeWindow::Month,
        TimeWindow::Year,
        TimeWindow::All,
    ];

    /// Default lookback for the root subreddit.
    pub const SUBREDDIT_DEFAULT: TimeWindow = TimeWindow::Week;

    /// Default lookback for each redditor's own history.
    pub const REDDITOR_DEFAULT: TimeWindow = TimeWindow::Year;

    /// Label used by the platform's `t=` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Hour => "hour",
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        }
    }

    /// Validate a raw label, falling back to `default` for anything unknown.
    pub fn coerce(label: &str, default: TimeWindow) -> TimeWindow {
        match label.parse() {
            Ok(window) => window,
            Err(_) => {
                log::warn!(
                    "Unknown time window '{}', using '{}' instead",
                    label,
                    default
                );
                default
            }
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = AppError;

    // Labels are matched exactly, as the platform does.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeWindow::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("invalid time window '{s}'")))
    }
}
