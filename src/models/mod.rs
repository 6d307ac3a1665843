// src/models/mod.rs

//! Domain models for the profiler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod frequency;
mod reddit;
mod report;
mod window;

// Re-export all public types
pub use config::{Config, LoggingConfig, ProfileConfig, RedditConfig};
pub use frequency::FrequencyTable;
pub use reddit::{Comment, Redditor, Submission, Subreddit, SubredditInfo, SubredditTarget};
pub use report::ProfileReport;
pub use window::TimeWindow;
