//! Service layer for the profiler application.
//!
//! This module contains the business logic for:
//! - Platform access (`RedditGateway`, `RedditClient`)
//! - Subreddit profiling (`SubredditProfiler`)
//! - Result rendering (`CsvExporter`)

mod export;
pub(crate) mod gateway;
mod profiler;
mod reddit;

pub use export::CsvExporter;
pub use gateway::RedditGateway;
pub use profiler::SubredditProfiler;
pub use reddit::RedditClient;
