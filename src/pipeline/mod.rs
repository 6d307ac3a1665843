//! Pipeline entry points for profiler operations.
//!
//! - `run_profiles`: Profile subreddits and export their frequency tables

pub mod profile;

pub use profile::{ExportSummary, ProfileRequest, run_profiles};
