//! Utility functions and helpers.

pub mod cancel;
pub mod http;

pub use cancel::CancelFlag;

/// Strip every path separator so a filename cannot leave its directory.
pub fn sanitize_filename(filename: &str) -> String {
    filename.chars().filter(|c| !matches!(c, '/' | '\\')).collect()
}
