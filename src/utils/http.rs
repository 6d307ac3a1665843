// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::StatusCode;

use crate::error::{AppError, Result};
use crate::models::RedditConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &RedditConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Map a response status to the error taxonomy.
///
/// `resource` names what was requested, e.g. `u/alice`.
pub fn check_status(status: StatusCode, resource: &str, url: &str) -> Result<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::FORBIDDEN => Err(AppError::forbidden(resource)),
        StatusCode::NOT_FOUND => Err(AppError::not_found(resource)),
        s => Err(AppError::api(s.as_u16(), url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status_mapping() {
        assert!(check_status(StatusCode::OK, "r/x", "u").is_ok());
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, "u/x", "u"),
            Err(AppError::Forbidden(r)) if r == "u/x"
        ));
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, "u/x", "u"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS, "u/x", "https://x"),
            Err(AppError::Api { status: 429, .. })
        ));
    }

    #[test]
    fn test_create_client() {
        assert!(create_async_client(&RedditConfig::default()).is_ok());
    }
}
