//! Fetch gateway abstraction over the platform API.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Comment, Redditor, Submission, Subreddit, SubredditInfo, TimeWindow};

/// Read-only access to the platform.
///
/// Implementations report private or suspended accounts as
/// [`AppError::Forbidden`](crate::error::AppError::Forbidden), distinct from
/// transport failures.
#[async_trait]
pub trait RedditGateway: Send + Sync {
    /// Top submissions of a subreddit over `window`.
    async fn top_submissions(
        &self,
        subreddit: &Subreddit,
        window: TimeWindow,
    ) -> Result<Vec<Submission>>;

    /// Every comment on a submission, with all "load more" placeholders expanded.
    ///
    /// Order is unspecified.
    async fn comments(&self, submission: &Submission) -> Result<Vec<Comment>>;

    /// A redditor's own top submissions over `window`.
    async fn redditor_submissions(
        &self,
        redditor: &Redditor,
        window: TimeWindow,
    ) -> Result<Vec<Submission>>;

    /// A redditor's own top comments over `window`.
    async fn redditor_comments(
        &self,
        redditor: &Redditor,
        window: TimeWindow,
    ) -> Result<Vec<Comment>>;

    /// NSFW flag and subscriber count for a subreddit.
    async fn subreddit_info(&self, name: &str) -> Result<SubredditInfo>;
}
