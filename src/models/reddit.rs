// src/models/reddit.rs

//! Subreddit, redditor, submission and comment data structures.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Author name the platform reports for deleted content.
const DELETED_AUTHOR: &str = "[deleted]";

/// A subreddit, identified by its display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subreddit {
    pub display_name: String,
}

impl Subreddit {
    /// Resolve a plain name (with or without an `r/` prefix) to a subreddit.
    pub fn from_name(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        let bare = trimmed
            .strip_prefix("/r/")
            .or_else(|| trimmed.strip_prefix("r/"))
            .unwrap_or(trimmed);

        if !name_pattern().is_match(bare) {
            return Err(AppError::validation(format!(
                "'{name}' is not a valid subreddit name"
            )));
        }

        Ok(Self {
            display_name: bare.to_string(),
        })
    }
}

impl fmt::Display for Subreddit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_]{1,20}$").unwrap())
}

/// Something that can be profiled: a plain name or an already resolved handle.
#[derive(Debug, Clone)]
pub enum SubredditTarget {
    Name(String),
    Handle(Subreddit),
}

impl SubredditTarget {
    /// Resolve to a subreddit handle.
    pub fn resolve(self) -> Result<Subreddit> {
        match self {
            SubredditTarget::Name(name) => Subreddit::from_name(&name),
            SubredditTarget::Handle(subreddit) => Ok(subreddit),
        }
    }
}

impl From<&str> for SubredditTarget {
    fn from(name: &str) -> Self {
        SubredditTarget::Name(name.to_string())
    }
}

impl From<String> for SubredditTarget {
    fn from(name: String) -> Self {
        SubredditTarget::Name(name)
    }
}

impl From<Subreddit> for SubredditTarget {
    fn from(subreddit: Subreddit) -> Self {
        SubredditTarget::Handle(subreddit)
    }
}

/// A platform account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Redditor {
    pub name: String,
}

impl Redditor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Map a raw author field to a redditor, dropping deleted or missing authors.
    pub fn from_author(author: Option<&str>) -> Option<Self> {
        match author.map(str::trim) {
            None | Some("") | Some(DELETED_AUTHOR) => None,
            Some(name) => Some(Self::new(name)),
        }
    }
}

impl fmt::Display for Redditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A post in a subreddit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Base-36 id without the `t3_` prefix
    pub id: String,

    /// Owning subreddit
    pub subreddit: Subreddit,

    /// Author, absent for deleted posts
    pub author: Option<Redditor>,

    /// Comment count as reported by the listing
    #[serde(default)]
    pub num_comments: u64,
}

/// A comment on a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Base-36 id without the `t1_` prefix
    pub id: String,

    /// Owning subreddit
    pub subreddit: Subreddit,

    /// Author, absent for deleted comments
    pub author: Option<Redditor>,
}

/// Metadata shown in verbose exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubredditInfo {
    pub over18: bool,
    pub subscribers: u64,
}
