// src/services/reddit/things.rs

//! Wire format of the platform's JSON API.
//!
//! Every object arrives wrapped as `{"kind": ..., "data": ...}`. Listings
//! carry an `after` cursor; comments nest their replies as another listing
//! (or an empty string), and truncated branches show up as `more` objects.

use std::collections::{HashSet, VecDeque};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Comment, Redditor, Submission, Subreddit, SubredditInfo};

/// A `{"kind", "data"}` envelope with its payload left undecoded.
#[derive(Debug, Clone, Deserialize)]
pub struct Thing {
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct LinkData {
    id: String,
    subreddit: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    num_comments: u64,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    id: String,
    subreddit: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    replies: Value,
}

/// A "load more comments" placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoreData {
    /// Fullname of the comment (or submission) the hidden replies belong to
    pub parent_id: String,
    /// Ids to expand; empty for a "continue this thread" link
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AboutData {
    #[serde(default)]
    over18: bool,
    #[serde(default)]
    subscribers: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenJson {
    #[serde(default)]
    errors: Vec<Value>,
    #[serde(default)]
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_lifetime")]
    pub expires_in: u64,
}

fn default_token_lifetime() -> u64 {
    3600
}

fn decode<T: DeserializeOwned>(value: Value, context: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| AppError::parse(context, e))
}

impl Thing {
    /// Decode a `t3` thing.
    pub fn into_submission(self) -> Result<Submission> {
        expect_kind(&self, "t3")?;
        let data: LinkData = decode(self.data, "submission")?;
        Ok(Submission {
            id: data.id,
            subreddit: Subreddit {
                display_name: data.subreddit,
            },
            author: Redditor::from_author(data.author.as_deref()),
            num_comments: data.num_comments,
        })
    }

    /// Decode a `t1` thing, dropping its replies.
    pub fn into_comment(self) -> Result<Comment> {
        expect_kind(&self, "t1")?;
        let (comment, _) = decode_comment(self.data)?;
        Ok(comment)
    }
}

fn expect_kind(thing: &Thing, kind: &str) -> Result<()> {
    if thing.kind == kind {
        Ok(())
    } else {
        Err(AppError::parse(
            "listing",
            format!("expected '{}' but got '{}'", kind, thing.kind),
        ))
    }
}

fn decode_comment(data: Value) -> Result<(Comment, Option<Listing>)> {
    let data: CommentData = decode(data, "comment")?;
    let replies = match data.replies {
        Value::Object(_) => Some(decode(data.replies, "comment replies")?),
        _ => None,
    };
    let comment = Comment {
        id: data.id,
        subreddit: Subreddit {
            display_name: data.subreddit,
        },
        author: Redditor::from_author(data.author.as_deref()),
    };
    Ok((comment, replies))
}

/// Decode a single listing page.
pub fn parse_listing(body: &str) -> Result<ListingData> {
    let listing: Listing =
        serde_json::from_str(body).map_err(|e| AppError::parse("listing", e))?;
    Ok(listing.data)
}

/// Decode a `/comments/{id}` response into its comment-tree roots.
///
/// The response is a pair of listings: the submission, then its comments.
pub fn parse_comment_page(body: &str) -> Result<Vec<Thing>> {
    let mut pages: Vec<Listing> =
        serde_json::from_str(body).map_err(|e| AppError::parse("comment page", e))?;
    if pages.len() < 2 {
        return Err(AppError::parse(
            "comment page",
            format!("expected 2 listings, got {}", pages.len()),
        ));
    }
    Ok(pages.swap_remove(1).data.children)
}

/// Decode a `/api/morechildren` response.
pub fn parse_more_children(body: &str) -> Result<Vec<Thing>> {
    let response: MoreChildrenResponse =
        serde_json::from_str(body).map_err(|e| AppError::parse("morechildren", e))?;
    if !response.json.errors.is_empty() {
        return Err(AppError::parse(
            "morechildren",
            Value::Array(response.json.errors),
        ));
    }
    Ok(response.json.data.map(|d| d.things).unwrap_or_default())
}

/// Decode a `/r/{name}/about` response.
pub fn parse_about(body: &str) -> Result<SubredditInfo> {
    let thing: Thing = serde_json::from_str(body).map_err(|e| AppError::parse("about", e))?;
    expect_kind(&thing, "t5")?;
    let data: AboutData = decode(thing.data, "about")?;
    Ok(SubredditInfo {
        over18: data.over18,
        subscribers: data.subscribers.unwrap_or(0),
    })
}

/// Flattens comment trees and queues the placeholders still to expand.
#[derive(Debug, Default)]
pub struct CommentCollector {
    seen: HashSet<String>,
    requested: HashSet<String>,
    continued: HashSet<String>,
    comments: Vec<Comment>,
    pending: VecDeque<MoreData>,
}

impl CommentCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk a batch of things, descending into replies without recursion.
    pub fn absorb(&mut self, things: Vec<Thing>) -> Result<()> {
        let mut stack = things;
        stack.reverse();

        while let Some(thing) = stack.pop() {
            match thing.kind.as_str() {
                "t1" => {
                    let (comment, replies) = decode_comment(thing.data)?;
                    if let Some(replies) = replies {
                        stack.extend(replies.data.children.into_iter().rev());
                    }
                    if self.seen.insert(comment.id.clone()) {
                        self.comments.push(comment);
                    }
                }
                "more" => {
                    let more: MoreData = decode(thing.data, "more")?;
                    if more.children.is_empty() {
                        // "Continue this thread": only comment parents can be reopened, once.
                        if more.parent_id.starts_with("t1_")
                            && self.continued.insert(more.parent_id.clone())
                        {
                            self.pending.push_back(more);
                        }
                        continue;
                    }
                    let fresh: Vec<String> = more
                        .children
                        .into_iter()
                        .filter(|id| !self.seen.contains(id) && !self.requested.contains(id))
                        .collect();
                    if !fresh.is_empty() {
                        // Deleted ids can come back as the same placeholder; ask once.
                        self.requested.extend(fresh.iter().cloned());
                        self.pending.push_back(MoreData {
                            parent_id: more.parent_id,
                            children: fresh,
                        });
                    }
                }
                other => log::debug!("Ignoring '{}' in comment tree", other),
            }
        }
        Ok(())
    }

    /// Next placeholder to expand.
    pub fn next_pending(&mut self) -> Option<MoreData> {
        self.pending.pop_front()
    }

    pub fn finish(self) -> Vec<Comment> {
        self.comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOP_PAGE: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": "t3_b2",
            "children": [
                {"kind": "t3", "data": {"id": "a1", "subreddit": "aggies", "author": "alice", "num_comments": 3}},
                {"kind": "t3", "data": {"id": "b2", "subreddit": "aggies", "author": "[deleted]", "num_comments": 0}}
            ]
        }
    }"#;

    const COMMENT_PAGE: &str = r#"[
        {"kind": "Listing", "data": {"after": null, "children": [
            {"kind": "t3", "data": {"id": "a1", "subreddit": "aggies", "author": "alice"}}
        ]}},
        {"kind": "Listing", "data": {"after": null, "children": [
            {"kind": "t1", "data": {"id": "c1", "subreddit": "aggies", "author": "bob",
                "replies": {"kind": "Listing", "data": {"after": null, "children": [
                    {"kind": "t1", "data": {"id": "c2", "subreddit": "aggies", "author": "[deleted]", "replies": ""}},
                    {"kind": "more", "data": {"id": "_", "parent_id": "t1_c2", "count": 0, "children": []}}
                ]}}}},
            {"kind": "t1", "data": {"id": "c3", "subreddit": "aggies", "author": "carol", "replies": ""}},
            {"kind": "more", "data": {"id": "c4", "parent_id": "t3_a1", "count": 2, "children": ["c4", "c5"]}}
        ]}}
    ]"#;

    #[test]
    fn test_parse_listing_page() {
        let page = parse_listing(TOP_PAGE).unwrap();
        assert_eq!(page.after.as_deref(), Some("t3_b2"));

        let submissions: Vec<_> = page
            .children
            .into_iter()
            .map(|t| t.into_submission().unwrap())
            .collect();
        assert_eq!(submissions[0].author, Some(Redditor::new("alice")));
        assert_eq!(submissions[0].num_comments, 3);
        assert_eq!(submissions[1].author, None);
        assert_eq!(submissions[1].subreddit.display_name, "aggies");
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let page = parse_listing(TOP_PAGE).unwrap();
        let thing = page.children.into_iter().next().unwrap();
        assert!(matches!(thing.into_comment(), Err(AppError::Parse { .. })));
    }

    #[test]
    fn test_collector_flattens_tree_and_queues_more() {
        let roots = parse_comment_page(COMMENT_PAGE).unwrap();
        let mut collector = CommentCollector::new();
        collector.absorb(roots).unwrap();

        let continue_thread = collector.next_pending().unwrap();
        assert_eq!(continue_thread.parent_id, "t1_c2");
        assert!(continue_thread.children.is_empty());

        let more = collector.next_pending().unwrap();
        assert_eq!(more.children, vec!["c4", "c5"]);
        assert!(collector.next_pending().is_none());

        let ids: Vec<_> = collector.finish().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_collector_skips_seen_comments() {
        let mut collector = CommentCollector::new();
        collector.absorb(parse_comment_page(COMMENT_PAGE).unwrap()).unwrap();
        while collector.next_pending().is_some() {}

        // Expanding a placeholder can return comments already walked.
        let body = r#"{"json": {"errors": [], "data": {"things": [
            {"kind": "t1", "data": {"id": "c3", "subreddit": "aggies", "author": "carol", "replies": ""}},
            {"kind": "t1", "data": {"id": "c4", "subreddit": "aggies", "author": "dave", "replies": ""}},
            {"kind": "more", "data": {"id": "c9", "parent_id": "t3_a1", "count": 1, "children": ["c3"]}}
        ]}}}"#;
        collector.absorb(parse_more_children(body).unwrap()).unwrap();

        assert!(collector.next_pending().is_none());
        assert_eq!(collector.finish().len(), 4);
    }

    #[test]
    fn test_collector_requests_each_id_once() {
        let repeat = r#"{"json": {"errors": [], "data": {"things": [
            {"kind": "more", "data": {"id": "c4", "parent_id": "t3_a1", "count": 1, "children": ["c4"]}}
        ]}}}"#;
        let mut collector = CommentCollector::new();
        collector.absorb(parse_more_children(repeat).unwrap()).unwrap();

        let mut rounds = 0;
        while let Some(more) = collector.next_pending() {
            assert_eq!(more.children, vec!["c4"]);
            rounds += 1;
            assert!(rounds < 5, "placeholder re-queued");
            collector.absorb(parse_more_children(repeat).unwrap()).unwrap();
        }

        assert_eq!(rounds, 1);
        assert!(collector.finish().is_empty());
    }

    #[test]
    fn test_more_children_errors_surface() {
        let body = r#"{"json": {"errors": [["BAD", "bad request", "children"]]}}"#;
        assert!(parse_more_children(body).is_err());
    }

    #[test]
    fn test_parse_about() {
        let body = r#"{"kind": "t5", "data": {"display_name": "x", "over18": true, "subscribers": 12345}}"#;
        assert_eq!(
            parse_about(body).unwrap(),
            SubredditInfo {
                over18: true,
                subscribers: 12345
            }
        );
    }

    #[test]
    fn test_comment_page_needs_two_listings() {
        assert!(parse_comment_page(r#"[{"kind": "Listing", "data": {"children": []}}]"#).is_err());
    }
}
