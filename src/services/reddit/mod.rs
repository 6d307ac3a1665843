// src/services/reddit/mod.rs

//! Platform client over the public JSON API.
//!
//! Requests go to `reddit.base_url` anonymously, or to
//! `reddit.oauth_base_url` with an application-only bearer token when client
//! credentials are configured. Every request waits `request_delay_ms` after
//! the previous one.

mod things;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::sync::Mutex;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    Comment, RedditConfig, Redditor, Submission, Subreddit, SubredditInfo, TimeWindow,
};
use crate::services::RedditGateway;
use crate::utils::http::{check_status, create_async_client};

use things::{CommentCollector, MoreData, Thing, TokenResponse};

/// Largest page the listing endpoints serve.
const PAGE_SIZE: usize = 100;

/// Refresh tokens this long before they expire.
const TOKEN_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Service for reading subreddits and redditors from the platform.
pub struct RedditClient {
    config: RedditConfig,
    client: Client,
    token: Mutex<Option<AccessToken>>,
    last_request: Mutex<Option<Instant>>,
}

impl RedditClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &RedditConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            client: create_async_client(config)?,
            token: Mutex::new(None),
            last_request: Mutex::new(None),
        })
    }

    fn base_url(&self) -> &str {
        if self.config.credentials().is_some() {
            &self.config.oauth_base_url
        } else {
            &self.config.base_url
        }
    }

    /// Sleep until `request_delay_ms` has passed since the previous request.
    async fn throttle(&self) {
        let delay = Duration::from_millis(self.config.request_delay_ms);
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < delay {
                tokio::time::sleep(delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Current bearer token, fetching a new one when missing or stale.
    async fn bearer(&self) -> Result<Option<String>> {
        let Some((client_id, client_secret)) = self.config.credentials() else {
            return Ok(None);
        };

        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref() {
            if current.expires_at > Instant::now() + TOKEN_MARGIN {
                return Ok(Some(current.value.clone()));
            }
        }

        log::debug!("Requesting application-only access token");
        self.throttle().await;
        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(client_id, Some(client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?;
        check_status(response.status(), "access token", &self.config.token_url)?;

        let body = response.text().await?;
        let granted: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AppError::parse("access token", e))?;
        let value = granted.access_token;
        *token = Some(AccessToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(granted.expires_in),
        });
        Ok(Some(value))
    }

    /// GET a JSON endpoint and return the raw body.
    async fn get(&self, path: &str, query: &[(&str, String)], resource: &str) -> Result<String> {
        let mut url = Url::parse(self.base_url())?.join(path)?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("raw_json", "1");

        let bearer = self.bearer().await?;
        self.throttle().await;
        log::debug!("GET {}", url);

        let mut request = self.client.get(url.clone());
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        check_status(response.status(), resource, url.as_str())?;
        Ok(response.text().await?)
    }

    /// Read up to `listing_limit` things from a paginated listing.
    async fn listing(
        &self,
        path: &str,
        query: &[(&str, String)],
        resource: &str,
    ) -> Result<Vec<Thing>> {
        let limit = self.config.listing_limit;
        let mut things = Vec::new();
        let mut after: Option<String> = None;

        while things.len() < limit {
            let mut page_query = query.to_vec();
            page_query.push(("limit", PAGE_SIZE.min(limit - things.len()).to_string()));
            if let Some(cursor) = &after {
                page_query.push(("after", cursor.clone()));
            }

            let page = things::parse_listing(&self.get(path, &page_query, resource).await?)?;
            let received = page.children.len();
            things.extend(page.children);

            match page.after {
                Some(cursor) if received > 0 => after = Some(cursor),
                _ => break,
            }
        }

        things.truncate(limit);
        Ok(things)
    }

    fn top_query(window: TimeWindow) -> Vec<(&'static str, String)> {
        vec![("sort", "top".to_string()), ("t", window.as_str().to_string())]
    }

    /// Expand one placeholder into the things it hides.
    async fn expand(&self, submission: &Submission, more: MoreData) -> Result<Vec<Thing>> {
        let resource = format!("comments of {}", submission.id);

        if more.children.is_empty() {
            let parent = more.parent_id.trim_start_matches("t1_");
            let path = format!("comments/{}/_/{}.json", submission.id, parent);
            let body = self.get(&path, &[], &resource).await?;
            return things::parse_comment_page(&body);
        }

        let mut expanded = Vec::new();
        for batch in more.children.chunks(self.config.more_children_batch) {
            let query = [
                ("api_type", "json".to_string()),
                ("link_id", format!("t3_{}", submission.id)),
                ("children", batch.join(",")),
            ];
            let body = self.get("api/morechildren.json", &query, &resource).await?;
            expanded.extend(things::parse_more_children(&body)?);
        }
        Ok(expanded)
    }
}

#[async_trait]
impl RedditGateway for RedditClient {
    async fn top_submissions(
        &self,
        subreddit: &Subreddit,
        window: TimeWindow,
    ) -> Result<Vec<Submission>> {
        let path = format!("r/{}/top.json", subreddit.display_name);
        let query = [("t", window.as_str().to_string())];
        let resource = format!("r/{}", subreddit.display_name);

        self.listing(&path, &query, &resource)
            .await?
            .into_iter()
            .map(Thing::into_submission)
            .collect()
    }

    async fn comments(&self, submission: &Submission) -> Result<Vec<Comment>> {
        let path = format!("comments/{}.json", submission.id);
        let resource = format!("comments of {}", submission.id);
        let roots = things::parse_comment_page(&self.get(&path, &[], &resource).await?)?;

        let mut collector = CommentCollector::new();
        collector.absorb(roots)?;
        while let Some(more) = collector.next_pending() {
            let expanded = self.expand(submission, more).await?;
            collector.absorb(expanded)?;
        }

        Ok(collector.finish())
    }

    async fn redditor_submissions(
        &self,
        redditor: &Redditor,
        window: TimeWindow,
    ) -> Result<Vec<Submission>> {
        let path = format!("user/{}/submitted.json", redditor.name);
        let resource = format!("u/{}", redditor.name);

        self.listing(&path, &Self::top_query(window), &resource)
            .await?
            .into_iter()
            .map(Thing::into_submission)
            .collect()
    }

    async fn redditor_comments(
        &self,
        redditor: &Redditor,
        window: TimeWindow,
    ) -> Result<Vec<Comment>> {
        let path = format!("user/{}/comments.json", redditor.name);
        let resource = format!("u/{}", redditor.name);

        self.listing(&path, &Self::top_query(window), &resource)
            .await?
            .into_iter()
            .map(Thing::into_comment)
            .collect()
    }

    async fn subreddit_info(&self, name: &str) -> Result<SubredditInfo> {
        let path = format!("r/{}/about.json", name);
        let body = self.get(&path, &[], &format!("r/{}", name)).await?;
        things::parse_about(&body)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    type Route = fn(&str) -> (u16, String);

    /// Local HTTP/1.1 server answering canned JSON and recording request targets.
    struct Fixture {
        base_url: String,
        requests: Arc<StdMutex<Vec<String>>>,
    }

    impl Fixture {
        async fn start(route: Route) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            let requests = Arc::new(StdMutex::new(Vec::new()));
            let log = requests.clone();

            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    let mut head: Vec<u8> = Vec::new();
                    let mut chunk = [0u8; 4096];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => head.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&head);
                    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    log.lock().unwrap().push(target.clone());

                    let (status, body) = route(&target);
                    let response = format!(
                        "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\n\
                         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });

            Self { base_url, requests }
        }

        fn client(&self, config: RedditConfig) -> RedditClient {
            RedditClient::new(&RedditConfig {
                base_url: self.base_url.clone(),
                request_delay_ms: 0,
                ..config
            })
            .unwrap()
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn listing(children: &[String], after: Option<&str>) -> String {
        let after = after.map_or("null".to_string(), |a| format!("\"{a}\""));
        format!(
            r#"{{"kind": "Listing", "data": {{"after": {after}, "children": [{}]}}}}"#,
            children.join(",")
        )
    }

    fn link(id: &str) -> String {
        format!(
            r#"{{"kind": "t3", "data": {{"id": "{id}", "subreddit": "aggies", "author": "op_{id}", "num_comments": 1}}}}"#
        )
    }

    fn comment(id: &str, replies: &str) -> String {
        format!(
            r#"{{"kind": "t1", "data": {{"id": "{id}", "subreddit": "aggies", "author": "user_{id}", "replies": {replies}}}}}"#
        )
    }

    fn leaf(id: &str) -> String {
        comment(id, r#""""#)
    }

    fn more(parent: &str, children: &[&str]) -> String {
        let ids: Vec<String> = children.iter().map(|c| format!("\"{c}\"")).collect();
        format!(
            r#"{{"kind": "more", "data": {{"id": "m", "parent_id": "{parent}", "children": [{}]}}}}"#,
            ids.join(",")
        )
    }

    fn comment_page(comments: &[String]) -> String {
        format!("[{}, {}]", listing(&[link("a1")], None), listing(comments, None))
    }

    fn more_children(things: &[String]) -> String {
        format!(
            r#"{{"json": {{"errors": [], "data": {{"things": [{}]}}}}}}"#,
            things.join(",")
        )
    }

    fn top_pages(target: &str) -> (u16, String) {
        if target.contains("after=t3_p2") {
            (200, listing(&[link("p3"), link("p4")], None))
        } else {
            (200, listing(&[link("p1"), link("p2")], Some("t3_p2")))
        }
    }

    #[tokio::test]
    async fn test_listing_follows_cursor_up_to_limit() {
        let fixture = Fixture::start(top_pages).await;
        let client = fixture.client(RedditConfig {
            listing_limit: 3,
            ..RedditConfig::default()
        });
        let subreddit = Subreddit::from_name("aggies").unwrap();

        let submissions = client
            .top_submissions(&subreddit, TimeWindow::Month)
            .await
            .unwrap();

        let ids: Vec<_> = submissions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
        let requests = fixture.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], "/r/aggies/top.json?t=month&limit=3&raw_json=1");
        assert_eq!(
            requests[1],
            "/r/aggies/top.json?t=month&limit=1&after=t3_p2&raw_json=1"
        );
    }

    #[tokio::test]
    async fn test_listing_stops_at_last_page() {
        let fixture = Fixture::start(top_pages).await;
        let client = fixture.client(RedditConfig::default());

        let submissions = client
            .redditor_submissions(&Redditor::new("alice"), TimeWindow::All)
            .await
            .unwrap();

        assert_eq!(submissions.len(), 4);
        let requests = fixture.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("/user/alice/submitted.json?sort=top&t=all&limit=100"));
    }

    fn comment_tree(target: &str) -> (u16, String) {
        if target.starts_with("/comments/a1.json") {
            let c1 = comment(
                "c1",
                &listing(&[leaf("c2"), more("t1_c2", &[])], None),
            );
            return (200, comment_page(&[c1, leaf("c3"), more("t3_a1", &["c4", "c5"])]));
        }
        if target.starts_with("/comments/a1/_/c2.json") {
            let c2 = comment("c2", &listing(&[leaf("c6")], None));
            return (200, comment_page(&[c2]));
        }
        if target.starts_with("/api/morechildren.json") && target.contains("children=c4&") {
            return (200, more_children(&[leaf("c4")]));
        }
        if target.starts_with("/api/morechildren.json") && target.contains("children=c5&") {
            // Already requested ids offered again must not be fetched twice.
            return (200, more_children(&[leaf("c5"), more("t3_a1", &["c4", "c5"])]));
        }
        (500, "{}".to_string())
    }

    #[tokio::test]
    async fn test_comments_expand_every_placeholder() {
        let fixture = Fixture::start(comment_tree).await;
        let client = fixture.client(RedditConfig {
            more_children_batch: 1,
            ..RedditConfig::default()
        });
        let submission = Submission {
            id: "a1".to_string(),
            subreddit: Subreddit::from_name("aggies").unwrap(),
            author: Some(Redditor::new("op_a1")),
            num_comments: 6,
        };

        let comments = client.comments(&submission).await.unwrap();

        let ids: Vec<_> = comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3", "c6", "c4", "c5"]);
        assert_eq!(comments[0].author, Some(Redditor::new("user_c1")));

        let requests = fixture.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[0], "/comments/a1.json?raw_json=1");
        assert_eq!(requests[1], "/comments/a1/_/c2.json?raw_json=1");
        assert_eq!(
            requests[2],
            "/api/morechildren.json?api_type=json&link_id=t3_a1&children=c4&raw_json=1"
        );
        assert!(requests[3].contains("children=c5&"));
    }

    fn statuses(target: &str) -> (u16, String) {
        if target.starts_with("/user/ghost/") {
            return (403, "{}".to_string());
        }
        if target.starts_with("/user/gone/") {
            return (404, "{}".to_string());
        }
        if target.starts_with("/r/x/about.json") {
            let about = r#"{"kind": "t5", "data": {"display_name": "x", "over18": true, "subscribers": 12345}}"#;
            return (200, about.to_string());
        }
        (502, "{}".to_string())
    }

    #[tokio::test]
    async fn test_status_mapping_over_http() {
        let fixture = Fixture::start(statuses).await;
        let client = fixture.client(RedditConfig::default());

        let forbidden = client
            .redditor_submissions(&Redditor::new("ghost"), TimeWindow::Year)
            .await;
        assert!(matches!(forbidden, Err(AppError::Forbidden(r)) if r == "u/ghost"));

        let gone = client
            .redditor_comments(&Redditor::new("gone"), TimeWindow::Year)
            .await;
        assert!(matches!(gone, Err(AppError::NotFound(_))));

        assert_eq!(
            client.subreddit_info("x").await.unwrap(),
            SubredditInfo {
                over18: true,
                subscribers: 12345
            }
        );

        let broken = client.subreddit_info("y").await;
        assert!(matches!(broken, Err(AppError::Api { status: 502, .. })));
    }

    #[test]
    fn test_base_url_follows_credentials() {
        let mut config = RedditConfig::default();
        let anonymous = RedditClient::new(&config).unwrap();
        assert_eq!(anonymous.base_url(), "https://www.reddit.com");

        config.client_id = Some("id".to_string());
        config.client_secret = Some("secret".to_string());
        let authenticated = RedditClient::new(&config).unwrap();
        assert_eq!(authenticated.base_url(), "https://oauth.reddit.com");
    }

    #[test]
    fn test_top_query() {
        let query = RedditClient::top_query(TimeWindow::Month);
        assert_eq!(
            query,
            vec![("sort", "top".to_string()), ("t", "month".to_string())]
        );
    }

    #[tokio::test]
    async fn test_anonymous_client_has_no_bearer() {
        let client = RedditClient::new(&RedditConfig::default()).unwrap();
        assert!(client.bearer().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_throttle_spaces_requests() {
        let config = RedditConfig {
            request_delay_ms: 50,
            ..RedditConfig::default()
        };
        let client = RedditClient::new(&config).unwrap();

        let start = Instant::now();
        client.throttle().await;
        client.throttle().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
