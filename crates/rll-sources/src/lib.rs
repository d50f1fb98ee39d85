//! Post sources: the read-only Reddit API client and a fixture-backed
//! source for offline runs. No write or posting endpoints exist here.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rll_core::Post;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const CRATE_NAME: &str = "rll-sources";

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("reddit auth rejected with status {status}")]
    Auth { status: u16 },
    #[error("http status {status} for r/{subreddit}")]
    HttpStatus { status: u16, subreddit: String },
    #[error("malformed listing for r/{subreddit}: {detail}")]
    Malformed { subreddit: String, detail: String },
    #[error("fixture error: {0}")]
    Fixture(#[from] std::io::Error),
}

/// One raw submission as observed at the source, before scoring or dedup.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPost {
    pub reddit_id: String,
    pub subreddit: String,
    pub title: String,
    pub selftext: String,
    pub url: String,
    pub author: String,
    pub created_utc: DateTime<Utc>,
    pub score: i64,
    pub num_comments: i64,
}

impl From<FetchedPost> for Post {
    fn from(fetched: FetchedPost) -> Self {
        Post::new(
            fetched.reddit_id,
            fetched.subreddit,
            fetched.title,
            fetched.selftext,
            fetched.url,
            fetched.author,
            fetched.created_utc,
            fetched.score,
            fetched.num_comments,
        )
    }
}

/// A bounded, time-windowed page of candidate posts per subreddit.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_subreddit(
        &self,
        subreddit: &str,
        limit: usize,
        max_age: chrono::Duration,
    ) -> Result<Vec<FetchedPost>, SourceError>;
}

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Reddit API client using the OAuth2 client-credentials grant.
///
/// Tokens are cached until shortly before expiry; one token covers a whole
/// batch run.
#[derive(Debug)]
pub struct RedditSource {
    client: reqwest::Client,
    credentials: RedditCredentials,
    token: Mutex<Option<CachedToken>>,
}

impl RedditSource {
    pub fn new(credentials: RedditCredentials) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            client,
            credentials,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, SourceError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Auth {
                status: response.status().as_u16(),
            });
        }

        let token: TokenResponse = response.json().await?;
        let access_token = token.access_token.clone();
        // Refresh a minute early rather than racing the expiry.
        let lifetime = Duration::from_secs(token.expires_in.saturating_sub(60));
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + lifetime,
        });

        debug!("obtained reddit access token");
        Ok(access_token)
    }
}

#[async_trait]
impl PostSource for RedditSource {
    async fn fetch_subreddit(
        &self,
        subreddit: &str,
        limit: usize,
        max_age: chrono::Duration,
    ) -> Result<Vec<FetchedPost>, SourceError> {
        let token = self.access_token().await?;
        let url = format!("{API_BASE}/r/{subreddit}/new");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("limit", limit.to_string()), ("raw_json", "1".to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::HttpStatus {
                status: response.status().as_u16(),
                subreddit: subreddit.to_string(),
            });
        }

        let body = response.text().await?;
        let cutoff = Utc::now() - max_age;
        posts_from_listing(subreddit, &body, cutoff)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: u64,
}

fn default_token_lifetime() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: SubmissionData,
}

#[derive(Debug, Deserialize)]
struct SubmissionData {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    permalink: String,
    #[serde(default)]
    author: Option<String>,
    created_utc: f64,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    stickied: bool,
}

/// Parse a `/r/{sub}/new` listing body, dropping stickied posts and posts
/// older than the cutoff.
fn posts_from_listing(
    subreddit: &str,
    body: &str,
    cutoff: DateTime<Utc>,
) -> Result<Vec<FetchedPost>, SourceError> {
    let listing: Listing = serde_json::from_str(body).map_err(|e| SourceError::Malformed {
        subreddit: subreddit.to_string(),
        detail: e.to_string(),
    })?;

    let mut posts = Vec::new();
    for child in listing.data.children {
        let submission = child.data;
        if submission.stickied {
            continue;
        }

        let created_utc = Utc
            .timestamp_opt(submission.created_utc as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);
        if created_utc < cutoff {
            continue;
        }

        posts.push(FetchedPost {
            reddit_id: submission.id,
            subreddit: subreddit.to_string(),
            title: submission.title,
            selftext: submission.selftext,
            url: format!("https://www.reddit.com{}", submission.permalink),
            author: submission
                .author
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| "[deleted]".to_string()),
            created_utc,
            score: submission.score,
            num_comments: submission.num_comments,
        });
    }

    Ok(posts)
}

#[derive(Debug, Deserialize)]
struct FixtureRecord {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    url: String,
    #[serde(default)]
    author: Option<String>,
    created_utc: DateTime<Utc>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
}

/// Fixture-backed source reading `{dir}/{subreddit}.json`, for dry runs and
/// tests. Subreddits without a fixture file yield an empty page.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    dir: PathBuf,
}

impl FixtureSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl PostSource for FixtureSource {
    async fn fetch_subreddit(
        &self,
        subreddit: &str,
        limit: usize,
        _max_age: chrono::Duration,
    ) -> Result<Vec<FetchedPost>, SourceError> {
        let path = self.dir.join(format!("{subreddit}.json"));
        if !path.exists() {
            warn!(subreddit, path = %path.display(), "no fixture file for subreddit");
            return Ok(Vec::new());
        }

        let raw = tokio::fs::read_to_string(&path).await?;
        let records: Vec<FixtureRecord> =
            serde_json::from_str(&raw).map_err(|e| SourceError::Malformed {
                subreddit: subreddit.to_string(),
                detail: e.to_string(),
            })?;

        Ok(records
            .into_iter()
            .take(limit)
            .map(|record| FetchedPost {
                reddit_id: record.id,
                subreddit: subreddit.to_string(),
                title: record.title,
                selftext: record.selftext,
                url: record.url,
                author: record
                    .author
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| "[deleted]".to_string()),
                created_utc: record.created_utc,
                score: record.score,
                num_comments: record.num_comments,
            })
            .collect())
    }
}
