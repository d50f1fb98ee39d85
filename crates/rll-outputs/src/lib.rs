//! Output channels: Slack webhook notifications and CSV-based tracking.
//! Delivery is fire-and-forget; failures are reported back, never retried.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use rll_core::{match_reasons, Post, ScoringConfig};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

pub const CRATE_NAME: &str = "rll-outputs";

const MAX_POSTS_PER_MESSAGE: usize = 10;
const MAX_DRAFT_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook returned status {status}")]
    Status { status: u16 },
    #[error("tracking file error: {0}")]
    Csv(#[from] csv::Error),
    #[error("tracking io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Digest delivery to a notification channel.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_digest(
        &self,
        posts: &[Post],
        config: &ScoringConfig,
    ) -> Result<(), OutputError>;
}

/// Row-per-post tracking with upsert semantics keyed by reddit id.
#[async_trait]
pub trait TrackingSink: Send + Sync {
    async fn upsert(&self, posts: &[Post]) -> Result<(), OutputError>;
}

/// Slack incoming-webhook sink, Block Kit formatted.
#[derive(Debug, Clone)]
pub struct SlackWebhookSink {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackWebhookSink {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for SlackWebhookSink {
    async fn send_digest(
        &self,
        posts: &[Post],
        config: &ScoringConfig,
    ) -> Result<(), OutputError> {
        if posts.is_empty() {
            return Ok(());
        }

        let blocks = build_digest_blocks(posts, config, "🎯 HireLab Reddit Leads");
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "blocks": blocks }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OutputError::Status {
                status: response.status().as_u16(),
            });
        }

        info!(posts = posts.len(), "sent digest to slack");
        Ok(())
    }
}

pub fn escape_slack(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{head}...")
}

/// Build the Block Kit payload for a digest of scored posts.
pub fn build_digest_blocks(posts: &[Post], config: &ScoringConfig, title: &str) -> Vec<Value> {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": title, "emoji": true }
        }),
        json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": format!("Found *{}* high-intent posts", posts.len())
            }]
        }),
        json!({ "type": "divider" }),
    ];

    for post in posts.iter().take(MAX_POSTS_PER_MESSAGE) {
        blocks.extend(post_blocks(post, config));
        blocks.push(json!({ "type": "divider" }));
    }

    blocks.push(json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": "📝 *Commands:* `rll mark-replied <id>` | `rll mark-skipped <id>`"
        }]
    }));

    blocks
}

fn post_blocks(post: &Post, config: &ScoringConfig) -> Vec<Value> {
    let reasons = match_reasons(config, post);
    let reasons_text = if reasons.is_empty() {
        "• Keyword match".to_string()
    } else {
        reasons
            .iter()
            .map(|r| format!("• {r}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut blocks = vec![
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*<{}|{}>*\nr/{} • Score: {} • 👤 u/{}",
                    post.url,
                    escape_slack(&post.title),
                    post.subreddit,
                    post.intent_score,
                    post.author
                )
            }
        }),
        json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": format!("*Why matched:*\n{reasons_text}")
            }]
        }),
    ];

    if !post.draft_a.is_empty() {
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*Draft A (no mention):*\n```{}```",
                    truncate(&post.draft_a, MAX_DRAFT_CHARS)
                )
            }
        }));
    }

    if !post.draft_b.is_empty() && post.mention_allowed && post.draft_b != post.draft_a {
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*Draft B (soft mention):*\n```{}```",
                    truncate(&post.draft_b, MAX_DRAFT_CHARS)
                )
            }
        }));
    }

    blocks.push(json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": format!(
                "ID: `{id}` | `rll mark-replied {id}` | `rll mark-skipped {id}`",
                id = post.reddit_id
            )
        }]
    }));

    blocks
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrackingRow {
    date: String,
    reddit_id: String,
    subreddit: String,
    intent_score: u8,
    title: String,
    url: String,
    author: String,
    status: String,
    draft_a: String,
    draft_b: String,
    notes: String,
}

impl TrackingRow {
    fn from_post(post: &Post) -> Self {
        Self {
            date: Utc::now().format("%Y-%m-%d %H:%M").to_string(),
            reddit_id: post.reddit_id.clone(),
            subreddit: post.subreddit.clone(),
            intent_score: post.intent_score,
            title: truncate(&post.title, 200),
            url: post.url.clone(),
            author: post.author.clone(),
            status: post.status.to_string(),
            draft_a: truncate(&post.draft_a, MAX_DRAFT_CHARS),
            draft_b: truncate(&post.draft_b, MAX_DRAFT_CHARS),
            notes: String::new(),
        }
    }
}

/// Spreadsheet-style tracking file on disk. Rows are upserted by reddit id,
/// so re-running a digest refreshes rather than duplicates.
#[derive(Debug, Clone)]
pub struct CsvTracker {
    path: PathBuf,
}

impl CsvTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_rows(&self) -> Result<Vec<TrackingRow>, OutputError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Ok(rows)
    }

    fn write_rows(&self, rows: &[TrackingRow]) -> Result<(), OutputError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl TrackingSink for CsvTracker {
    async fn upsert(&self, posts: &[Post]) -> Result<(), OutputError> {
        let mut rows = self.read_rows()?;

        for post in posts {
            let fresh = TrackingRow::from_post(post);
            match rows.iter_mut().find(|row| row.reddit_id == post.reddit_id) {
                Some(existing) => {
                    // Operator notes live only in the tracking file; keep them.
                    fresh_into(existing, fresh);
                }
                None => rows.push(fresh),
            }
        }

        self.write_rows(&rows)?;
        info!(posts = posts.len(), path = %self.path.display(), "updated tracking file");
        Ok(())
    }
}

fn fresh_into(existing: &mut TrackingRow, fresh: TrackingRow) {
    let notes = std::mem::take(&mut existing.notes);
    *existing = fresh;
    existing.notes = notes;
}
