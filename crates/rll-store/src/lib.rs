//! SQLite persistence for posts and their append-only action log.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rll_core::{Action, ActionType, Post, PostStatus, TransitionError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use thiserror::Error;
use tracing::debug;

pub const CRATE_NAME: &str = "rll-store";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("post not found: {0}")]
    NotFound(String),
    #[error("corrupt row for {reddit_id}: {detail}")]
    Corrupt { reddit_id: String, detail: String },
}

/// Counts reported by the `stats` CLI command.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub by_status: BTreeMap<String, i64>,
    pub total_posts: i64,
    pub total_actions: i64,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reddit_id TEXT UNIQUE NOT NULL,
    subreddit TEXT NOT NULL,
    title TEXT NOT NULL,
    selftext TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL,
    author TEXT NOT NULL,
    created_utc TEXT NOT NULL,
    score INTEGER NOT NULL DEFAULT 0,
    num_comments INTEGER NOT NULL DEFAULT 0,
    matched_keywords TEXT NOT NULL DEFAULT '[]',
    intent_score INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'NEW',
    last_seen_at TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    draft_a TEXT NOT NULL DEFAULT '',
    draft_b TEXT NOT NULL DEFAULT '',
    mention_allowed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS actions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reddit_id TEXT NOT NULL,
    action_type TEXT NOT NULL,
    succeeded INTEGER NOT NULL DEFAULT 1,
    notes TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    FOREIGN KEY (reddit_id) REFERENCES posts(reddit_id)
);

CREATE INDEX IF NOT EXISTS idx_posts_status ON posts(status);
CREATE INDEX IF NOT EXISTS idx_posts_content_hash ON posts(content_hash);
CREATE INDEX IF NOT EXISTS idx_actions_reddit_id ON actions(reddit_id);
"#;

/// Post + action store backed by a single SQLite file.
///
/// The `UNIQUE` constraint on `reddit_id` is the only concurrency safeguard
/// needed for overlapping cron invocations.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        Self::connect(options).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::connect(SqliteConnectOptions::new().in_memory(true)).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Insert a post, or refresh the mutable fields of an existing one.
    ///
    /// Identity, ingest content, and status are never overwritten here;
    /// status changes go through [`Store::update_status`].
    pub async fn save_post(&self, post: &Post) -> Result<(), StoreError> {
        let matched = serde_json::to_string(&post.matched_keywords)
            .unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT INTO posts (
                reddit_id, subreddit, title, selftext, url, author,
                created_utc, score, num_comments, matched_keywords,
                intent_score, status, last_seen_at, content_hash,
                draft_a, draft_b, mention_allowed
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(reddit_id) DO UPDATE SET
                score = excluded.score,
                num_comments = excluded.num_comments,
                matched_keywords = excluded.matched_keywords,
                intent_score = excluded.intent_score,
                last_seen_at = excluded.last_seen_at,
                draft_a = excluded.draft_a,
                draft_b = excluded.draft_b,
                mention_allowed = excluded.mention_allowed
            "#,
        )
        .bind(&post.reddit_id)
        .bind(&post.subreddit)
        .bind(&post.title)
        .bind(&post.selftext)
        .bind(&post.url)
        .bind(&post.author)
        .bind(post.created_utc)
        .bind(post.score)
        .bind(post.num_comments)
        .bind(matched)
        .bind(post.intent_score as i64)
        .bind(post.status.as_str())
        .bind(post.last_seen_at)
        .bind(&post.content_hash)
        .bind(&post.draft_a)
        .bind(&post.draft_b)
        .bind(post.mention_allowed)
        .execute(&self.pool)
        .await?;

        debug!(reddit_id = %post.reddit_id, status = %post.status, "saved post");
        Ok(())
    }

    pub async fn post_exists(&self, reddit_id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM posts WHERE reddit_id = ?")
            .bind(reddit_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Look up a prior post with the same content fingerprint.
    pub async fn find_by_hash(&self, content_hash: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT reddit_id FROM posts WHERE content_hash = ? LIMIT 1")
            .bind(content_hash)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get("reddit_id").map_err(StoreError::from))
            .transpose()
    }

    pub async fn get_post(&self, reddit_id: &str) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query("SELECT * FROM posts WHERE reddit_id = ?")
            .bind(reddit_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| post_from_row(&r)).transpose()
    }

    /// Posts in any of the given statuses, optionally above a minimum score,
    /// ordered by intent score descending.
    pub async fn posts_by_status(
        &self,
        statuses: &[PostStatus],
        min_score: Option<u8>,
        limit: i64,
    ) -> Result<Vec<Post>, StoreError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; statuses.len()].join(",");
        let mut sql = format!("SELECT * FROM posts WHERE status IN ({placeholders})");
        if min_score.is_some() {
            sql.push_str(" AND intent_score >= ?");
        }
        sql.push_str(" ORDER BY intent_score DESC LIMIT ?");

        let mut query = sqlx::query(&sql);
        for status in statuses {
            query = query.bind(status.as_str());
        }
        if let Some(min_score) = min_score {
            query = query.bind(min_score as i64);
        }
        query = query.bind(limit);

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(post_from_row).collect()
    }

    /// Validated status transition; refuses backward or illegal moves.
    pub async fn update_status(
        &self,
        reddit_id: &str,
        to: PostStatus,
    ) -> Result<(), StoreError> {
        let post = self
            .get_post(reddit_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(reddit_id.to_string()))?;
        post.status.validate_transition(to)?;

        sqlx::query("UPDATE posts SET status = ? WHERE reddit_id = ?")
            .bind(to.as_str())
            .bind(reddit_id)
            .execute(&self.pool)
            .await?;

        debug!(reddit_id, from = %post.status, to = %to, "status transition");
        Ok(())
    }

    pub async fn save_action(&self, action: &Action) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO actions (reddit_id, action_type, succeeded, notes, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&action.reddit_id)
        .bind(action.action_type.as_str())
        .bind(action.succeeded)
        .bind(&action.notes)
        .bind(action.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn actions_for(&self, reddit_id: &str) -> Result<Vec<Action>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM actions WHERE reddit_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(reddit_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(action_from_row).collect()
    }

    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut stats = StoreStats::default();

        let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM posts GROUP BY status")
            .fetch_all(&self.pool)
            .await?;
        for row in rows {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            stats.by_status.insert(status, count);
        }

        stats.total_posts = sqlx::query("SELECT COUNT(*) AS count FROM posts")
            .fetch_one(&self.pool)
            .await?
            .try_get("count")?;
        stats.total_actions = sqlx::query("SELECT COUNT(*) AS count FROM actions")
            .fetch_one(&self.pool)
            .await?
            .try_get("count")?;

        Ok(stats)
    }
}

fn post_from_row(row: &SqliteRow) -> Result<Post, StoreError> {
    let reddit_id: String = row.try_get("reddit_id")?;
    let corrupt = |detail: String| StoreError::Corrupt {
        reddit_id: reddit_id.clone(),
        detail,
    };

    let status_raw: String = row.try_get("status")?;
    let status: PostStatus = status_raw
        .parse()
        .map_err(|e: rll_core::ParseEnumError| corrupt(e.to_string()))?;

    let matched_raw: String = row.try_get("matched_keywords")?;
    let matched_keywords: Vec<String> =
        serde_json::from_str(&matched_raw).map_err(|e| corrupt(e.to_string()))?;

    let intent_score: i64 = row.try_get("intent_score")?;

    Ok(Post {
        reddit_id: reddit_id.clone(),
        subreddit: row.try_get("subreddit")?,
        title: row.try_get("title")?,
        selftext: row.try_get("selftext")?,
        url: row.try_get("url")?,
        author: row.try_get("author")?,
        created_utc: row.try_get::<DateTime<Utc>, _>("created_utc")?,
        score: row.try_get("score")?,
        num_comments: row.try_get("num_comments")?,
        matched_keywords,
        intent_score: intent_score.clamp(0, 100) as u8,
        status,
        last_seen_at: row.try_get::<DateTime<Utc>, _>("last_seen_at")?,
        content_hash: row.try_get("content_hash")?,
        draft_a: row.try_get("draft_a")?,
        draft_b: row.try_get("draft_b")?,
        mention_allowed: row.try_get("mention_allowed")?,
    })
}

fn action_from_row(row: &SqliteRow) -> Result<Action, StoreError> {
    let reddit_id: String = row.try_get("reddit_id")?;
    let action_raw: String = row.try_get("action_type")?;
    let action_type: ActionType =
        action_raw
            .parse()
            .map_err(|e: rll_core::ParseEnumError| StoreError::Corrupt {
                reddit_id: reddit_id.clone(),
                detail: e.to_string(),
            })?;

    Ok(Action {
        reddit_id,
        action_type,
        succeeded: row.try_get("succeeded")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
