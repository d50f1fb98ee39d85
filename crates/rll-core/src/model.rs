//! Post and Action records plus the post lifecycle state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Lifecycle status of an observed post.
///
/// The order is monotonic: `New < Queued < Sent < {Replied, Skipped}`.
/// `Duplicate` is assigned at ingest and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostStatus {
    New,
    Queued,
    Sent,
    Replied,
    Skipped,
    Duplicate,
}

impl PostStatus {
    pub const ALL: [PostStatus; 6] = [
        PostStatus::New,
        PostStatus::Queued,
        PostStatus::Sent,
        PostStatus::Replied,
        PostStatus::Skipped,
        PostStatus::Duplicate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::New => "NEW",
            PostStatus::Queued => "QUEUED",
            PostStatus::Sent => "SENT",
            PostStatus::Replied => "REPLIED",
            PostStatus::Skipped => "SKIPPED",
            PostStatus::Duplicate => "DUPLICATE",
        }
    }

    /// Forward-only transition check. Regeneration is not a transition:
    /// it replaces drafts and leaves the status untouched.
    pub fn can_transition(self, to: PostStatus) -> bool {
        matches!(
            (self, to),
            (PostStatus::New, PostStatus::Queued)
                | (PostStatus::New, PostStatus::Skipped)
                | (PostStatus::Queued, PostStatus::Sent)
                | (PostStatus::Queued, PostStatus::Skipped)
                | (PostStatus::Sent, PostStatus::Replied)
                | (PostStatus::Sent, PostStatus::Skipped)
        )
    }

    pub fn validate_transition(self, to: PostStatus) -> Result<(), TransitionError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(TransitionError { from: self, to })
        }
    }

    /// Statuses eligible for draft regeneration.
    pub fn allows_regenerate(self) -> bool {
        matches!(self, PostStatus::Queued | PostStatus::Sent)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError {
                kind: "post status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("illegal status transition {from} -> {to}")]
pub struct TransitionError {
    pub from: PostStatus,
    pub to: PostStatus,
}

/// Kinds of audit actions recorded against a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    Drafted,
    SentToSlack,
    WrittenToSheet,
    MarkReplied,
    MarkSkipped,
}

impl ActionType {
    pub const ALL: [ActionType; 5] = [
        ActionType::Drafted,
        ActionType::SentToSlack,
        ActionType::WrittenToSheet,
        ActionType::MarkReplied,
        ActionType::MarkSkipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Drafted => "DRAFTED",
            ActionType::SentToSlack => "SENT_TO_SLACK",
            ActionType::WrittenToSheet => "WRITTEN_TO_SHEET",
            ActionType::MarkReplied => "MARK_REPLIED",
            ActionType::MarkSkipped => "MARK_SKIPPED",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionType::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError {
                kind: "action type",
                value: s.to_string(),
            })
    }
}

/// One observed Reddit submission and everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub reddit_id: String,
    pub subreddit: String,
    pub title: String,
    pub selftext: String,
    pub url: String,
    pub author: String,
    pub created_utc: DateTime<Utc>,
    pub score: i64,
    pub num_comments: i64,
    pub matched_keywords: Vec<String>,
    pub intent_score: u8,
    pub status: PostStatus,
    pub last_seen_at: DateTime<Utc>,
    pub content_hash: String,
    pub draft_a: String,
    pub draft_b: String,
    pub mention_allowed: bool,
}

impl Post {
    /// Build a freshly ingested post with derived fields at their defaults.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reddit_id: impl Into<String>,
        subreddit: impl Into<String>,
        title: impl Into<String>,
        selftext: impl Into<String>,
        url: impl Into<String>,
        author: impl Into<String>,
        created_utc: DateTime<Utc>,
        score: i64,
        num_comments: i64,
    ) -> Self {
        Self {
            reddit_id: reddit_id.into(),
            subreddit: subreddit.into(),
            title: title.into(),
            selftext: selftext.into(),
            url: url.into(),
            author: author.into(),
            created_utc,
            score,
            num_comments,
            matched_keywords: Vec::new(),
            intent_score: 0,
            status: PostStatus::New,
            last_seen_at: Utc::now(),
            content_hash: String::new(),
            draft_a: String::new(),
            draft_b: String::new(),
            mention_allowed: false,
        }
    }

    pub fn has_drafts(&self) -> bool {
        !self.draft_a.is_empty()
    }
}

/// Append-only audit record of something the system did to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub reddit_id: String,
    pub action_type: ActionType,
    pub succeeded: bool,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Action {
    pub fn new(reddit_id: impl Into<String>, action_type: ActionType) -> Self {
        Self {
            reddit_id: reddit_id.into(),
            action_type,
            succeeded: true,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn failed(mut self, notes: impl Into<String>) -> Self {
        self.succeeded = false;
        self.notes = notes.into();
        self
    }
}
