//! Core domain model, intent scoring, and dedup fingerprinting for RLL.

pub mod config;
pub mod dedupe;
pub mod model;
pub mod scoring;

pub const CRATE_NAME: &str = "rll-core";

pub use config::{ScoringConfig, DEFAULT_SUBREDDITS};
pub use dedupe::{content_hash, normalize_for_hash};
pub use model::{
    Action, ActionType, ParseEnumError, Post, PostStatus, TransitionError,
};
pub use scoring::{match_reasons, mention_allowed, score_post, ScoreBreakdown};
