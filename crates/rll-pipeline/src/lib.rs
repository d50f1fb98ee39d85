//! Run orchestration: the ingest pass (fetch, score, dedupe, persist) and
//! the digest pass (draft, notify, track, promote), plus the operator
//! commands that move a post through its lifecycle.

pub mod config;

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use chrono::{DateTime, Duration, Utc};
use rll_core::{
    content_hash, mention_allowed, score_post, Action, ActionType, Post, PostStatus, ScoringConfig,
};
use rll_drafts::DraftGenerator;
use rll_outputs::{NotificationSink, TrackingSink};
use rll_sources::PostSource;
use rll_store::Store;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

pub const CRATE_NAME: &str = "rll-pipeline";

/// Summary of one ingest pass across the configured subreddits.
#[derive(Debug, Clone, Serialize)]
pub struct FetchStats {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_fetched: usize,
    pub new_posts: usize,
    pub refreshed: usize,
    pub duplicates: usize,
    pub above_threshold: usize,
    pub by_subreddit: BTreeMap<String, usize>,
    pub failed_subreddits: Vec<String>,
}

impl FetchStats {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            total_fetched: 0,
            new_posts: 0,
            refreshed: 0,
            duplicates: 0,
            above_threshold: 0,
            by_subreddit: BTreeMap::new(),
            failed_subreddits: Vec::new(),
        }
    }
}

/// One ingest pass: pull recent posts per subreddit, score and fingerprint
/// each, and persist. A subreddit that fails to fetch is logged and skipped;
/// the pass continues with the rest.
pub async fn fetch_once(
    source: &dyn PostSource,
    store: &Store,
    scoring: &ScoringConfig,
    subreddits: &[String],
    posts_per_subreddit: usize,
    lookback: Duration,
) -> anyhow::Result<FetchStats> {
    let mut stats = FetchStats::start();
    info!(run_id = %stats.run_id, subreddits = subreddits.len(), "starting fetch pass");

    for subreddit in subreddits {
        let fetched = match source
            .fetch_subreddit(subreddit, posts_per_subreddit, lookback)
            .await
        {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(subreddit, %err, "subreddit fetch failed, continuing");
                stats.failed_subreddits.push(subreddit.clone());
                continue;
            }
        };

        stats.total_fetched += fetched.len();
        stats.by_subreddit.insert(subreddit.clone(), fetched.len());

        for raw in fetched {
            ingest_post(store, scoring, raw, &mut stats)
                .await
                .with_context(|| format!("ingesting post from r/{subreddit}"))?;
        }
    }

    stats.finished_at = Utc::now();
    info!(
        run_id = %stats.run_id,
        total = stats.total_fetched,
        new = stats.new_posts,
        duplicates = stats.duplicates,
        above_threshold = stats.above_threshold,
        "fetch pass complete"
    );
    Ok(stats)
}

async fn ingest_post(
    store: &Store,
    scoring: &ScoringConfig,
    raw: rll_sources::FetchedPost,
    stats: &mut FetchStats,
) -> anyhow::Result<()> {
    // Same submission seen again: refresh engagement and re-score, but leave
    // status and drafts alone.
    if let Some(mut existing) = store.get_post(&raw.reddit_id).await? {
        existing.score = raw.score;
        existing.num_comments = raw.num_comments;
        let breakdown = score_post(
            scoring,
            &existing.title,
            &existing.selftext,
            &existing.subreddit,
            raw.score,
            raw.num_comments,
        );
        existing.intent_score = breakdown.score;
        existing.matched_keywords = breakdown.matched_keywords;
        existing.last_seen_at = Utc::now();
        store.save_post(&existing).await?;
        stats.refreshed += 1;
        return Ok(());
    }

    let hash = content_hash(&raw.title, &raw.selftext);

    // A different submission with the same fingerprint is a repost; record it
    // as a terminal duplicate so it never reaches the queue.
    if let Some(original_id) = store.find_by_hash(&hash).await? {
        let mut post = Post::from(raw);
        post.content_hash = hash;
        post.status = PostStatus::Duplicate;
        store.save_post(&post).await?;
        store
            .save_action(
                &Action::new(&post.reddit_id, ActionType::MarkSkipped)
                    .with_notes(format!("duplicate of {original_id}")),
            )
            .await?;
        stats.duplicates += 1;
        return Ok(());
    }

    let breakdown = score_post(
        scoring,
        &raw.title,
        &raw.selftext,
        &raw.subreddit,
        raw.score,
        raw.num_comments,
    );
    let allowed = mention_allowed(scoring, &raw.title, &raw.selftext, &raw.subreddit);

    let mut post = Post::from(raw);
    post.content_hash = hash;
    post.intent_score = breakdown.score;
    post.matched_keywords = breakdown.matched_keywords;
    post.mention_allowed = allowed;
    if post.intent_score >= scoring.queue_threshold {
        post.status = PostStatus::Queued;
        stats.above_threshold += 1;
    }
    store.save_post(&post).await?;
    stats.new_posts += 1;
    Ok(())
}

/// Knobs for one digest run.
#[derive(Debug, Clone)]
pub struct DigestOptions {
    pub min_score: u8,
    pub limit: i64,
    pub send_notification: bool,
    pub write_tracking: bool,
    pub generate_drafts: bool,
}

impl DigestOptions {
    pub fn with_threshold(min_score: u8) -> Self {
        Self {
            min_score,
            limit: 50,
            send_notification: true,
            write_tracking: true,
            generate_drafts: true,
        }
    }
}

/// Summary of one digest run.
#[derive(Debug, Clone, Serialize)]
pub struct DigestOutcome {
    pub run_id: Uuid,
    pub selected: usize,
    pub drafted: usize,
    pub notified: usize,
    pub tracked: usize,
    pub promoted: usize,
}

/// One digest run: select candidates at or above the score floor, fill in
/// missing drafts, deliver to the configured sinks, and promote everything
/// that reached at least one sink to Sent.
///
/// Sink failures are recorded as failed actions and logged; they never abort
/// the run, and posts that reached no sink keep their status.
pub async fn run_digest(
    store: &Store,
    scoring: &ScoringConfig,
    drafter: &dyn DraftGenerator,
    notifier: Option<&dyn NotificationSink>,
    tracker: Option<&dyn TrackingSink>,
    options: &DigestOptions,
) -> anyhow::Result<DigestOutcome> {
    let run_id = Uuid::new_v4();
    let mut posts = store
        .posts_by_status(
            &[PostStatus::New, PostStatus::Queued],
            Some(options.min_score),
            options.limit,
        )
        .await
        .context("selecting digest candidates")?;

    let mut outcome = DigestOutcome {
        run_id,
        selected: posts.len(),
        drafted: 0,
        notified: 0,
        tracked: 0,
        promoted: 0,
    };

    if posts.is_empty() {
        info!(run_id = %run_id, min_score = options.min_score, "no posts eligible for digest");
        return Ok(outcome);
    }

    if options.generate_drafts {
        for post in posts.iter_mut() {
            if post.has_drafts() {
                continue;
            }
            let pair = drafter.generate(post).await;
            post.draft_a = pair.draft_a;
            post.draft_b = pair.draft_b;
            store.save_post(post).await?;
            store
                .save_action(&Action::new(&post.reddit_id, ActionType::Drafted))
                .await?;
            outcome.drafted += 1;
        }
    }

    let mut delivered = false;

    if options.send_notification {
        if let Some(notifier) = notifier {
            match notifier.send_digest(&posts, scoring).await {
                Ok(()) => {
                    for post in &posts {
                        store
                            .save_action(&Action::new(&post.reddit_id, ActionType::SentToSlack))
                            .await?;
                    }
                    outcome.notified = posts.len();
                    delivered = true;
                }
                Err(err) => {
                    warn!(run_id = %run_id, %err, "digest notification failed");
                    for post in &posts {
                        store
                            .save_action(
                                &Action::new(&post.reddit_id, ActionType::SentToSlack)
                                    .failed(err.to_string()),
                            )
                            .await?;
                    }
                }
            }
        }
    }

    if options.write_tracking {
        if let Some(tracker) = tracker {
            match tracker.upsert(&posts).await {
                Ok(()) => {
                    for post in &posts {
                        store
                            .save_action(&Action::new(&post.reddit_id, ActionType::WrittenToSheet))
                            .await?;
                    }
                    outcome.tracked = posts.len();
                    delivered = true;
                }
                Err(err) => {
                    warn!(run_id = %run_id, %err, "tracking write failed");
                    for post in &posts {
                        store
                            .save_action(
                                &Action::new(&post.reddit_id, ActionType::WrittenToSheet)
                                    .failed(err.to_string()),
                            )
                            .await?;
                    }
                }
            }
        }
    }

    if delivered {
        for post in &posts {
            if post.status == PostStatus::New {
                store.update_status(&post.reddit_id, PostStatus::Queued).await?;
            }
            store.update_status(&post.reddit_id, PostStatus::Sent).await?;
            outcome.promoted += 1;
        }
    }

    info!(
        run_id = %run_id,
        selected = outcome.selected,
        drafted = outcome.drafted,
        notified = outcome.notified,
        tracked = outcome.tracked,
        promoted = outcome.promoted,
        "digest run complete"
    );
    Ok(outcome)
}

/// Record that the operator replied to a post. Only valid from Sent.
pub async fn mark_replied(
    store: &Store,
    reddit_id: &str,
    notes: Option<&str>,
) -> anyhow::Result<Post> {
    store
        .update_status(reddit_id, PostStatus::Replied)
        .await
        .with_context(|| format!("marking {reddit_id} replied"))?;

    let mut action = Action::new(reddit_id, ActionType::MarkReplied);
    if let Some(notes) = notes {
        action = action.with_notes(notes);
    }
    store.save_action(&action).await?;

    fetch_updated(store, reddit_id).await
}

/// Drop a post from the working set. Valid from New, Queued, or Sent.
pub async fn mark_skipped(
    store: &Store,
    reddit_id: &str,
    notes: Option<&str>,
) -> anyhow::Result<Post> {
    store
        .update_status(reddit_id, PostStatus::Skipped)
        .await
        .with_context(|| format!("marking {reddit_id} skipped"))?;

    let mut action = Action::new(reddit_id, ActionType::MarkSkipped);
    if let Some(notes) = notes {
        action = action.with_notes(notes);
    }
    store.save_action(&action).await?;

    fetch_updated(store, reddit_id).await
}

/// Replace both drafts for a queued or sent post; the status is untouched.
pub async fn regenerate(
    store: &Store,
    drafter: &dyn DraftGenerator,
    reddit_id: &str,
) -> anyhow::Result<Post> {
    let mut post = store
        .get_post(reddit_id)
        .await?
        .with_context(|| format!("no post with id {reddit_id}"))?;

    if !post.status.allows_regenerate() {
        bail!(
            "cannot regenerate drafts for {reddit_id} in status {}",
            post.status
        );
    }

    let pair = drafter.generate(&post).await;
    post.draft_a = pair.draft_a;
    post.draft_b = pair.draft_b;
    store.save_post(&post).await?;
    store
        .save_action(&Action::new(reddit_id, ActionType::Drafted).with_notes("regenerated"))
        .await?;

    Ok(post)
}

async fn fetch_updated(store: &Store, reddit_id: &str) -> anyhow::Result<Post> {
    store
        .get_post(reddit_id)
        .await?
        .with_context(|| format!("no post with id {reddit_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rll_drafts::DraftPair;
    use rll_outputs::OutputError;
    use rll_sources::{FetchedPost, FixtureSource, SourceError};
    use std::sync::Mutex;

    fn fetched(reddit_id: &str, subreddit: &str, title: &str, selftext: &str) -> FetchedPost {
        FetchedPost {
            reddit_id: reddit_id.to_string(),
            subreddit: subreddit.to_string(),
            title: title.to_string(),
            selftext: selftext.to_string(),
            url: format!("https://www.reddit.com/r/{subreddit}/comments/{reddit_id}/"),
            author: "job_seeker_42".to_string(),
            created_utc: Utc::now(),
            score: 10,
            num_comments: 2,
        }
    }

    struct StaticSource {
        pages: BTreeMap<String, Vec<FetchedPost>>,
        fail: Vec<String>,
    }

    #[async_trait]
    impl PostSource for StaticSource {
        async fn fetch_subreddit(
            &self,
            subreddit: &str,
            limit: usize,
            _max_age: Duration,
        ) -> Result<Vec<FetchedPost>, SourceError> {
            if self.fail.iter().any(|s| s == subreddit) {
                return Err(SourceError::HttpStatus {
                    status: 503,
                    subreddit: subreddit.to_string(),
                });
            }
            Ok(self
                .pages
                .get(subreddit)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .take(limit)
                .collect())
        }
    }

    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingNotifier {
        async fn send_digest(
            &self,
            posts: &[Post],
            _config: &ScoringConfig,
        ) -> Result<(), OutputError> {
            if self.fail {
                return Err(OutputError::Status { status: 500 });
            }
            let mut sent = self.sent.lock().unwrap();
            sent.extend(posts.iter().map(|p| p.reddit_id.clone()));
            Ok(())
        }
    }

    struct RecordingTracker {
        rows: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TrackingSink for RecordingTracker {
        async fn upsert(&self, posts: &[Post]) -> Result<(), OutputError> {
            let mut rows = self.rows.lock().unwrap();
            rows.extend(posts.iter().map(|p| p.reddit_id.clone()));
            Ok(())
        }
    }

    struct CannedDrafter;

    #[async_trait]
    impl DraftGenerator for CannedDrafter {
        async fn generate(&self, _post: &Post) -> DraftPair {
            DraftPair {
                draft_a: "canned draft a".to_string(),
                draft_b: "canned draft b".to_string(),
            }
        }
    }

    fn high_intent(reddit_id: &str) -> FetchedPost {
        fetched(
            reddit_id,
            "resumes",
            "Need resume help, not getting interviews",
            "Applied to 200 jobs with no callbacks. Is my resume failing ATS screens? \
             Any tool recommendations for a resume review?",
        )
    }

    #[tokio::test]
    async fn fetch_queues_above_threshold_and_survives_bad_subreddits() {
        let store = Store::open_in_memory().await.unwrap();
        let scoring = ScoringConfig::default();

        let mut pages = BTreeMap::new();
        pages.insert("resumes".to_string(), vec![high_intent("lead1")]);
        pages.insert(
            "jobs".to_string(),
            vec![fetched("meh1", "jobs", "Tuesday open thread", "Chat about anything.")],
        );
        let source = StaticSource {
            pages,
            fail: vec!["layoffs".to_string()],
        };

        let subreddits: Vec<String> = ["resumes", "jobs", "layoffs"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let stats = fetch_once(&source, &store, &scoring, &subreddits, 25, Duration::hours(72))
            .await
            .unwrap();

        assert_eq!(stats.total_fetched, 2);
        assert_eq!(stats.new_posts, 2);
        assert_eq!(stats.above_threshold, 1);
        assert_eq!(stats.failed_subreddits, vec!["layoffs".to_string()]);

        let lead = store.get_post("lead1").await.unwrap().unwrap();
        assert_eq!(lead.status, PostStatus::Queued);
        assert!(lead.intent_score >= scoring.queue_threshold);
        assert!(!lead.matched_keywords.is_empty());

        let meh = store.get_post("meh1").await.unwrap().unwrap();
        assert_eq!(meh.status, PostStatus::New);
    }

    #[tokio::test]
    async fn refetch_refreshes_engagement_without_resetting_status() {
        let store = Store::open_in_memory().await.unwrap();
        let scoring = ScoringConfig::default();
        let subreddits = vec!["resumes".to_string()];

        let mut pages = BTreeMap::new();
        pages.insert("resumes".to_string(), vec![high_intent("lead1")]);
        let source = StaticSource { pages, fail: Vec::new() };
        fetch_once(&source, &store, &scoring, &subreddits, 25, Duration::hours(72))
            .await
            .unwrap();
        let first = store.get_post("lead1").await.unwrap().unwrap();

        let mut hotter = high_intent("lead1");
        hotter.score = 80;
        hotter.num_comments = 30;
        let mut pages = BTreeMap::new();
        pages.insert("resumes".to_string(), vec![hotter]);
        let source = StaticSource { pages, fail: Vec::new() };
        let stats = fetch_once(&source, &store, &scoring, &subreddits, 25, Duration::hours(72))
            .await
            .unwrap();

        assert_eq!(stats.refreshed, 1);
        assert_eq!(stats.new_posts, 0);
        let second = store.get_post("lead1").await.unwrap().unwrap();
        assert_eq!(second.status, first.status);
        assert_eq!(second.score, 80);
        assert!(second.intent_score >= first.intent_score);
    }

    #[tokio::test]
    async fn repost_with_same_fingerprint_is_marked_duplicate() {
        let store = Store::open_in_memory().await.unwrap();
        let scoring = ScoringConfig::default();
        let subreddits = vec!["resumes".to_string(), "jobs".to_string()];

        // Same text cross-posted to another subreddit under a new id.
        let original = high_intent("lead1");
        let mut repost = high_intent("copy1");
        repost.subreddit = "jobs".to_string();
        repost.title = original.title.to_uppercase();

        let mut pages = BTreeMap::new();
        pages.insert("resumes".to_string(), vec![original]);
        pages.insert("jobs".to_string(), vec![repost]);
        let source = StaticSource { pages, fail: Vec::new() };
        let stats = fetch_once(&source, &store, &scoring, &subreddits, 25, Duration::hours(72))
            .await
            .unwrap();

        assert_eq!(stats.new_posts, 1);
        assert_eq!(stats.duplicates, 1);

        let copy = store.get_post("copy1").await.unwrap().unwrap();
        assert_eq!(copy.status, PostStatus::Duplicate);
        let actions = store.actions_for("copy1").await.unwrap();
        assert_eq!(actions.len(), 1);
        assert!(actions[0].notes.contains("duplicate of lead1"));
    }

    #[tokio::test]
    async fn digest_drafts_delivers_and_promotes() {
        let store = Store::open_in_memory().await.unwrap();
        let scoring = ScoringConfig::default();
        let subreddits = vec!["resumes".to_string()];

        let mut pages = BTreeMap::new();
        pages.insert("resumes".to_string(), vec![high_intent("lead1")]);
        let source = StaticSource { pages, fail: Vec::new() };
        fetch_once(&source, &store, &scoring, &subreddits, 25, Duration::hours(72))
            .await
            .unwrap();

        let notifier = RecordingNotifier { sent: Mutex::new(Vec::new()), fail: false };
        let tracker = RecordingTracker { rows: Mutex::new(Vec::new()) };
        let options = DigestOptions::with_threshold(scoring.queue_threshold);
        let outcome = run_digest(
            &store,
            &scoring,
            &CannedDrafter,
            Some(&notifier),
            Some(&tracker),
            &options,
        )
        .await
        .unwrap();

        assert_eq!(outcome.selected, 1);
        assert_eq!(outcome.drafted, 1);
        assert_eq!(outcome.notified, 1);
        assert_eq!(outcome.tracked, 1);
        assert_eq!(outcome.promoted, 1);
        assert_eq!(*notifier.sent.lock().unwrap(), vec!["lead1".to_string()]);

        let lead = store.get_post("lead1").await.unwrap().unwrap();
        assert_eq!(lead.status, PostStatus::Sent);
        assert_eq!(lead.draft_a, "canned draft a");

        let types: Vec<String> = store
            .actions_for("lead1")
            .await
            .unwrap()
            .iter()
            .map(|a| a.action_type.as_str().to_string())
            .collect();
        assert!(types.contains(&"DRAFTED".to_string()));
        assert!(types.contains(&"SENT_TO_SLACK".to_string()));
        assert!(types.contains(&"WRITTEN_TO_SHEET".to_string()));
    }

    #[tokio::test]
    async fn digest_failure_keeps_status_and_records_failed_action() {
        let store = Store::open_in_memory().await.unwrap();
        let scoring = ScoringConfig::default();
        let subreddits = vec!["resumes".to_string()];

        let mut pages = BTreeMap::new();
        pages.insert("resumes".to_string(), vec![high_intent("lead1")]);
        let source = StaticSource { pages, fail: Vec::new() };
        fetch_once(&source, &store, &scoring, &subreddits, 25, Duration::hours(72))
            .await
            .unwrap();

        let notifier = RecordingNotifier { sent: Mutex::new(Vec::new()), fail: true };
        let mut options = DigestOptions::with_threshold(scoring.queue_threshold);
        options.write_tracking = false;
        let outcome = run_digest(
            &store,
            &scoring,
            &CannedDrafter,
            Some(&notifier),
            None,
            &options,
        )
        .await
        .unwrap();

        assert_eq!(outcome.notified, 0);
        assert_eq!(outcome.promoted, 0);

        let lead = store.get_post("lead1").await.unwrap().unwrap();
        assert_eq!(lead.status, PostStatus::Queued);

        let failed: Vec<_> = store
            .actions_for("lead1")
            .await
            .unwrap()
            .into_iter()
            .filter(|a| !a.succeeded)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].action_type, ActionType::SentToSlack);
    }

    #[tokio::test]
    async fn digest_skips_existing_drafts() {
        let store = Store::open_in_memory().await.unwrap();
        let scoring = ScoringConfig::default();

        let mut post = Post::from(high_intent("lead1"));
        post.intent_score = 90;
        post.status = PostStatus::Queued;
        post.content_hash = content_hash(&post.title, &post.selftext);
        post.draft_a = "existing draft".to_string();
        post.draft_b = "existing draft".to_string();
        store.save_post(&post).await.unwrap();

        let tracker = RecordingTracker { rows: Mutex::new(Vec::new()) };
        let options = DigestOptions::with_threshold(55);
        let outcome = run_digest(&store, &scoring, &CannedDrafter, None, Some(&tracker), &options)
            .await
            .unwrap();

        assert_eq!(outcome.drafted, 0);
        let lead = store.get_post("lead1").await.unwrap().unwrap();
        assert_eq!(lead.draft_a, "existing draft");
    }

    #[tokio::test]
    async fn operator_commands_follow_the_state_machine() {
        let store = Store::open_in_memory().await.unwrap();

        let mut post = Post::from(high_intent("lead1"));
        post.status = PostStatus::Queued;
        store.save_post(&post).await.unwrap();

        // Replied requires Sent first.
        assert!(mark_replied(&store, "lead1", None).await.is_err());

        store.update_status("lead1", PostStatus::Sent).await.unwrap();
        let replied = mark_replied(&store, "lead1", Some("they DMed back"))
            .await
            .unwrap();
        assert_eq!(replied.status, PostStatus::Replied);

        // Replied is terminal.
        assert!(mark_skipped(&store, "lead1", None).await.is_err());

        let actions = store.actions_for("lead1").await.unwrap();
        assert!(actions
            .iter()
            .any(|a| a.action_type == ActionType::MarkReplied && a.notes == "they DMed back"));
    }

    #[tokio::test]
    async fn skipping_a_sent_post_keeps_its_drafts() {
        let store = Store::open_in_memory().await.unwrap();

        let mut post = Post::from(high_intent("lead1"));
        post.status = PostStatus::Sent;
        post.draft_a = "kept a".to_string();
        post.draft_b = "kept b".to_string();
        store.save_post(&post).await.unwrap();

        let skipped = mark_skipped(&store, "lead1", Some("stale thread"))
            .await
            .unwrap();
        assert_eq!(skipped.status, PostStatus::Skipped);
        assert_eq!(skipped.draft_a, "kept a");
        assert_eq!(skipped.draft_b, "kept b");

        let actions = store.actions_for("lead1").await.unwrap();
        assert!(actions
            .iter()
            .any(|a| a.action_type == ActionType::MarkSkipped && a.notes == "stale thread"));
    }

    #[tokio::test]
    async fn regenerate_replaces_drafts_only_in_working_statuses() {
        let store = Store::open_in_memory().await.unwrap();

        let mut post = Post::from(high_intent("lead1"));
        post.status = PostStatus::Queued;
        post.draft_a = "old a".to_string();
        post.draft_b = "old b".to_string();
        store.save_post(&post).await.unwrap();

        let updated = regenerate(&store, &CannedDrafter, "lead1").await.unwrap();
        assert_eq!(updated.draft_a, "canned draft a");
        assert_eq!(updated.status, PostStatus::Queued);

        let mut fresh = Post::from(high_intent("lead2"));
        fresh.status = PostStatus::New;
        store.save_post(&fresh).await.unwrap();
        assert!(regenerate(&store, &CannedDrafter, "lead2").await.is_err());
        assert!(regenerate(&store, &CannedDrafter, "ghost").await.is_err());
    }

    #[tokio::test]
    async fn fixture_source_feeds_a_full_fetch_pass() {
        let dir = tempfile::tempdir().unwrap();
        let record = serde_json::json!([{
            "id": "fix1",
            "title": "Resume review please, no callbacks",
            "selftext": "Three months of applications and my resume gets no interviews. \
                         Happy to hear any tool recommendations.",
            "url": "https://www.reddit.com/r/resumes/comments/fix1/",
            "author": "job_seeker_42",
            "created_utc": Utc::now(),
            "score": 15,
            "num_comments": 6
        }]);
        std::fs::write(
            dir.path().join("resumes.json"),
            serde_json::to_string(&record).unwrap(),
        )
        .unwrap();

        let store = Store::open_in_memory().await.unwrap();
        let scoring = ScoringConfig::default();
        let source = FixtureSource::new(dir.path());
        let stats = fetch_once(
            &source,
            &store,
            &scoring,
            &["resumes".to_string()],
            25,
            Duration::hours(72),
        )
        .await
        .unwrap();

        assert_eq!(stats.new_posts, 1);
        assert!(store.get_post("fix1").await.unwrap().is_some());
    }
}
