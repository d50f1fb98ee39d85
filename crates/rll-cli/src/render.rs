//! Plain-text console rendering for posts, runs, and store stats.

use rll_core::{match_reasons, Action, Post, ScoringConfig};
use rll_pipeline::{DigestOutcome, FetchStats};
use rll_store::StoreStats;

pub fn post_line(post: &Post) -> String {
    format!(
        "{:>3}  {:<10} r/{:<20} {}  {}",
        post.intent_score,
        post.status,
        post.subreddit,
        post.reddit_id,
        truncate(&post.title, 70),
    )
}

pub fn post_detail(post: &Post, actions: &[Action], config: &ScoringConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} (r/{})\n", post.title, post.subreddit));
    out.push_str(&format!("  id:         {}\n", post.reddit_id));
    out.push_str(&format!("  url:        {}\n", post.url));
    out.push_str(&format!("  author:     u/{}\n", post.author));
    out.push_str(&format!(
        "  status:     {}   score: {}   mention ok: {}\n",
        post.status, post.intent_score, post.mention_allowed
    ));
    out.push_str(&format!(
        "  engagement: {} upvotes, {} comments\n",
        post.score, post.num_comments
    ));
    out.push_str(&format!(
        "  posted:     {}   last seen: {}\n",
        post.created_utc.format("%Y-%m-%d %H:%M UTC"),
        post.last_seen_at.format("%Y-%m-%d %H:%M UTC"),
    ));

    let reasons = match_reasons(config, post);
    if !reasons.is_empty() {
        out.push_str("  why:\n");
        for reason in reasons {
            out.push_str(&format!("    - {reason}\n"));
        }
    }

    if !post.selftext.is_empty() {
        out.push_str(&format!("\n{}\n", truncate(&post.selftext, 600)));
    }

    if post.has_drafts() {
        out.push_str("\n--- Draft A ---\n");
        out.push_str(&post.draft_a);
        out.push('\n');
        if post.draft_b != post.draft_a {
            out.push_str("\n--- Draft B ---\n");
            out.push_str(&post.draft_b);
            out.push('\n');
        }
    }

    if !actions.is_empty() {
        out.push_str("\nhistory:\n");
        for action in actions {
            let status = if action.succeeded { "ok" } else { "FAILED" };
            let notes = if action.notes.is_empty() {
                String::new()
            } else {
                format!("  ({})", action.notes)
            };
            out.push_str(&format!(
                "  {}  {:<16} {}{}\n",
                action.created_at.format("%Y-%m-%d %H:%M"),
                action.action_type,
                status,
                notes,
            ));
        }
    }

    out
}

pub fn fetch_summary(stats: &FetchStats) -> String {
    let mut out = format!(
        "fetch complete: run_id={} fetched={} new={} refreshed={} duplicates={} queued={}\n",
        stats.run_id,
        stats.total_fetched,
        stats.new_posts,
        stats.refreshed,
        stats.duplicates,
        stats.above_threshold,
    );
    for (subreddit, count) in &stats.by_subreddit {
        out.push_str(&format!("  r/{subreddit}: {count}\n"));
    }
    for subreddit in &stats.failed_subreddits {
        out.push_str(&format!("  r/{subreddit}: FETCH FAILED\n"));
    }
    out
}

pub fn digest_summary(outcome: &DigestOutcome) -> String {
    format!(
        "digest complete: run_id={} selected={} drafted={} notified={} tracked={} promoted={}",
        outcome.run_id,
        outcome.selected,
        outcome.drafted,
        outcome.notified,
        outcome.tracked,
        outcome.promoted,
    )
}

pub fn store_stats(stats: &StoreStats) -> String {
    let mut out = format!(
        "{} posts, {} actions\n",
        stats.total_posts, stats.total_actions
    );
    for (status, count) in &stats.by_status {
        out.push_str(&format!("  {status:<10} {count}\n"));
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}
