//! Intent scoring: deterministic keyword/phrase heuristic over post text.

use crate::config::ScoringConfig;

/// Result of scoring one post, with enough breakdown to explain the match.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub score: u8,
    pub matched_keywords: Vec<String>,
    pub subreddit_weight: f64,
    pub engagement_bonus: f64,
    pub had_negative_keywords: bool,
}

/// Lowercase and collapse runs of whitespace for substring matching.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compute the intent score for a post.
///
/// Keyword and phrase bonuses are capped independently, the subreddit weight
/// multiplies only that subtotal, and engagement/negative adjustments apply
/// afterwards. The final value is clamped to [0, 100] and rounded.
pub fn score_post(
    config: &ScoringConfig,
    title: &str,
    selftext: &str,
    subreddit: &str,
    upvotes: i64,
    num_comments: i64,
) -> ScoreBreakdown {
    let combined = normalize_text(&format!("{title} {selftext}"));

    let mut matched_phrases = Vec::new();
    let mut phrase_score = 0.0;
    for phrase in &config.high_intent_phrases {
        if combined.contains(&phrase.to_lowercase()) {
            phrase_score += config.phrase_bonus;
            matched_phrases.push(phrase.clone());
        }
    }
    let phrase_score = phrase_score.min(config.phrase_cap);

    let mut matched_keywords = Vec::new();
    let mut keyword_score = 0.0;
    for keyword in &config.positive_keywords {
        let needle = keyword.to_lowercase();
        if !combined.contains(&needle) {
            continue;
        }
        if config.exclusive_phrases
            && matched_phrases
                .iter()
                .any(|phrase| phrase.to_lowercase().contains(&needle))
        {
            continue;
        }
        keyword_score += config.keyword_bonus;
        matched_keywords.push(keyword.clone());
    }
    let keyword_score = keyword_score.min(config.keyword_cap);

    let subreddit_weight = config.subreddit_weight(subreddit);
    let mut intent_score = (keyword_score + phrase_score) * subreddit_weight;

    // Negative upvote totals would make ln(1 + x) undefined.
    let engagement = (upvotes + num_comments).max(0) as f64;
    let engagement_bonus = (engagement.ln_1p() * config.engagement_scale).min(config.engagement_cap);
    intent_score += engagement_bonus;

    let mut negative_score = 0.0;
    for keyword in &config.negative_keywords {
        if combined.contains(&keyword.to_lowercase()) {
            negative_score += config.negative_penalty;
        }
    }
    intent_score -= negative_score.min(config.negative_cap);
    let had_negative_keywords = negative_score > 0.0;

    if selftext.trim().chars().count() < config.short_body_chars {
        intent_score -= config.short_body_penalty;
    }

    for phrase in matched_phrases {
        if !matched_keywords.contains(&phrase) {
            matched_keywords.push(phrase);
        }
    }

    ScoreBreakdown {
        score: intent_score.clamp(0.0, 100.0).round() as u8,
        matched_keywords,
        subreddit_weight,
        engagement_bonus,
        had_negative_keywords,
    }
}

const HOSTILE_INDICATORS: [&str; 5] =
    ["spam", "promotion", "sick of", "hate these", "stop promoting"];

/// Whether a soft product mention is appropriate for this post.
///
/// Never in r/recruitinghell, never when the post reads hostile to tool
/// promotion, and otherwise only when the author is asking about tooling.
pub fn mention_allowed(
    config: &ScoringConfig,
    title: &str,
    selftext: &str,
    subreddit: &str,
) -> bool {
    if subreddit.eq_ignore_ascii_case("recruitinghell") {
        return false;
    }

    let combined = normalize_text(&format!("{title} {selftext}"));
    if HOSTILE_INDICATORS.iter().any(|hit| combined.contains(hit)) {
        return false;
    }

    config
        .mention_phrases
        .iter()
        .any(|phrase| combined.contains(&phrase.to_lowercase()))
}

/// Human-readable reasons a post matched, for digests and notifications.
pub fn match_reasons(config: &ScoringConfig, post: &crate::model::Post) -> Vec<String> {
    let mut reasons = Vec::new();

    if !post.matched_keywords.is_empty() {
        let shown: Vec<&str> = post
            .matched_keywords
            .iter()
            .take(5)
            .map(String::as_str)
            .collect();
        reasons.push(format!("Keywords: {}", shown.join(", ")));
    }

    if config.subreddit_weight(&post.subreddit) > 1.0 {
        reasons.push(format!("High-value subreddit (r/{})", post.subreddit));
    }

    if post.score > 10 || post.num_comments > 5 {
        reasons.push(format!(
            "Engagement: {} upvotes, {} comments",
            post.score, post.num_comments
        ));
    }

    reasons
}
