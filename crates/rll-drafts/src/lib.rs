//! Reply draft generation: LLM-backed with a deterministic template
//! fallback, plus compliance validation for the generated text.

pub mod templates;

use async_trait::async_trait;
use rll_core::Post;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

pub const CRATE_NAME: &str = "rll-drafts";

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("llm api returned status {status}")]
    Api { status: u16 },
    #[error("llm response had no parsable drafts")]
    Unparsable,
}

/// A pair of reply drafts: variant A never mentions the product, variant B
/// may carry one soft mention when the post permits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftPair {
    pub draft_a: String,
    pub draft_b: String,
}

/// Text-in/text-out drafting contract; no side effects on the post.
#[async_trait]
pub trait DraftGenerator: Send + Sync {
    async fn generate(&self, post: &Post) -> DraftPair;
}

/// Deterministic template-based generator, also the fallback path when the
/// LLM is unavailable or returns something unparsable.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    pub fn drafts_for(post: &Post) -> DraftPair {
        let kind = templates::select_template(&post.title, &post.selftext);
        let (draft_a, draft_b) = templates::template_drafts(kind);
        if post.mention_allowed {
            DraftPair {
                draft_a: draft_a.to_string(),
                draft_b: draft_b.to_string(),
            }
        } else {
            DraftPair {
                draft_a: draft_a.to_string(),
                draft_b: draft_a.to_string(),
            }
        }
    }
}

#[async_trait]
impl DraftGenerator for TemplateGenerator {
    async fn generate(&self, post: &Post) -> DraftPair {
        Self::drafts_for(post)
    }
}

/// OpenAI chat-completions generator. Any failure falls back to templates;
/// drafting never aborts a digest run.
#[derive(Debug)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    async fn request_drafts(&self, post: &Post) -> Result<DraftPair, DraftError> {
        let user_prompt = templates::user_prompt(
            &post.subreddit,
            &post.title,
            &post.selftext,
            post.mention_allowed,
        );

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": templates::SYSTEM_PROMPT},
                    {"role": "user", "content": user_prompt},
                ],
                "temperature": 0.7,
                "max_tokens": 1500,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DraftError::Api {
                status: response.status().as_u16(),
            });
        }

        let completion: ChatCompletion = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(DraftError::Unparsable)?;

        parse_llm_response(&content).ok_or(DraftError::Unparsable)
    }
}

#[async_trait]
impl DraftGenerator for OpenAiGenerator {
    async fn generate(&self, post: &Post) -> DraftPair {
        match self.request_drafts(post).await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(reddit_id = %post.reddit_id, %err, "llm drafting failed, using templates");
                TemplateGenerator::drafts_for(post)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

fn extract_between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let until = text[from..].find(end)? + from;
    Some(text[from..until].trim())
}

/// Extract the two drafts from a marker-delimited LLM response, with a
/// looser "Draft B" split as a second chance for near-miss formatting.
pub fn parse_llm_response(content: &str) -> Option<DraftPair> {
    let draft_a = extract_between(content, "---DRAFT_A---", "---END_DRAFT_A---");
    let draft_b = extract_between(content, "---DRAFT_B---", "---END_DRAFT_B---");

    if let (Some(a), Some(b)) = (draft_a, draft_b) {
        if !a.is_empty() && !b.is_empty() {
            return Some(DraftPair {
                draft_a: a.to_string(),
                draft_b: b.to_string(),
            });
        }
    }

    let (head, tail) = content.split_once("Draft B")?;
    let clean = |part: &str| {
        part.replace("Draft A", "")
            .replace("---", "")
            .trim_start_matches([':', ' ', '\n'])
            .trim()
            .to_string()
    };
    let draft_a = clean(head);
    let draft_b = clean(tail);
    if draft_a.is_empty() || draft_b.is_empty() {
        return None;
    }
    Some(DraftPair { draft_a, draft_b })
}

const FORBIDDEN_PHRASES: [&str; 10] = [
    "sign up",
    "check out our",
    "my startup",
    "we're launching",
    "game changer",
    "revolutionize",
    "click here",
    "limited time",
    "discount",
    "promo code",
];

const PROMO_INDICATORS: [&str; 5] =
    ["best tool", "amazing", "incredible", "must try", "you need to"];

/// Check a draft against the engagement guidelines. Returns warnings for the
/// operator; nothing here blocks delivery.
pub fn validate_draft(draft: &str) -> Vec<String> {
    let mut warnings = Vec::new();
    let lower = draft.to_lowercase();

    for phrase in FORBIDDEN_PHRASES {
        if lower.contains(phrase) {
            warnings.push(format!("Contains forbidden phrase: '{phrase}'"));
        }
    }

    if lower.contains("http://") || lower.contains("https://") {
        warnings.push("Contains URL link".to_string());
    }

    let mention_count = lower.matches("hirelab").count();
    if mention_count > 1 {
        warnings.push(format!(
            "Mentions HireLab {mention_count} times (should be max 1)"
        ));
    }

    let promo_hits = PROMO_INDICATORS
        .iter()
        .filter(|indicator| lower.contains(*indicator))
        .count();
    if promo_hits >= 2 {
        warnings.push("Draft may sound too promotional".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fixture_post(title: &str, selftext: &str, mention_allowed: bool) -> Post {
        let mut post = Post::new(
            "abc123",
            "resumes",
            title,
            selftext,
            "https://www.reddit.com/r/resumes/comments/abc123/",
            "job_seeker_42",
            Utc::now(),
            10,
            2,
        );
        post.mention_allowed = mention_allowed;
        post
    }

    #[test]
    fn marker_response_parses() {
        let content = "---DRAFT_A---\nFirst draft text.\n---END_DRAFT_A---\n\
                       ---DRAFT_B---\nSecond draft text.\n---END_DRAFT_B---";
        let pair = parse_llm_response(content).unwrap();
        assert_eq!(pair.draft_a, "First draft text.");
        assert_eq!(pair.draft_b, "Second draft text.");
    }

    #[test]
    fn loose_split_parses_near_miss_formatting() {
        let content = "Draft A: here is the first reply.\n\nDraft B: here is the second reply.";
        let pair = parse_llm_response(content).unwrap();
        assert_eq!(pair.draft_a, "here is the first reply.");
        assert_eq!(pair.draft_b, "here is the second reply.");
    }

    #[test]
    fn garbage_response_is_rejected() {
        assert!(parse_llm_response("no drafts anywhere in here").is_none());
        assert!(parse_llm_response("").is_none());
    }

    #[tokio::test]
    async fn templates_without_mention_permission_repeat_draft_a() {
        let post = fixture_post("My resume fails ATS parsing", "details here", false);
        let pair = TemplateGenerator.generate(&post).await;
        assert_eq!(pair.draft_a, pair.draft_b);
        assert!(!pair.draft_a.contains("HireLab"));
    }

    #[tokio::test]
    async fn templates_with_mention_permission_use_variant_b() {
        let post = fixture_post("My resume fails ATS parsing", "what tool helps?", true);
        let pair = TemplateGenerator.generate(&post).await;
        assert_ne!(pair.draft_a, pair.draft_b);
        assert!(!pair.draft_a.contains("HireLab"));
        assert!(pair.draft_b.contains("HireLab"));
    }

    #[test]
    fn template_drafts_pass_their_own_validation() {
        let post = fixture_post("My resume fails ATS parsing", "what tool helps?", true);
        let pair = TemplateGenerator::drafts_for(&post);
        assert!(validate_draft(&pair.draft_a).is_empty());
        assert!(validate_draft(&pair.draft_b).is_empty());
    }

    #[test]
    fn validation_flags_promotional_text() {
        let warnings = validate_draft(
            "This is a game changer, sign up at https://example.com - HireLab HireLab",
        );
        assert!(warnings.iter().any(|w| w.contains("game changer")));
        assert!(warnings.iter().any(|w| w.contains("sign up")));
        assert!(warnings.iter().any(|w| w.contains("URL")));
        assert!(warnings.iter().any(|w| w.contains("2 times")));
    }
}
