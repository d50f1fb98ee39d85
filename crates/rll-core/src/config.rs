//! Immutable scoring configuration: keyword tables, weights, caps.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Everything the intent scorer and mention gate need, passed by reference
/// so scoring stays pure and testable with custom tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub positive_keywords: Vec<String>,
    pub high_intent_phrases: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub mention_phrases: Vec<String>,
    pub subreddit_weights: HashMap<String, f64>,

    pub keyword_bonus: f64,
    pub keyword_cap: f64,
    pub phrase_bonus: f64,
    pub phrase_cap: f64,
    pub engagement_scale: f64,
    pub engagement_cap: f64,
    pub negative_penalty: f64,
    pub negative_cap: f64,
    pub short_body_penalty: f64,
    pub short_body_chars: usize,

    /// Score at or above which a new post is queued for drafting.
    pub queue_threshold: u8,
    /// When true, a keyword contained in an already-matched high-intent
    /// phrase does not also count as a keyword match.
    pub exclusive_phrases: bool,
}

impl ScoringConfig {
    pub fn subreddit_weight(&self, subreddit: &str) -> f64 {
        self.subreddit_weights.get(subreddit).copied().unwrap_or(1.0)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            positive_keywords: owned(&[
                "resume",
                "cv",
                "ats",
                "no interviews",
                "rejected",
                "ghosted",
                "recruiter",
                "application",
                "cover letter",
                "screening",
                "parse",
                "job search",
                "internship",
                "entry level",
                "job hunting",
                "applying",
                "applications",
                "hiring manager",
                "tailoring",
                "customize",
                "keywords",
            ]),
            high_intent_phrases: owned(&[
                "no interviews",
                "ats",
                "rejected",
                "not getting callbacks",
                "not hearing back",
                "resume review",
                "resume help",
                "what tool",
                "any tool",
                "resume parser",
                "keyword optimization",
                "tailor my resume",
            ]),
            negative_keywords: owned(&[
                "survey",
                "research study",
                "giveaway",
                "promo",
                "discord",
                "my product",
                "affiliate",
                "spam",
                "promotion",
                "advertisement",
                "selling",
            ]),
            mention_phrases: owned(&[
                "ats",
                "resume parser",
                "keyword optimization",
                "formatting",
                "tailoring",
                "job application track",
                "what tool",
                "any tool",
                "recommend a tool",
                "tool recommendation",
                "software",
                "app for",
                "application for",
            ]),
            subreddit_weights: [
                ("resumes", 1.2),
                ("EngineeringResumes", 1.2),
                ("careerguidance", 1.1),
                ("internships", 1.1),
                ("jobs", 1.0),
                ("cscareerquestions", 1.0),
                ("layoffs", 1.0),
                ("recruitinghell", 0.85),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            keyword_bonus: 5.0,
            keyword_cap: 40.0,
            phrase_bonus: 10.0,
            phrase_cap: 30.0,
            engagement_scale: 3.0,
            engagement_cap: 15.0,
            negative_penalty: 15.0,
            negative_cap: 30.0,
            short_body_penalty: 10.0,
            short_body_chars: 20,
            queue_threshold: 55,
            exclusive_phrases: false,
        }
    }
}

/// Subreddits monitored when the operator does not name any.
pub const DEFAULT_SUBREDDITS: [&str; 8] = [
    "resumes",
    "careerguidance",
    "jobs",
    "cscareerquestions",
    "EngineeringResumes",
    "internships",
    "layoffs",
    "recruitinghell",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_subreddit_weight_defaults_to_one() {
        let config = ScoringConfig::default();
        assert_eq!(config.subreddit_weight("resumes"), 1.2);
        assert_eq!(config.subreddit_weight("recruitinghell"), 0.85);
        assert_eq!(config.subreddit_weight("AskReddit"), 1.0);
    }

    #[test]
    fn default_tables_are_populated() {
        let config = ScoringConfig::default();
        assert!(!config.positive_keywords.is_empty());
        assert!(!config.high_intent_phrases.is_empty());
        assert!(!config.negative_keywords.is_empty());
        assert_eq!(config.queue_threshold, 55);
        assert!(!config.exclusive_phrases);
    }
}
