//! Content fingerprinting for cross-post and repost detection.

use sha2::{Digest, Sha256};

/// Normalize text for hashing: lowercase, drop punctuation, collapse
/// whitespace, truncate to the first 500 chars. Aggressive enough to absorb
/// the formatting noise cross-posting tools introduce, but still an exact
/// text match, never a similarity measure.
pub fn normalize_for_hash(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(500)
        .collect()
}

/// Stable fingerprint over normalized title + body.
pub fn content_hash(title: &str, selftext: &str) -> String {
    let combined = format!(
        "{}|{}",
        normalize_for_hash(title),
        normalize_for_hash(selftext)
    );

    let mut hasher = Sha256::new();
    hasher.update(combined.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_under_case_and_whitespace() {
        let a = content_hash("Resume Review Please", "I keep getting ghosted.");
        let b = content_hash("resume   review please  ", "i keep getting GHOSTED");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_ignores_punctuation() {
        let a = content_hash("No interviews?!", "What am I doing wrong...");
        let b = content_hash("No interviews", "What am I doing wrong");
        assert_eq!(a, b);
    }

    #[test]
    fn different_content_produces_different_fingerprints() {
        let a = content_hash("Resume review", "first body");
        let b = content_hash("Resume review", "second body");
        assert_ne!(a, b);
    }

    #[test]
    fn title_and_body_do_not_bleed_together() {
        let a = content_hash("one two", "three");
        let b = content_hash("one", "two three");
        assert_ne!(a, b);
    }

    #[test]
    fn normalization_truncates_long_bodies() {
        let long_body = "word ".repeat(400);
        assert_eq!(normalize_for_hash(&long_body).chars().count(), 500);
    }

    #[test]
    fn fingerprint_is_hex_sha256() {
        let hash = content_hash("title", "body");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
