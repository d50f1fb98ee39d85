//! Env-backed service configuration. Missing optional credentials degrade a
//! feature (fixture mode, template drafts, skipped sinks); they never panic.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub webhook_url: String,
}

impl SlackConfig {
    pub fn is_configured(&self) -> bool {
        !self.webhook_url.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
}

impl OpenAiConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub intent_score_threshold: u8,
    pub fetch_hours_lookback: i64,
    pub posts_per_subreddit: usize,
    pub data_dir: PathBuf,
    pub dry_run: bool,
}

impl AppConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("listener.sqlite")
    }

    pub fn tracking_csv_path(&self) -> PathBuf {
        self.data_dir.join("queue.csv")
    }

    pub fn fixtures_dir(&self) -> PathBuf {
        self.data_dir.join("fixtures")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub reddit: RedditConfig,
    pub slack: SlackConfig,
    pub openai: OpenAiConfig,
    pub app: AppConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            reddit: RedditConfig {
                client_id: env_or("REDDIT_CLIENT_ID", ""),
                client_secret: env_or("REDDIT_CLIENT_SECRET", ""),
                user_agent: env_or("REDDIT_USER_AGENT", "rll-listener:v1 (by /u/yourusername)"),
            },
            slack: SlackConfig {
                webhook_url: env_or("SLACK_WEBHOOK_URL", ""),
            },
            openai: OpenAiConfig {
                api_key: env_or("OPENAI_API_KEY", ""),
                model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            },
            app: AppConfig {
                intent_score_threshold: env_or("INTENT_SCORE_THRESHOLD", "55")
                    .parse()
                    .unwrap_or(55),
                fetch_hours_lookback: env_or("FETCH_HOURS_LOOKBACK", "72").parse().unwrap_or(72),
                posts_per_subreddit: env_or("POSTS_PER_SUBREDDIT", "25").parse().unwrap_or(25),
                data_dir: std::env::var("RLL_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./data")),
                dry_run: matches!(
                    env_or("DRY_RUN", "false").as_str(),
                    "1" | "true" | "TRUE" | "True"
                ),
            },
        }
    }
}
