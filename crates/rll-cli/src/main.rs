use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Parser, Subcommand};
use rll_core::{PostStatus, ScoringConfig, DEFAULT_SUBREDDITS};
use rll_drafts::{DraftGenerator, OpenAiGenerator, TemplateGenerator};
use rll_outputs::{CsvTracker, NotificationSink, SlackWebhookSink, TrackingSink};
use rll_pipeline::config::Config;
use rll_pipeline::DigestOptions;
use rll_sources::{FixtureSource, PostSource, RedditCredentials, RedditSource};
use rll_store::Store;
use tracing::warn;

mod render;

#[derive(Debug, Parser)]
#[command(name = "rll")]
#[command(about = "Reddit lead listener command-line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch recent posts, score them, and queue high-intent leads.
    Fetch {
        /// Subreddits to scan; defaults to the built-in list.
        #[arg(short, long)]
        subreddits: Vec<String>,
    },
    /// Draft replies for queued leads and deliver the digest.
    Digest {
        /// Score floor for inclusion; defaults to the queue threshold.
        #[arg(long)]
        min_score: Option<u8>,
        #[arg(long, default_value_t = 50)]
        limit: i64,
        /// Skip the Slack notification.
        #[arg(long)]
        no_slack: bool,
        /// Skip the tracking CSV write.
        #[arg(long)]
        no_sheet: bool,
        /// Deliver without generating missing drafts.
        #[arg(long)]
        no_drafts: bool,
    },
    /// List stored posts, highest score first.
    List {
        /// Filter to one status (NEW, QUEUED, SENT, REPLIED, SKIPPED, DUPLICATE).
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        min_score: Option<u8>,
        #[arg(long, default_value_t = 25)]
        limit: i64,
    },
    /// Show one post with drafts and action history.
    Show { reddit_id: String },
    /// Record that the lead replied to your outreach.
    MarkReplied {
        reddit_id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Drop a post from the working queue.
    MarkSkipped {
        reddit_id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Regenerate both reply drafts for a queued or sent post.
    Regenerate { reddit_id: String },
    /// Show post counts by status.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    std::fs::create_dir_all(&config.app.data_dir)
        .with_context(|| format!("creating data dir {}", config.app.data_dir.display()))?;
    let store = Store::open(config.app.database_path()).await?;

    let mut scoring = ScoringConfig::default();
    scoring.queue_threshold = config.app.intent_score_threshold;

    match cli.command {
        Commands::Fetch { subreddits } => {
            let subreddits = if subreddits.is_empty() {
                DEFAULT_SUBREDDITS.iter().map(|s| s.to_string()).collect()
            } else {
                subreddits
            };
            let source = build_source(&config)?;
            let stats = rll_pipeline::fetch_once(
                source.as_ref(),
                &store,
                &scoring,
                &subreddits,
                config.app.posts_per_subreddit,
                Duration::hours(config.app.fetch_hours_lookback),
            )
            .await?;
            print!("{}", render::fetch_summary(&stats));
        }
        Commands::Digest {
            min_score,
            limit,
            no_slack,
            no_sheet,
            no_drafts,
        } => {
            let drafter = build_drafter(&config);
            let notifier = build_notifier(&config, no_slack);
            let tracker = build_tracker(&config, no_sheet);

            let options = DigestOptions {
                min_score: min_score.unwrap_or(scoring.queue_threshold),
                limit,
                send_notification: !no_slack,
                write_tracking: !no_sheet,
                generate_drafts: !no_drafts,
            };
            let outcome = rll_pipeline::run_digest(
                &store,
                &scoring,
                drafter.as_ref(),
                notifier.as_deref(),
                tracker.as_deref(),
                &options,
            )
            .await?;
            println!("{}", render::digest_summary(&outcome));
        }
        Commands::List {
            status,
            min_score,
            limit,
        } => {
            let statuses: Vec<PostStatus> = match status {
                Some(raw) => vec![raw.parse()?],
                None => vec![PostStatus::New, PostStatus::Queued, PostStatus::Sent],
            };
            let posts = store.posts_by_status(&statuses, min_score, limit).await?;
            if posts.is_empty() {
                println!("no matching posts");
            }
            for post in &posts {
                println!("{}", render::post_line(post));
            }
        }
        Commands::Show { reddit_id } => {
            let post = store
                .get_post(&reddit_id)
                .await?
                .with_context(|| format!("no post with id {reddit_id}"))?;
            let actions = store.actions_for(&reddit_id).await?;
            print!("{}", render::post_detail(&post, &actions, &scoring));
        }
        Commands::MarkReplied { reddit_id, notes } => {
            let post = rll_pipeline::mark_replied(&store, &reddit_id, notes.as_deref()).await?;
            println!("{}", render::post_line(&post));
        }
        Commands::MarkSkipped { reddit_id, notes } => {
            let post = rll_pipeline::mark_skipped(&store, &reddit_id, notes.as_deref()).await?;
            println!("{}", render::post_line(&post));
        }
        Commands::Regenerate { reddit_id } => {
            let drafter = build_drafter(&config);
            let post = rll_pipeline::regenerate(&store, drafter.as_ref(), &reddit_id).await?;
            print!("{}", render::post_detail(&post, &[], &scoring));
        }
        Commands::Stats => {
            let stats = store.stats().await?;
            print!("{}", render::store_stats(&stats));
        }
    }

    Ok(())
}

fn build_source(config: &Config) -> Result<Box<dyn PostSource>> {
    if config.app.dry_run || !config.reddit.is_configured() {
        if !config.app.dry_run {
            warn!("reddit credentials not set, reading fixtures instead");
        }
        return Ok(Box::new(FixtureSource::new(config.app.fixtures_dir())));
    }
    let source = RedditSource::new(RedditCredentials {
        client_id: config.reddit.client_id.clone(),
        client_secret: config.reddit.client_secret.clone(),
        user_agent: config.reddit.user_agent.clone(),
    })?;
    Ok(Box::new(source))
}

fn build_drafter(config: &Config) -> Box<dyn DraftGenerator> {
    if config.app.dry_run || !config.openai.is_configured() {
        return Box::new(TemplateGenerator);
    }
    Box::new(OpenAiGenerator::new(
        config.openai.api_key.clone(),
        config.openai.model.clone(),
    ))
}

fn build_notifier(config: &Config, disabled: bool) -> Option<Box<dyn NotificationSink>> {
    if disabled || config.app.dry_run {
        return None;
    }
    if !config.slack.is_configured() {
        warn!("SLACK_WEBHOOK_URL not set, skipping notification");
        return None;
    }
    Some(Box::new(SlackWebhookSink::new(
        config.slack.webhook_url.clone(),
    )))
}

fn build_tracker(config: &Config, disabled: bool) -> Option<Box<dyn TrackingSink>> {
    if disabled || config.app.dry_run {
        return None;
    }
    Some(Box::new(CsvTracker::new(config.app.tracking_csv_path())))
}
