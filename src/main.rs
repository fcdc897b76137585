use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use herald::config::Config;
use herald::forum::client::ForumClient;
use herald::mirror::MirrorStore;
use herald::reconcile::{posts, teams, users, SyncContext, SyncSettings};
use herald::scoring::client::ScoringClient;

/// Herald: forum sync daemon for a CTF scoring engine.
///
/// Keeps a forum's groups, categories, topics, and user approvals in step
/// with the competition's teams, flags, and scores. The scoring engine is
/// the source of truth; the forum follows.
#[derive(Parser)]
#[command(name = "herald", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the local mirror database
    Init,

    /// Run one full pass: teams, pending users, posts
    Sync,

    /// Process events as they arrive (plus a periodic catch-all pass)
    Daemon,

    /// Manually publish a post definition, bypassing its trigger
    Trigger {
        /// The definition name (file stem under the posts directory)
        name: String,
    },

    /// Show system status (mirror stats, definitions on disk)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("herald=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing mirror database...");
            let config = Config::load()?;
            let mirror = herald::mirror::initialize(&config.db_path)?;
            let table_count = mirror.table_count().await?;
            println!("Mirror initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nHerald is ready. Next step: set up your .env file");
            println!("  (see .env.example for required variables)");
            println!("\nThen run: herald sync");
        }

        Commands::Sync => {
            let config = Config::load()?;
            config.require_scoring()?;
            config.require_forum()?;
            let ctx = build_context(&config)?;

            println!("Reconciling teams...");
            teams::reconcile_teams(&ctx).await?;

            println!("Processing pending users...");
            users::process_new_users(&ctx).await?;

            println!("Reconciling posts...");
            posts::reconcile_posts(&ctx).await?;

            println!("Sync complete.");
        }

        Commands::Daemon => {
            let config = Config::load()?;
            config.require_scoring()?;
            config.require_forum()?;
            let ctx = Arc::new(build_context(&config)?);

            let scoring = ScoringClient::new(&config.scoring_url, &config.scoring_key)?;

            // Only returns on a terminal driver failure.
            herald::daemon::run(ctx, scoring, config.poll_interval).await?;
        }

        Commands::Trigger { name } => {
            let config = Config::load()?;
            config.require_scoring()?;
            config.require_forum()?;
            let ctx = build_context(&config)?;

            println!("Publishing {name:?}...");
            posts::trigger_post(&ctx, &name).await?;
            println!("Done.");
        }

        Commands::Status => {
            let config = Config::load()?;
            let mirror = open_mirror(&config)?;
            herald::status::show(&mirror, &config.db_path, &config.posts_dir, config.poll_interval)
                .await?;
        }
    }

    Ok(())
}

/// Wire up the two adapters and the mirror into a reconciliation context.
fn build_context(config: &Config) -> Result<SyncContext> {
    let scoring = ScoringClient::new(&config.scoring_url, &config.scoring_key)?;
    let forum = ForumClient::new(&config.forum_url, &config.forum_key, &config.forum_user)?;
    let mirror = open_mirror(config)?;

    Ok(SyncContext::new(
        Arc::new(scoring),
        Arc::new(forum),
        mirror,
        SyncSettings::from_config(config),
    ))
}

fn open_mirror(config: &Config) -> Result<Arc<dyn MirrorStore>> {
    herald::mirror::open(&config.db_path)
}
