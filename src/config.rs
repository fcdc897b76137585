use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    /// Base URL of the scoring engine API.
    pub scoring_url: String,
    /// Admin API key for the scoring engine.
    pub scoring_key: String,
    /// Base URL of the forum platform.
    pub forum_url: String,
    /// Forum admin API key.
    pub forum_key: String,
    /// Forum username the API key belongs to (posts are authored as this
    /// user unless a definition carries its own credentials).
    pub forum_user: String,
    /// Path to the local mirror database.
    pub db_path: String,
    /// Directory holding post definition files (one .toml per definition).
    pub posts_dir: PathBuf,
    /// Interval between catch-all reconciliation passes in daemon mode.
    pub poll_interval: Duration,
    /// Background color for created team categories (hex, no '#').
    pub category_color: String,
    /// Text color for created team categories (hex, no '#').
    pub category_text_color: String,
    /// Extra forum groups granted access to every team category
    /// (e.g. an admins group), on top of the team's own group.
    pub category_access: Vec<String>,
    /// When non-empty, publication is restricted to teams with these
    /// display names. Empty means all teams.
    pub team_allowlist: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only paths and timings have defaults — the two service URLs are
    /// required for anything beyond `init` and `status`.
    pub fn load() -> Result<Self> {
        let poll_secs: u64 = match env::var("HERALD_POLL_INTERVAL") {
            Ok(v) => v.parse().map_err(|_| {
                anyhow::anyhow!("HERALD_POLL_INTERVAL must be a number of seconds, got {v:?}")
            })?,
            Err(_) => 30,
        };

        Ok(Self {
            scoring_url: env::var("HERALD_SCORING_URL").unwrap_or_default(),
            scoring_key: env::var("HERALD_SCORING_KEY").unwrap_or_default(),
            forum_url: env::var("HERALD_FORUM_URL").unwrap_or_default(),
            forum_key: env::var("HERALD_FORUM_KEY").unwrap_or_default(),
            forum_user: env::var("HERALD_FORUM_USER").unwrap_or_else(|_| "system".to_string()),
            db_path: env::var("HERALD_DB_PATH").unwrap_or_else(|_| "./herald.db".to_string()),
            posts_dir: env::var("HERALD_POSTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./posts")),
            poll_interval: Duration::from_secs(poll_secs),
            category_color: env::var("HERALD_CATEGORY_COLOR")
                .unwrap_or_else(|_| "0088CC".to_string()),
            category_text_color: env::var("HERALD_CATEGORY_TEXT_COLOR")
                .unwrap_or_else(|_| "FFFFFF".to_string()),
            category_access: split_list(&env::var("HERALD_CATEGORY_ACCESS").unwrap_or_default()),
            team_allowlist: split_list(&env::var("HERALD_TEAM_ALLOWLIST").unwrap_or_default()),
        })
    }

    /// Check that the scoring engine endpoint is configured.
    /// Call this before any operation that reads the roster or scores.
    pub fn require_scoring(&self) -> Result<()> {
        if self.scoring_url.is_empty() {
            anyhow::bail!(
                "HERALD_SCORING_URL not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }

    /// Check that the forum endpoint and credentials are configured.
    /// Call this before any operation that touches the forum platform.
    pub fn require_forum(&self) -> Result<()> {
        if self.forum_url.is_empty() {
            anyhow::bail!(
                "HERALD_FORUM_URL not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        if self.forum_key.is_empty() {
            anyhow::bail!("HERALD_FORUM_KEY not set. Forum writes require an admin API key.");
        }
        Ok(())
    }
}

/// Split a comma-separated env value into trimmed, non-empty entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
