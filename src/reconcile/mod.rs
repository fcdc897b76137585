// Reconciliation core — diff-and-apply passes over teams, posts, and users.
//
// Everything a pass needs travels in one SyncContext value: the two
// adapters, the mirror store, the reconciliation settings, and the two
// named pass locks. No global state.

pub mod posts;
pub mod teams;
pub mod users;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::forum::traits::ForumApi;
use crate::mirror::MirrorStore;
use crate::scoring::traits::ScoringApi;

/// Settings a reconciliation pass consults. Extracted from Config so tests
/// can build them directly.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Directory of post definition files.
    pub posts_dir: PathBuf,
    /// Colors for created team categories.
    pub category_color: String,
    pub category_text_color: String,
    /// Extra groups granted access to every team category.
    pub category_access: Vec<String>,
    /// Non-empty restricts publication to these team display names.
    pub team_allowlist: Vec<String>,
}

impl SyncSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            posts_dir: config.posts_dir.clone(),
            category_color: config.category_color.clone(),
            category_text_color: config.category_text_color.clone(),
            category_access: config.category_access.clone(),
            team_allowlist: config.team_allowlist.clone(),
        }
    }
}

/// Shared context for all reconciliation passes.
///
/// The two locks serialize passes independently: at most one team pass and
/// at most one post pass are ever in flight, whichever driver asked — but a
/// team pass and a post pass may run concurrently.
pub struct SyncContext {
    pub scoring: Arc<dyn ScoringApi>,
    pub forum: Arc<dyn ForumApi>,
    pub mirror: Arc<dyn MirrorStore>,
    pub settings: SyncSettings,
    pub(crate) team_lock: Mutex<()>,
    pub(crate) post_lock: Mutex<()>,
}

impl SyncContext {
    pub fn new(
        scoring: Arc<dyn ScoringApi>,
        forum: Arc<dyn ForumApi>,
        mirror: Arc<dyn MirrorStore>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            scoring,
            forum,
            mirror,
            settings,
            team_lock: Mutex::new(()),
            post_lock: Mutex::new(()),
        }
    }
}
