// Shared test fixtures: in-memory mock adapters that record every
// mutation, plus a temp-file mirror store.
//
// The mutation log is what the idempotence properties assert against —
// a converged second pass must issue zero forum writes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use herald::error::ApiError;
use herald::forum::categories::Category;
use herald::forum::client::ApiCredentials;
use herald::forum::groups::Group;
use herald::forum::traits::ForumApi;
use herald::forum::users::{PendingUser, UserDetail};
use herald::mirror::MirrorStore;
use herald::reconcile::{SyncContext, SyncSettings};
use herald::scoring::client::{ScoreEntry, Team};
use herald::scoring::traits::ScoringApi;

// --- Scoring mock ---

pub struct MockScoring {
    pub teams: Mutex<Vec<Team>>,
    pub scores: Mutex<Vec<ScoreEntry>>,
}

impl MockScoring {
    pub fn new(teams: Vec<Team>, scores: Vec<ScoreEntry>) -> Self {
        Self {
            teams: Mutex::new(teams),
            scores: Mutex::new(scores),
        }
    }
}

#[async_trait]
impl ScoringApi for MockScoring {
    async fn teams(&self) -> Result<Vec<Team>, ApiError> {
        Ok(self.teams.lock().unwrap().clone())
    }

    async fn scores(&self) -> Result<Vec<ScoreEntry>, ApiError> {
        Ok(self.scores.lock().unwrap().clone())
    }
}

/// Build a roster team with the given forum tag ("" for none).
pub fn roster_team(id: i64, name: &str, tag: &str) -> Team {
    let mut tags = HashMap::new();
    if !tag.is_empty() {
        tags.insert("forum".to_string(), tag.to_string());
    }
    Team {
        id,
        name: name.to_string(),
        subnets: String::new(),
        tags,
    }
}

// --- Forum mock ---

#[derive(Debug, Clone)]
pub struct RecordedTopic {
    pub topic_id: i64,
    pub category_id: i64,
    pub title: String,
    pub body: String,
    pub author: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordedReply {
    pub post_id: i64,
    pub topic_id: i64,
    pub body: String,
    pub author: Option<String>,
}

#[derive(Default)]
pub struct ForumState {
    pub groups: Vec<Group>,
    pub categories: Vec<Category>,
    pub topics: Vec<RecordedTopic>,
    pub replies: Vec<RecordedReply>,
    pub renamed_groups: Vec<(i64, String)>,
    pub deleted_groups: Vec<i64>,
    pub deleted_categories: Vec<i64>,
    pub deleted_topics: Vec<i64>,
    pub pending: Vec<PendingUser>,
    pub details: HashMap<i64, UserDetail>,
    pub memberships: Vec<(i64, String)>,
    pub approved: Vec<i64>,
    pub activated: Vec<i64>,
    /// Every write call, in order.
    pub mutations: Vec<String>,
}

pub struct MockForum {
    next_id: AtomicI64,
    pub state: Mutex<ForumState>,
}

impl Default for MockForum {
    fn default() -> Self {
        Self::new()
    }
}

impl MockForum {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1000),
            state: Mutex::new(ForumState::default()),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn mutation_count(&self) -> usize {
        self.state.lock().unwrap().mutations.len()
    }

    pub fn add_pending_user(&self, id: i64, username: &str, can_approve: bool, ip: &str) {
        let mut state = self.state.lock().unwrap();
        state.pending.push(PendingUser {
            id,
            username: username.to_string(),
            can_approve,
        });
        state.details.insert(
            id,
            UserDetail {
                id,
                username: username.to_string(),
                registration_ip_address: ip.to_string(),
            },
        );
    }
}

#[async_trait]
impl ForumApi for MockForum {
    async fn find_group(&self, name: &str) -> Result<Option<Group>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state.groups.iter().find(|g| g.name == name).cloned())
    }

    async fn create_group(&self, name: &str, _title: &str) -> Result<Group, ApiError> {
        let group = Group {
            id: self.next_id(),
            name: name.to_string(),
        };
        let mut state = self.state.lock().unwrap();
        state.mutations.push(format!("create_group {name}"));
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn update_group_title(&self, group_id: i64, title: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.mutations.push(format!("rename_group {group_id}"));
        state.renamed_groups.push((group_id, title.to_string()));
        Ok(())
    }

    async fn delete_group(&self, group_id: i64) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.mutations.push(format!("delete_group {group_id}"));
        state.groups.retain(|g| g.id != group_id);
        state.deleted_groups.push(group_id);
        Ok(())
    }

    async fn find_category(&self, name: &str) -> Result<Option<Category>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state.categories.iter().find(|c| c.name == name).cloned())
    }

    async fn create_category(
        &self,
        name: &str,
        _color: &str,
        _text_color: &str,
        _permissions: &HashMap<String, i64>,
    ) -> Result<Category, ApiError> {
        let category = Category {
            id: self.next_id(),
            name: name.to_string(),
        };
        let mut state = self.state.lock().unwrap();
        state.mutations.push(format!("create_category {name}"));
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, category_id: i64) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state
            .mutations
            .push(format!("delete_category {category_id}"));
        state.categories.retain(|c| c.id != category_id);
        state.deleted_categories.push(category_id);
        Ok(())
    }

    async fn create_topic(
        &self,
        category_id: i64,
        title: &str,
        body: &str,
        creds: Option<&ApiCredentials>,
    ) -> Result<i64, ApiError> {
        let topic_id = self.next_id();
        let mut state = self.state.lock().unwrap();
        state.mutations.push(format!("create_topic {title}"));
        state.topics.push(RecordedTopic {
            topic_id,
            category_id,
            title: title.to_string(),
            body: body.to_string(),
            author: creds.map(|c| c.user.clone()),
        });
        Ok(topic_id)
    }

    async fn create_reply(
        &self,
        topic_id: i64,
        body: &str,
        creds: Option<&ApiCredentials>,
    ) -> Result<i64, ApiError> {
        let post_id = self.next_id();
        let mut state = self.state.lock().unwrap();
        state.mutations.push(format!("create_reply {topic_id}"));
        state.replies.push(RecordedReply {
            post_id,
            topic_id,
            body: body.to_string(),
            author: creds.map(|c| c.user.clone()),
        });
        Ok(post_id)
    }

    async fn delete_topic(&self, topic_id: i64) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        // Only topic ids resolve; deleting a reply id is the platform's 404.
        if !state.topics.iter().any(|t| t.topic_id == topic_id) {
            return Err(ApiError::Remote {
                status: 404,
                body: "topic not found".to_string(),
            });
        }
        state.mutations.push(format!("delete_topic {topic_id}"));
        state.topics.retain(|t| t.topic_id != topic_id);
        state.deleted_topics.push(topic_id);
        Ok(())
    }

    async fn pending_users(&self) -> Result<Vec<PendingUser>, ApiError> {
        Ok(self.state.lock().unwrap().pending.clone())
    }

    async fn user(&self, user_id: i64) -> Result<UserDetail, ApiError> {
        self.state
            .lock()
            .unwrap()
            .details
            .get(&user_id)
            .cloned()
            .ok_or(ApiError::Remote {
                status: 404,
                body: "no such user".to_string(),
            })
    }

    async fn add_group_member(&self, group_id: i64, username: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state
            .mutations
            .push(format!("add_member {group_id} {username}"));
        state.memberships.push((group_id, username.to_string()));
        Ok(())
    }

    async fn approve_user(&self, user_id: i64) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.mutations.push(format!("approve {user_id}"));
        state.approved.push(user_id);
        Ok(())
    }

    async fn activate_user(&self, user_id: i64) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.mutations.push(format!("activate {user_id}"));
        state.activated.push(user_id);
        Ok(())
    }
}

// --- Context assembly ---

/// Temp-file mirror store. Keep the TempDir alive for the test's duration.
pub fn temp_mirror() -> (tempfile::TempDir, Arc<dyn MirrorStore>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mirror.db");
    let store = herald::mirror::initialize(path.to_str().unwrap()).unwrap();
    (dir, store)
}

pub fn settings(posts_dir: &Path) -> SyncSettings {
    SyncSettings {
        posts_dir: posts_dir.to_path_buf(),
        category_color: "0088CC".to_string(),
        category_text_color: "FFFFFF".to_string(),
        category_access: Vec::new(),
        team_allowlist: Vec::new(),
    }
}

/// Wire mocks and a fresh mirror into a SyncContext.
/// Returns the handles tests assert against alongside the context.
pub fn context(
    scoring: MockScoring,
    forum: MockForum,
    posts_dir: &Path,
) -> (SyncContext, Arc<MockScoring>, Arc<MockForum>, tempfile::TempDir) {
    let scoring = Arc::new(scoring);
    let forum = Arc::new(forum);
    let (dir, mirror) = temp_mirror();

    let ctx = SyncContext::new(
        scoring.clone(),
        forum.clone(),
        mirror,
        settings(posts_dir),
    );

    (ctx, scoring, forum, dir)
}
