// Mirror store trait — backend-agnostic async interface, no business rules.
//
// All methods are async so the synchronous rusqlite backend (behind a
// Mutex) fits the same interface the reconcilers are written against.
// Invariant enforced by the store: deleting a team row cascades deletion
// of its post rows.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use super::models::TeamRecord;

#[async_trait]
pub trait MirrorStore: Send + Sync {
    // --- Lifecycle ---

    /// Count the user-created tables (init confirmation).
    async fn table_count(&self) -> Result<i64>;

    // --- Teams ---

    async fn list_teams(&self) -> Result<Vec<TeamRecord>>;

    async fn create_team(
        &self,
        external_id: i64,
        name: &str,
        forum_tag: &str,
        group_id: i64,
        category_id: i64,
    ) -> Result<()>;

    /// Persist the new display name for the team owning this forum group.
    async fn rename_team(&self, group_id: i64, new_name: &str) -> Result<()>;

    /// Remove a team record; its post records cascade.
    async fn delete_team(&self, external_id: i64) -> Result<()>;

    async fn find_team(&self, external_id: i64) -> Result<Option<TeamRecord>>;

    // --- Post records ---

    /// team external id → definition name → forum post ids, in publish order.
    async fn list_post_records(&self) -> Result<HashMap<i64, HashMap<String, Vec<i64>>>>;

    async fn create_post_record(
        &self,
        team_external_id: i64,
        name: &str,
        post_id: i64,
    ) -> Result<()>;

    async fn delete_post_record(&self, post_id: i64) -> Result<()>;
}
