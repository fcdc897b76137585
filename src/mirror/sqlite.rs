// SqliteMirror — rusqlite backend implementing the MirrorStore trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is
// !Send. Trait methods lock the mutex, do synchronous rusqlite work, and
// return. The lock is never held across .await points — Rust enforces this
// because MutexGuard is !Send.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::TeamRecord;
use super::traits::MirrorStore;

pub struct SqliteMirror {
    conn: Mutex<Connection>,
}

impl SqliteMirror {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl MirrorStore for SqliteMirror {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn list_teams(&self) -> Result<Vec<TeamRecord>> {
        let conn = self.conn.lock().await;
        super::queries::list_teams(&conn)
    }

    async fn create_team(
        &self,
        external_id: i64,
        name: &str,
        forum_tag: &str,
        group_id: i64,
        category_id: i64,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::create_team(&conn, external_id, name, forum_tag, group_id, category_id)
    }

    async fn rename_team(&self, group_id: i64, new_name: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::rename_team(&conn, group_id, new_name)
    }

    async fn delete_team(&self, external_id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::delete_team(&conn, external_id)
    }

    async fn find_team(&self, external_id: i64) -> Result<Option<TeamRecord>> {
        let conn = self.conn.lock().await;
        super::queries::find_team(&conn, external_id)
    }

    async fn list_post_records(&self) -> Result<HashMap<i64, HashMap<String, Vec<i64>>>> {
        let conn = self.conn.lock().await;
        super::queries::list_post_records(&conn)
    }

    async fn create_post_record(
        &self,
        team_external_id: i64,
        name: &str,
        post_id: i64,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::create_post_record(&conn, team_external_id, name, post_id)
    }

    async fn delete_post_record(&self, post_id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::delete_post_record(&conn, post_id)
    }
}
