// Mirror queries — CRUD operations for both tables.
//
// Every database interaction goes through this module. All writes are
// auto-committing single statements; the reconcilers compose multiple calls
// without an enclosing transaction so each step stays independently
// retryable.

use std::collections::HashMap;

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::TeamRecord;

// --- Teams ---

pub fn list_teams(conn: &Connection) -> Result<Vec<TeamRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, external_id, name, forum_tag, group_id, category_id
         FROM teams ORDER BY id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(TeamRecord {
            row_id: row.get(0)?,
            external_id: row.get(1)?,
            name: row.get(2)?,
            forum_tag: row.get(3)?,
            group_id: row.get(4)?,
            category_id: row.get(5)?,
        })
    })?;

    let mut teams = Vec::new();
    for row in rows {
        teams.push(row?);
    }
    Ok(teams)
}

pub fn create_team(
    conn: &Connection,
    external_id: i64,
    name: &str,
    forum_tag: &str,
    group_id: i64,
    category_id: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO teams (external_id, name, forum_tag, group_id, category_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![external_id, name, forum_tag, group_id, category_id],
    )?;
    Ok(())
}

/// Persist a new display name after a forum-side rename.
pub fn rename_team(conn: &Connection, group_id: i64, new_name: &str) -> Result<()> {
    conn.execute(
        "UPDATE teams SET name = ?2 WHERE group_id = ?1",
        params![group_id, new_name],
    )?;
    Ok(())
}

/// Remove a team row. Post rows cascade via the foreign key.
pub fn delete_team(conn: &Connection, external_id: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM teams WHERE external_id = ?1",
        params![external_id],
    )?;
    Ok(())
}

pub fn find_team(conn: &Connection, external_id: i64) -> Result<Option<TeamRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, external_id, name, forum_tag, group_id, category_id
         FROM teams WHERE external_id = ?1",
    )?;

    let record = stmt
        .query_row(params![external_id], |row| {
            Ok(TeamRecord {
                row_id: row.get(0)?,
                external_id: row.get(1)?,
                name: row.get(2)?,
                forum_tag: row.get(3)?,
                group_id: row.get(4)?,
                category_id: row.get(5)?,
            })
        })
        .optional()?;
    Ok(record)
}

// --- Post records ---

/// All post records, grouped team → definition name → forum post ids.
///
/// Ids keep insertion order within a name: for multi-post definitions the
/// count is the resume cursor, and the first id is the parent topic for
/// dependent replies.
pub fn list_post_records(
    conn: &Connection,
) -> Result<HashMap<i64, HashMap<String, Vec<i64>>>> {
    let mut stmt = conn.prepare(
        "SELECT t.external_id, p.name, p.post_id
         FROM posts p JOIN teams t ON p.team_id = t.id
         ORDER BY p.id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut records: HashMap<i64, HashMap<String, Vec<i64>>> = HashMap::new();
    for row in rows {
        let (team, name, post_id) = row?;
        records
            .entry(team)
            .or_default()
            .entry(name)
            .or_default()
            .push(post_id);
    }
    Ok(records)
}

pub fn create_post_record(
    conn: &Connection,
    team_external_id: i64,
    name: &str,
    post_id: i64,
) -> Result<()> {
    let changed = conn.execute(
        "INSERT INTO posts (name, team_id, post_id)
         SELECT ?1, id, ?3 FROM teams WHERE external_id = ?2",
        params![name, team_external_id, post_id],
    )?;
    if changed == 0 {
        anyhow::bail!("No mirror team with external id {team_external_id}");
    }
    Ok(())
}

pub fn delete_post_record(conn: &Connection, post_id: i64) -> Result<()> {
    conn.execute("DELETE FROM posts WHERE post_id = ?1", params![post_id])?;
    Ok(())
}
