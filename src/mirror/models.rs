// Data models — Rust structs that map to mirror rows.
//
// These are the types that flow through the reconcilers. They're separate
// from the queries so other modules can use them without depending on
// rusqlite directly.

/// A team that has been materialized on the forum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRecord {
    /// Mirror-assigned row id.
    pub row_id: i64,
    /// The scoring engine's stable team id — the join key.
    pub external_id: i64,
    /// Cached display name; drift against the roster drives renames.
    pub name: String,
    /// Forum group and category name.
    pub forum_tag: String,
    pub group_id: i64,
    pub category_id: i64,
}
