// Pass-scoped score and flag snapshots.
//
// Both are folded from a single /scores listing at the start of a post
// reconciliation pass and discarded when the pass ends. Freshness over
// staleness: nothing here is cached across passes.

use std::collections::{HashMap, HashSet};

use super::client::ScoreEntry;

/// Cumulative score per team.
#[derive(Debug, Default)]
pub struct ScoreSnapshot {
    totals: HashMap<i64, i64>,
}

impl ScoreSnapshot {
    pub fn from_entries(entries: &[ScoreEntry]) -> Self {
        let mut totals: HashMap<i64, i64> = HashMap::new();
        for entry in entries {
            *totals.entry(entry.team_id).or_default() += entry.value;
        }
        Self { totals }
    }

    /// A team with no entries scores zero.
    pub fn score(&self, team_id: i64) -> i64 {
        self.totals.get(&team_id).copied().unwrap_or(0)
    }
}

/// Which teams have scored each flag tag.
#[derive(Debug, Default)]
pub struct FlagSnapshot {
    by_tag: HashMap<String, HashSet<i64>>,
}

impl FlagSnapshot {
    /// Entries without a tag (manual adjustments) don't contribute.
    pub fn from_entries(entries: &[ScoreEntry]) -> Self {
        let mut by_tag: HashMap<String, HashSet<i64>> = HashMap::new();
        for entry in entries {
            if entry.tag.is_empty() {
                continue;
            }
            by_tag.entry(entry.tag.clone()).or_default().insert(entry.team_id);
        }
        Self { by_tag }
    }

    pub fn has_scored(&self, tag: &str, team_id: i64) -> bool {
        self.by_tag
            .get(tag)
            .is_some_and(|teams| teams.contains(&team_id))
    }
}
