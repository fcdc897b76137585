// Publication triggers and target-team computation.
//
// A trigger gates which teams a definition publishes to during a pass.
// Evaluation is pure: it reads the pass snapshots and the clock passed in
// by the caller, which is what makes every variant testable.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use crate::mirror::models::TeamRecord;
use crate::scoring::snapshot::{FlagSnapshot, ScoreSnapshot};

/// Condition gating publication of a post definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Publish to all teams unconditionally, once.
    None,
    /// Publish to all teams once the wall clock passes `fire_at`.
    Timer { fire_at: DateTime<Local> },
    /// Publish to teams that scored the flag with this tag.
    /// An empty tag means any team with a non-zero score.
    FlagSubmitted { tag: String },
    /// Publish to teams whose cumulative score is at least `threshold`.
    ScoreAtLeast { threshold: i64 },
}

/// Trigger time strings are literal local-timezone "YYYY/MM/DD HH:MM",
/// converted exactly once at definition load time.
pub fn parse_fire_at(raw: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), "%Y/%m/%d %H:%M")
        .with_context(|| format!("Bad trigger time {raw:?}, expected YYYY/MM/DD HH:MM"))?;

    // A DST gap can make a local time nonexistent; an overlap makes it
    // ambiguous. Take the earliest valid instant in both cases.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("Trigger time {raw:?} doesn't exist in the local timezone"))
}

impl Trigger {
    /// Compute the teams this trigger currently selects.
    pub fn target_teams<'a>(
        &self,
        teams: &'a [TeamRecord],
        scores: &ScoreSnapshot,
        flags: &FlagSnapshot,
        now: DateTime<Local>,
    ) -> Vec<&'a TeamRecord> {
        match self {
            Trigger::None => teams.iter().collect(),
            Trigger::Timer { fire_at } => {
                if now >= *fire_at {
                    teams.iter().collect()
                } else {
                    Vec::new()
                }
            }
            Trigger::FlagSubmitted { tag } if tag.is_empty() => teams
                .iter()
                .filter(|t| scores.score(t.external_id) != 0)
                .collect(),
            Trigger::FlagSubmitted { tag } => teams
                .iter()
                .filter(|t| flags.has_scored(tag, t.external_id))
                .collect(),
            Trigger::ScoreAtLeast { threshold } => teams
                .iter()
                .filter(|t| scores.score(t.external_id) >= *threshold)
                .collect(),
        }
    }
}
