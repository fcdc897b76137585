// Post definition files — one TOML file per definition.
//
// The definition name is the file stem; it is the idempotency key recorded
// in the mirror, so renaming a file retires the old definition (pruned)
// and introduces a new one. Trigger time strings are converted to
// timestamps here, once, at load time.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::debug;

use super::trigger::{parse_fire_at, Trigger};
use crate::forum::client::ApiCredentials;

/// What a definition publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    /// A new topic in each target team's category.
    Topic,
    /// A reply in a previously published topic.
    Post,
    /// An ordered sequence of replies, each its own idempotent unit.
    MultiPost,
}

/// One sub-post of a multi-post definition.
#[derive(Debug, Clone)]
pub struct SubPost {
    pub api: Option<ApiCredentials>,
    pub body: String,
}

/// A parsed, validated post definition.
#[derive(Debug, Clone)]
pub struct PostDefinition {
    /// Unique key, derived from the source filename.
    pub name: String,
    pub kind: PostKind,
    /// Topic definition this one replies under (post/multi-post kinds).
    pub parent: Option<String>,
    pub trigger: Trigger,
    pub title: String,
    pub body: String,
    /// variable name → team external id → value.
    pub variables: HashMap<String, HashMap<i64, String>>,
    /// Authoring credentials for every publish of this definition.
    pub api: Option<ApiCredentials>,
    /// Sub-posts, in publish order (multi-post kind only).
    pub subposts: Vec<SubPost>,
}

// -- Raw TOML shapes, validated into PostDefinition --

#[derive(Deserialize)]
struct RawDefinition {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    trigger: Option<RawTrigger>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    // TOML table keys are strings; team ids are parsed during validation.
    #[serde(default)]
    variables: HashMap<String, HashMap<String, String>>,
    #[serde(default)]
    api: Option<ApiCredentials>,
    #[serde(default)]
    subposts: Vec<RawSubPost>,
}

#[derive(Deserialize)]
struct RawTrigger {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    at: Option<String>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    threshold: Option<i64>,
}

#[derive(Deserialize)]
struct RawSubPost {
    #[serde(default)]
    api: Option<ApiCredentials>,
    body: String,
}

impl PostDefinition {
    /// Parse and validate one definition from TOML source.
    pub fn parse(name: &str, content: &str) -> Result<Self> {
        let raw: RawDefinition = toml::from_str(content)
            .with_context(|| format!("Failed to parse post definition {name:?}"))?;

        let kind = match raw.kind.as_str() {
            "topic" => PostKind::Topic,
            "post" => PostKind::Post,
            "multi-post" => PostKind::MultiPost,
            other => bail!("Post definition {name:?} has unknown type {other:?}"),
        };

        match kind {
            PostKind::Topic => {
                if raw.title.is_empty() {
                    bail!("Topic definition {name:?} needs a title");
                }
                if raw.parent.is_some() {
                    bail!("Topic definition {name:?} can't have a parent");
                }
            }
            PostKind::Post => {
                if raw.parent.is_none() {
                    bail!("Post definition {name:?} needs a parent topic");
                }
                if raw.body.is_empty() {
                    bail!("Post definition {name:?} needs a body");
                }
            }
            PostKind::MultiPost => {
                if raw.parent.is_none() {
                    bail!("Multi-post definition {name:?} needs a parent topic");
                }
                if raw.subposts.is_empty() {
                    bail!("Multi-post definition {name:?} needs at least one sub-post");
                }
            }
        }

        let trigger = match raw.trigger {
            None => Trigger::None,
            Some(t) => match t.kind.as_str() {
                "timer" => {
                    let at = t
                        .at
                        .with_context(|| format!("Timer trigger in {name:?} needs an 'at' time"))?;
                    Trigger::Timer {
                        fire_at: parse_fire_at(&at)?,
                    }
                }
                "flag" => Trigger::FlagSubmitted {
                    tag: t.tag.unwrap_or_default(),
                },
                "score" => Trigger::ScoreAtLeast {
                    threshold: t.threshold.with_context(|| {
                        format!("Score trigger in {name:?} needs a threshold")
                    })?,
                },
                other => bail!("Post definition {name:?} has unknown trigger type {other:?}"),
            },
        };

        let mut variables = HashMap::new();
        for (var, per_team) in raw.variables {
            let mut parsed: HashMap<i64, String> = HashMap::new();
            for (team_key, value) in per_team {
                let team_id: i64 = team_key.parse().with_context(|| {
                    format!("Variable {var:?} in {name:?} has non-numeric team key {team_key:?}")
                })?;
                parsed.insert(team_id, value);
            }
            variables.insert(var, parsed);
        }

        Ok(Self {
            name: name.to_string(),
            kind,
            parent: raw.parent,
            trigger,
            title: raw.title,
            body: raw.body,
            variables,
            api: raw.api,
            subposts: raw
                .subposts
                .into_iter()
                .map(|s| SubPost {
                    api: s.api,
                    body: s.body,
                })
                .collect(),
        })
    }
}

/// Load every definition in the posts directory, sorted by name.
///
/// A missing directory is an empty definition set, not an error — a
/// deployment may run purely for team and user reconciliation.
pub fn load_definitions(dir: &Path) -> Result<Vec<PostDefinition>> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "No posts directory, loading zero definitions");
        return Ok(Vec::new());
    }

    let mut definitions = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read posts directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Bad definition filename {}", path.display()))?
            .to_string();

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        definitions.push(PostDefinition::parse(&name, &content)?);
    }

    // Deterministic evaluation order across platforms
    definitions.sort_by(|a, b| a.name.cmp(&b.name));

    debug!(count = definitions.len(), "Loaded post definitions");
    Ok(definitions)
}
