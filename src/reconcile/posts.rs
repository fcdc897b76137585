// Post reconciliation: evaluate every definition's trigger against the
// pass snapshots, publish to the target teams, prune retired definitions.
//
// Two ordered phases: all topic definitions first, then the mirror is
// re-read, then post/multi-post definitions — so a reply always finds its
// parent topic's id in the refreshed records. Every successful publish
// writes its mirror record immediately, never batched, so a pass that dies
// after N of M publishes resumes at N+1.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use super::SyncContext;
use crate::mirror::models::TeamRecord;
use crate::posts::definition::{load_definitions, PostDefinition, PostKind};
use crate::posts::template;
use crate::scoring::snapshot::{FlagSnapshot, ScoreSnapshot};

type PostRecords = HashMap<i64, HashMap<String, Vec<i64>>>;

/// Run one post reconciliation pass. Serialized by the post lock.
pub async fn reconcile_posts(ctx: &SyncContext) -> Result<()> {
    let _guard = ctx.post_lock.lock().await;
    let definitions = load_definitions(&ctx.settings.posts_dir)?;
    run_pass(ctx, &definitions, None).await
}

/// Manually publish one definition, bypassing its trigger but keeping the
/// idempotency and allow-list filters. Drives the `trigger` CLI command.
pub async fn trigger_post(ctx: &SyncContext, name: &str) -> Result<()> {
    let _guard = ctx.post_lock.lock().await;
    let definitions = load_definitions(&ctx.settings.posts_dir)?;
    if !definitions.iter().any(|d| d.name == name) {
        anyhow::bail!("No post definition named {name:?}");
    }
    run_pass(ctx, &definitions, Some(name)).await
}

async fn run_pass(
    ctx: &SyncContext,
    definitions: &[PostDefinition],
    force: Option<&str>,
) -> Result<()> {
    // Pass-scoped snapshots, re-fetched every pass. Freshness over staleness.
    let entries = ctx.scoring.scores().await?;
    let scores = ScoreSnapshot::from_entries(&entries);
    let flags = FlagSnapshot::from_entries(&entries);
    let teams = ctx.mirror.list_teams().await?;
    let now = Local::now();

    let wanted = |def: &PostDefinition| force.map_or(true, |name| def.name == name);

    debug!(
        definitions = definitions.len(),
        teams = teams.len(),
        "Reconciling posts"
    );

    // Phase 1: topics.
    let mut records = ctx.mirror.list_post_records().await?;
    for def in definitions.iter().filter(|d| d.kind == PostKind::Topic) {
        if wanted(def) {
            publish_definition(ctx, def, &teams, &scores, &flags, &records, now, force.is_some())
                .await?;
        }
    }

    // Re-read so phase 2 sees topics materialized this pass.
    records = ctx.mirror.list_post_records().await?;

    // Phase 2: posts and multi-posts.
    for def in definitions.iter().filter(|d| d.kind != PostKind::Topic) {
        if wanted(def) {
            publish_definition(ctx, def, &teams, &scores, &flags, &records, now, force.is_some())
                .await?;
        }
    }

    // A manual trigger publishes; it doesn't garbage-collect.
    if force.is_none() {
        prune(ctx, definitions).await?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn publish_definition(
    ctx: &SyncContext,
    def: &PostDefinition,
    teams: &[TeamRecord],
    scores: &ScoreSnapshot,
    flags: &FlagSnapshot,
    records: &PostRecords,
    now: DateTime<Local>,
    force: bool,
) -> Result<()> {
    let targets: Vec<&TeamRecord> = if force {
        teams.iter().collect()
    } else {
        def.trigger.target_teams(teams, scores, flags, now)
    };

    let allowlist = &ctx.settings.team_allowlist;

    for team in targets {
        if !allowlist.is_empty() && !allowlist.contains(&team.name) {
            debug!(team = %team.name, post = %def.name, "Team not on allow-list, skipping");
            continue;
        }

        let existing = records
            .get(&team.external_id)
            .and_then(|by_name| by_name.get(&def.name))
            .map(Vec::as_slice)
            .unwrap_or_default();

        match def.kind {
            PostKind::Topic => {
                if !existing.is_empty() {
                    continue;
                }
                publish_topic(ctx, def, team, scores).await?;
            }
            PostKind::Post => {
                if !existing.is_empty() {
                    continue;
                }
                publish_reply(ctx, def, team, scores, records).await?;
            }
            PostKind::MultiPost => {
                publish_sub_posts(ctx, def, team, scores, records, existing.len()).await?;
            }
        }
    }

    Ok(())
}

async fn publish_topic(
    ctx: &SyncContext,
    def: &PostDefinition,
    team: &TeamRecord,
    scores: &ScoreSnapshot,
) -> Result<()> {
    let score = scores.score(team.external_id);
    let title = template::render(&def.title, &team.name, score, team.external_id, &def.variables);
    let body = template::render(&def.body, &team.name, score, team.external_id, &def.variables);

    let topic_id = ctx
        .forum
        .create_topic(team.category_id, &title, &body, def.api.as_ref())
        .await?;
    ctx.mirror
        .create_post_record(team.external_id, &def.name, topic_id)
        .await?;

    info!(post = %def.name, team = %team.name, topic_id, "Published topic");
    Ok(())
}

/// Find the recorded topic id a dependent definition replies under.
/// Missing parent is a per-team skip (the topic's own trigger may simply
/// not have fired for this team yet), not a pass failure.
fn parent_topic(def: &PostDefinition, team: &TeamRecord, records: &PostRecords) -> Option<i64> {
    let parent = def.parent.as_deref()?;
    records
        .get(&team.external_id)
        .and_then(|by_name| by_name.get(parent))
        .and_then(|ids| ids.first())
        .copied()
}

async fn publish_reply(
    ctx: &SyncContext,
    def: &PostDefinition,
    team: &TeamRecord,
    scores: &ScoreSnapshot,
    records: &PostRecords,
) -> Result<()> {
    let Some(topic_id) = parent_topic(def, team, records) else {
        warn!(
            post = %def.name,
            team = %team.name,
            parent = def.parent.as_deref().unwrap_or(""),
            "Parent topic not published yet, skipping"
        );
        return Ok(());
    };

    let score = scores.score(team.external_id);
    let body = template::render(&def.body, &team.name, score, team.external_id, &def.variables);

    let post_id = ctx
        .forum
        .create_reply(topic_id, &body, def.api.as_ref())
        .await?;
    ctx.mirror
        .create_post_record(team.external_id, &def.name, post_id)
        .await?;

    info!(post = %def.name, team = %team.name, post_id, "Published reply");
    Ok(())
}

/// Publish a multi-post definition's sub-posts from `done` onward.
///
/// Each sub-post is its own idempotent unit under the definition name: the
/// mirror record count for (team, name) is the resume cursor, so a pass
/// interrupted after k sub-posts re-attempts only k+1 onward — rendered
/// with the current pass's scores and variables, by design.
async fn publish_sub_posts(
    ctx: &SyncContext,
    def: &PostDefinition,
    team: &TeamRecord,
    scores: &ScoreSnapshot,
    records: &PostRecords,
    done: usize,
) -> Result<()> {
    if done >= def.subposts.len() {
        return Ok(());
    }

    let Some(topic_id) = parent_topic(def, team, records) else {
        warn!(
            post = %def.name,
            team = %team.name,
            parent = def.parent.as_deref().unwrap_or(""),
            "Parent topic not published yet, skipping"
        );
        return Ok(());
    };

    let score = scores.score(team.external_id);

    for sub in def.subposts.iter().skip(done) {
        let body = template::render(&sub.body, &team.name, score, team.external_id, &def.variables);
        let creds = sub.api.as_ref().or(def.api.as_ref());

        let post_id = ctx.forum.create_reply(topic_id, &body, creds).await?;
        ctx.mirror
            .create_post_record(team.external_id, &def.name, post_id)
            .await?;
    }

    info!(
        post = %def.name,
        team = %team.name,
        published = def.subposts.len() - done,
        resumed = done > 0,
        "Published sub-posts"
    );
    Ok(())
}

/// Delete mirror records whose definition file no longer exists, removing
/// the corresponding forum topic where one exists.
async fn prune(ctx: &SyncContext, definitions: &[PostDefinition]) -> Result<()> {
    let live: HashSet<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
    let records = ctx.mirror.list_post_records().await?;

    for by_name in records.values() {
        for (name, post_ids) in by_name {
            if live.contains(name.as_str()) {
                continue;
            }

            for &post_id in post_ids {
                // Records don't store their kind; the topic delete is only
                // meaningful for topic records. A 404 here is a reply
                // record, not a failure — anything else aborts the pass
                // before the mirror row is touched.
                match ctx.forum.delete_topic(post_id).await {
                    Ok(()) => {}
                    Err(e) if e.is_not_found() => {
                        debug!(post = %name, post_id, "No topic to delete for pruned record");
                    }
                    Err(e) => return Err(e).context("Failed to delete pruned topic"),
                }

                ctx.mirror.delete_post_record(post_id).await?;
                info!(post = %name, post_id, "Pruned retired post record");
            }
        }
    }

    Ok(())
}
