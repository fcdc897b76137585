// Team reconciliation: diff the scoring engine roster against the mirror
// and converge the forum's groups and categories.
//
// Fail-fast per pass: any team's operation failing aborts the pass, and
// already-applied mutations stand. Each step checks current state before
// acting, so the next pass picks up exactly where this one stopped.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use tracing::{debug, info};

use super::SyncContext;
use crate::mirror::models::TeamRecord;
use crate::scoring::client::Team;

/// Run one team reconciliation pass. Serialized by the team lock.
pub async fn reconcile_teams(ctx: &SyncContext) -> Result<()> {
    let _guard = ctx.team_lock.lock().await;

    let roster = ctx.scoring.teams().await?;
    let mirror_teams = ctx.mirror.list_teams().await?;

    let mirrored: HashMap<i64, &TeamRecord> =
        mirror_teams.iter().map(|t| (t.external_id, t)).collect();
    let roster_ids: HashSet<i64> = roster.iter().map(|t| t.id).collect();

    debug!(
        roster = roster.len(),
        mirrored = mirror_teams.len(),
        "Reconciling teams"
    );

    // Creates and renames first, deletes last, so a rename never races the
    // deletion of a different team holding a stale group reference.
    for team in &roster {
        match mirrored.get(&team.id) {
            None => create_presence(ctx, team).await?,
            Some(record) if record.name != team.name => {
                rename_team(ctx, team, record).await?;
            }
            Some(_) => {}
        }
    }

    for record in &mirror_teams {
        if roster_ids.contains(&record.external_id) {
            continue;
        }
        delete_presence(ctx, record).await?;
    }

    Ok(())
}

/// Materialize a roster team on the forum: group, category, mirror record.
///
/// Group and category creation are existence-checked so a pass that died
/// between the two converges on retry instead of erroring.
async fn create_presence(ctx: &SyncContext, team: &Team) -> Result<()> {
    let Some(tag) = team.forum_tag() else {
        debug!(team = %team.name, "No forum tag, skipping");
        return Ok(());
    };

    let group = match ctx.forum.find_group(tag).await? {
        Some(existing) => existing,
        None => ctx.forum.create_group(tag, &team.name).await?,
    };

    let category = match ctx.forum.find_category(tag).await? {
        Some(existing) => existing,
        None => {
            let mut permissions: HashMap<String, i64> = HashMap::new();
            permissions.insert(tag.to_string(), 1);
            for extra in &ctx.settings.category_access {
                permissions.insert(extra.clone(), 1);
            }
            ctx.forum
                .create_category(
                    tag,
                    &ctx.settings.category_color,
                    &ctx.settings.category_text_color,
                    &permissions,
                )
                .await?
        }
    };

    ctx.mirror
        .create_team(team.id, &team.name, tag, group.id, category.id)
        .await?;

    info!(team = %team.name, tag, "Created team forum presence");
    Ok(())
}

/// Push a display-name change to the forum and the mirror.
/// Renames never touch the tag, group id, or category id.
async fn rename_team(ctx: &SyncContext, team: &Team, record: &TeamRecord) -> Result<()> {
    ctx.forum
        .update_group_title(record.group_id, &team.name)
        .await?;
    ctx.mirror.rename_team(record.group_id, &team.name).await?;

    info!(from = %record.name, to = %team.name, "Renamed team");
    Ok(())
}

/// Tear down a vanished team: category first (closes its topics), then the
/// group, then the mirror record (cascading its post records).
async fn delete_presence(ctx: &SyncContext, record: &TeamRecord) -> Result<()> {
    ctx.forum.delete_category(record.category_id).await?;
    ctx.forum.delete_group(record.group_id).await?;
    ctx.mirror.delete_team(record.external_id).await?;

    info!(team = %record.name, "Deleted team forum presence");
    Ok(())
}
