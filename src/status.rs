// System status display — mirror stats and definitions on disk.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use crate::mirror::MirrorStore;
use crate::posts::definition::{load_definitions, PostKind};
use crate::posts::trigger::Trigger;

/// Display system status to the terminal.
pub async fn show(
    mirror: &Arc<dyn MirrorStore>,
    db_path: &str,
    posts_dir: &Path,
    poll_interval: Duration,
) -> Result<()> {
    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Mirror: {} ({})", db_path, file_size);
    println!("Catch-all pass interval: {}s", poll_interval.as_secs());

    let teams = mirror.list_teams().await?;
    if teams.is_empty() {
        println!("Teams: none mirrored yet");
        println!("  Run `herald sync` to create forum groups and categories");
    } else {
        println!("Teams: {} mirrored", teams.len());
        for team in &teams {
            println!(
                "  {} ({}, group {}, category {})",
                team.name, team.forum_tag, team.group_id, team.category_id
            );
        }
    }

    let records = mirror.list_post_records().await?;
    let published: usize = records
        .values()
        .map(|by_name| by_name.values().map(|ids| ids.len()).sum::<usize>())
        .sum();
    println!("Published posts: {published}");

    match load_definitions(posts_dir) {
        Ok(definitions) if definitions.is_empty() => {
            println!("Definitions: none in {}", posts_dir.display());
        }
        Ok(definitions) => {
            println!("Definitions: {} in {}", definitions.len(), posts_dir.display());
            for def in &definitions {
                let kind = match def.kind {
                    PostKind::Topic => "topic",
                    PostKind::Post => "post",
                    PostKind::MultiPost => "multi-post",
                };
                let trigger = match &def.trigger {
                    Trigger::None => "unconditional".to_string(),
                    Trigger::Timer { fire_at } => format!("at {}", fire_at.format("%Y/%m/%d %H:%M")),
                    Trigger::FlagSubmitted { tag } if tag.is_empty() => "any score".to_string(),
                    Trigger::FlagSubmitted { tag } => format!("flag {tag}"),
                    Trigger::ScoreAtLeast { threshold } => format!("score >= {threshold}"),
                };
                println!("  {} ({kind}, {trigger})", def.name);
            }
        }
        Err(e) => {
            println!("Definitions: {} {e:#}", "failed to load:".red());
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
