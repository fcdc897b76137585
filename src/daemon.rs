// Daemon scheduler — two supervised drivers over the same serialized
// reconciliation passes.
//
// The event driver reacts to the scoring engine's push stream; the timer
// driver re-runs the catch-all passes on a fixed interval for anything
// missed or coalesced. Each driver reports its terminal result through one
// shared channel, and the first terminal result ends the process —
// process-level restart is the recovery mechanism, not in-place retry.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::reconcile::{posts, teams, users, SyncContext};
use crate::scoring::client::ScoringClient;
use crate::scoring::events::Event;

/// Run the daemon until a driver hits a terminal condition.
/// Always returns an error: the only exits are failures.
pub async fn run(
    ctx: Arc<SyncContext>,
    scoring: ScoringClient,
    poll_interval: Duration,
) -> Result<()> {
    // Converge once before going event-driven, so a restart repairs
    // anything missed while the process was down.
    teams::reconcile_teams(&ctx).await?;
    users::process_new_users(&ctx).await?;
    posts::reconcile_posts(&ctx).await?;

    info!(poll_secs = poll_interval.as_secs(), "Entering daemon mode");

    let (tx, mut rx) = mpsc::channel::<anyhow::Error>(2);

    let listener = tokio::spawn(event_driver(ctx.clone(), scoring, tx.clone()));
    let ticker = tokio::spawn(timer_driver(ctx, poll_interval, tx));

    let err = rx
        .recv()
        .await
        .unwrap_or_else(|| anyhow!("All drivers stopped without reporting"));

    listener.abort();
    ticker.abort();
    Err(err)
}

/// Push driver: consume the live event stream until it dies.
async fn event_driver(
    ctx: Arc<SyncContext>,
    scoring: ScoringClient,
    tx: mpsc::Sender<anyhow::Error>,
) {
    let err = match consume_events(&ctx, &scoring).await {
        Ok(()) => anyhow!("Event stream closed by the scoring engine"),
        Err(e) => e.context("Event stream failed"),
    };
    let _ = tx.send(err).await;
}

async fn consume_events(ctx: &SyncContext, scoring: &ScoringClient) -> Result<()> {
    let mut stream = scoring.events().await?;
    info!("Listening for scoring events");

    while let Some(event) = stream.next().await? {
        // Pass failures triggered by an event are logged, not terminal —
        // the timer driver retries them. Only the stream itself is load-
        // bearing for process liveness.
        match event {
            Event::Flags { flag_type } if flag_type == "valid" => {
                if let Err(e) = posts::reconcile_posts(ctx).await {
                    error!(error = %e, "Post pass failed after flag event");
                }
            }
            Event::Flags { .. } => {}
            Event::Timeline { change } => {
                info!(?change, "Roster changed");
                if let Err(e) = teams::reconcile_teams(ctx).await {
                    error!(error = %e, "Team pass failed after timeline event");
                }
                // A roster change can change post target sets too.
                if let Err(e) = posts::reconcile_posts(ctx).await {
                    error!(error = %e, "Post pass failed after timeline event");
                }
            }
            Event::Other(kind) => debug!(kind, "Ignoring unhandled event"),
        }
    }

    Ok(())
}

/// Pull driver: fixed-interval catch-all passes. Never terminates on its
/// own — pass failures are logged and retried next tick.
async fn timer_driver(ctx: Arc<SyncContext>, poll: Duration, _tx: mpsc::Sender<anyhow::Error>) {
    let mut interval = tokio::time::interval(poll);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately; startup already synced.
    interval.tick().await;

    loop {
        interval.tick().await;

        if let Err(e) = users::process_new_users(&ctx).await {
            error!(error = %e, "User approval pass failed");
        }
        if let Err(e) = posts::reconcile_posts(&ctx).await {
            error!(error = %e, "Post pass failed");
        }
    }
}
