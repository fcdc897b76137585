// Post reconciliation properties: trigger gating, idempotent publication,
// same-pass topic→reply ordering, template rendering, multi-post resume,
// allow-list restriction, and exactly-once pruning.

mod common;

use common::{context, MockForum, MockScoring};
use herald::reconcile::posts::{reconcile_posts, trigger_post};
use herald::reconcile::{SyncContext, SyncSettings};
use herald::scoring::client::ScoreEntry;
use std::path::Path;
use std::sync::Arc;

fn entry(team_id: i64, tag: &str, value: i64) -> ScoreEntry {
    ScoreEntry {
        team_id,
        tag: tag.to_string(),
        value,
    }
}

fn write_def(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(format!("{name}.toml")), content).unwrap();
}

/// Mirror two tagged teams so post passes have someone to publish to.
async fn mirror_teams(ctx: &SyncContext) {
    ctx.mirror
        .create_team(1, "Alpha", "alpha-team", 11, 21)
        .await
        .unwrap();
    ctx.mirror
        .create_team(2, "Bravo", "bravo-team", 12, 22)
        .await
        .unwrap();
}

#[tokio::test]
async fn unconditional_topic_publishes_once_per_team() {
    let posts = tempfile::tempdir().unwrap();
    write_def(
        posts.path(),
        "welcome",
        "type = \"topic\"\ntitle = \"Welcome\"\nbody = \"Hello!\"",
    );

    let scoring = MockScoring::new(vec![], vec![]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    mirror_teams(&ctx).await;

    reconcile_posts(&ctx).await.unwrap();

    let state = forum.state.lock().unwrap();
    assert_eq!(state.topics.len(), 2);
    let categories: Vec<i64> = state.topics.iter().map(|t| t.category_id).collect();
    assert_eq!(categories, vec![21, 22]);
    drop(state);

    // The trigger re-fires every pass; the mirror record suppresses it.
    let before = forum.mutation_count();
    reconcile_posts(&ctx).await.unwrap();
    assert_eq!(forum.mutation_count(), before);
}

#[tokio::test]
async fn score_trigger_selects_thresholded_teams() {
    let posts = tempfile::tempdir().unwrap();
    write_def(
        posts.path(),
        "milestone",
        "type = \"topic\"\ntitle = \"Milestone\"\nbody = \"100 points!\"\n\
         [trigger]\ntype = \"score\"\nthreshold = 100",
    );

    let scoring = MockScoring::new(vec![], vec![entry(1, "", 150), entry(2, "", 50)]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    mirror_teams(&ctx).await;

    reconcile_posts(&ctx).await.unwrap();

    let state = forum.state.lock().unwrap();
    assert_eq!(state.topics.len(), 1);
    assert_eq!(state.topics[0].category_id, 21); // Alpha only
}

#[tokio::test]
async fn flag_trigger_selects_submitting_teams() {
    let posts = tempfile::tempdir().unwrap();
    write_def(
        posts.path(),
        "solved",
        "type = \"topic\"\ntitle = \"Solved\"\nbody = \"Nice.\"\n\
         [trigger]\ntype = \"flag\"\ntag = \"web-1\"",
    );

    let scoring = MockScoring::new(vec![], vec![entry(2, "web-1", 50)]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    mirror_teams(&ctx).await;

    reconcile_posts(&ctx).await.unwrap();

    let state = forum.state.lock().unwrap();
    assert_eq!(state.topics.len(), 1);
    assert_eq!(state.topics[0].category_id, 22); // Bravo only
}

#[tokio::test]
async fn timer_gates_until_fire_time() {
    let posts = tempfile::tempdir().unwrap();
    write_def(
        posts.path(),
        "late-news",
        "type = \"topic\"\ntitle = \"News\"\nbody = \"Later.\"\n\
         [trigger]\ntype = \"timer\"\nat = \"2099/01/01 00:00\"",
    );
    write_def(
        posts.path(),
        "old-news",
        "type = \"topic\"\ntitle = \"News\"\nbody = \"Already out.\"\n\
         [trigger]\ntype = \"timer\"\nat = \"2001/01/01 00:00\"",
    );

    let scoring = MockScoring::new(vec![], vec![]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    mirror_teams(&ctx).await;

    reconcile_posts(&ctx).await.unwrap();

    let state = forum.state.lock().unwrap();
    // Only the past timer fired, for both teams
    assert_eq!(state.topics.len(), 2);
    assert!(state.topics.iter().all(|t| t.body == "Already out."));
}

#[tokio::test]
async fn reply_finds_topic_published_in_same_pass() {
    let posts = tempfile::tempdir().unwrap();
    write_def(
        posts.path(),
        "welcome",
        "type = \"topic\"\ntitle = \"Welcome\"\nbody = \"Hello!\"",
    );
    write_def(
        posts.path(),
        "details",
        "type = \"post\"\nparent = \"welcome\"\nbody = \"The details.\"",
    );

    let scoring = MockScoring::new(vec![], vec![]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    mirror_teams(&ctx).await;

    reconcile_posts(&ctx).await.unwrap();

    let state = forum.state.lock().unwrap();
    assert_eq!(state.topics.len(), 2);
    assert_eq!(state.replies.len(), 2);
    // Each reply landed in its own team's topic
    for reply in &state.replies {
        assert!(state
            .topics
            .iter()
            .any(|t| t.topic_id == reply.topic_id));
    }
}

#[tokio::test]
async fn reply_skipped_while_parent_unpublished() {
    let posts = tempfile::tempdir().unwrap();
    write_def(
        posts.path(),
        "gated",
        "type = \"topic\"\ntitle = \"Gated\"\nbody = \"Later.\"\n\
         [trigger]\ntype = \"timer\"\nat = \"2099/01/01 00:00\"",
    );
    write_def(
        posts.path(),
        "followup",
        "type = \"post\"\nparent = \"gated\"\nbody = \"Follows the gate.\"",
    );

    let scoring = MockScoring::new(vec![], vec![]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    mirror_teams(&ctx).await;

    // Not an error — just a per-team skip until the parent materializes
    reconcile_posts(&ctx).await.unwrap();

    assert_eq!(forum.mutation_count(), 0);
    assert!(ctx.mirror.list_post_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn template_renders_builtins_and_variables() {
    let posts = tempfile::tempdir().unwrap();
    write_def(
        posts.path(),
        "creds",
        "type = \"topic\"\ntitle = \"Access for %{team_name}\"\n\
         body = \"Hi %{team_name}, score %{team_score}, bonus %{x}\"\n\
         [variables.x]\n1 = \"gold\"",
    );

    let scoring = MockScoring::new(vec![], vec![entry(1, "", 42)]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    mirror_teams(&ctx).await;

    reconcile_posts(&ctx).await.unwrap();

    let state = forum.state.lock().unwrap();
    let alpha = state.topics.iter().find(|t| t.category_id == 21).unwrap();
    assert_eq!(alpha.title, "Access for Alpha");
    assert_eq!(alpha.body, "Hi Alpha, score 42, bonus gold");

    // No variable entry for Bravo: the silent empty-string default
    let bravo = state.topics.iter().find(|t| t.category_id == 22).unwrap();
    assert_eq!(bravo.body, "Hi Bravo, score 0, bonus ");
}

#[tokio::test]
async fn multi_post_publishes_in_order_with_authors() {
    let posts = tempfile::tempdir().unwrap();
    write_def(
        posts.path(),
        "welcome",
        "type = \"topic\"\ntitle = \"Welcome\"\nbody = \"Hello!\"",
    );
    write_def(
        posts.path(),
        "briefing",
        "type = \"multi-post\"\nparent = \"welcome\"\n\
         [[subposts]]\nbody = \"Part one.\"\n\
         [[subposts]]\nbody = \"Part two.\"\n\
         [subposts.api]\nuser = \"gamemaster\"\nkey = \"secret\"",
    );

    let scoring = MockScoring::new(vec![], vec![]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    ctx.mirror
        .create_team(1, "Alpha", "alpha-team", 11, 21)
        .await
        .unwrap();

    reconcile_posts(&ctx).await.unwrap();

    let state = forum.state.lock().unwrap();
    assert_eq!(state.replies.len(), 2);
    assert_eq!(state.replies[0].body, "Part one.");
    assert_eq!(state.replies[0].author, None);
    assert_eq!(state.replies[1].body, "Part two.");
    assert_eq!(state.replies[1].author.as_deref(), Some("gamemaster"));
    drop(state);

    // One record per sub-post under the same definition name
    let records = ctx.mirror.list_post_records().await.unwrap();
    assert_eq!(records[&1]["briefing"].len(), 2);
}

#[tokio::test]
async fn multi_post_resumes_after_partial_publish() {
    let posts = tempfile::tempdir().unwrap();
    write_def(
        posts.path(),
        "briefing",
        "type = \"multi-post\"\nparent = \"welcome\"\n\
         [[subposts]]\nbody = \"Part one.\"\n\
         [[subposts]]\nbody = \"Part two.\"\n\
         [[subposts]]\nbody = \"Part three.\"",
    );
    // Keep the parent name alive on disk so pruning leaves it alone
    write_def(
        posts.path(),
        "welcome",
        "type = \"topic\"\ntitle = \"Welcome\"\nbody = \"Hello!\"",
    );

    let scoring = MockScoring::new(vec![], vec![]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    ctx.mirror
        .create_team(1, "Alpha", "alpha-team", 11, 21)
        .await
        .unwrap();

    // Simulate an earlier pass that died after the topic and one sub-post
    use herald::forum::traits::ForumApi;
    let topic_id = forum
        .create_topic(21, "Welcome", "Hello!", None)
        .await
        .unwrap();
    ctx.mirror
        .create_post_record(1, "welcome", topic_id)
        .await
        .unwrap();
    let first_sub = forum.create_reply(topic_id, "Part one.", None).await.unwrap();
    ctx.mirror
        .create_post_record(1, "briefing", first_sub)
        .await
        .unwrap();

    reconcile_posts(&ctx).await.unwrap();

    let state = forum.state.lock().unwrap();
    // Only the two unseen sub-posts were published, in order
    assert_eq!(state.replies.len(), 3);
    assert_eq!(state.replies[1].body, "Part two.");
    assert_eq!(state.replies[2].body, "Part three.");
    drop(state);

    let records = ctx.mirror.list_post_records().await.unwrap();
    assert_eq!(records[&1]["briefing"].len(), 3);
}

#[tokio::test]
async fn allowlist_restricts_publication() {
    let posts = tempfile::tempdir().unwrap();
    write_def(
        posts.path(),
        "welcome",
        "type = \"topic\"\ntitle = \"Welcome\"\nbody = \"Hello!\"",
    );

    let scoring = Arc::new(MockScoring::new(vec![], vec![]));
    let forum = Arc::new(MockForum::new());
    let (_mirror_dir, mirror) = common::temp_mirror();

    let mut settings = common::settings(posts.path());
    settings.team_allowlist = vec!["Alpha".to_string()];

    let ctx = SyncContext::new(scoring, forum.clone(), mirror, settings);
    mirror_teams(&ctx).await;

    reconcile_posts(&ctx).await.unwrap();

    let state = forum.state.lock().unwrap();
    assert_eq!(state.topics.len(), 1);
    assert_eq!(state.topics[0].category_id, 21); // Alpha only
}

#[tokio::test]
async fn manual_trigger_bypasses_gate_but_not_idempotency() {
    let posts = tempfile::tempdir().unwrap();
    write_def(
        posts.path(),
        "surprise",
        "type = \"topic\"\ntitle = \"Surprise\"\nbody = \"Early!\"\n\
         [trigger]\ntype = \"timer\"\nat = \"2099/01/01 00:00\"",
    );

    let scoring = MockScoring::new(vec![], vec![]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    mirror_teams(&ctx).await;

    trigger_post(&ctx, "surprise").await.unwrap();
    assert_eq!(forum.state.lock().unwrap().topics.len(), 2);

    // Re-triggering republishes nothing
    let before = forum.mutation_count();
    trigger_post(&ctx, "surprise").await.unwrap();
    assert_eq!(forum.mutation_count(), before);

    // Unknown names are an error, not a silent no-op
    assert!(trigger_post(&ctx, "no-such-post").await.is_err());
}

#[tokio::test]
async fn prune_deletes_topic_and_record_exactly_once() {
    let posts = tempfile::tempdir().unwrap(); // no definition files at all

    let scoring = MockScoring::new(vec![], vec![]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    ctx.mirror
        .create_team(1, "Alpha", "alpha-team", 11, 21)
        .await
        .unwrap();

    // A topic published for a definition whose file has since been removed
    use herald::forum::traits::ForumApi;
    let topic_id = forum.create_topic(21, "Old", "Old news", None).await.unwrap();
    ctx.mirror
        .create_post_record(1, "retired", topic_id)
        .await
        .unwrap();
    let baseline = forum.mutation_count();

    reconcile_posts(&ctx).await.unwrap();

    assert_eq!(forum.state.lock().unwrap().deleted_topics, vec![topic_id]);
    assert_eq!(forum.mutation_count(), baseline + 1);
    assert!(ctx.mirror.list_post_records().await.unwrap().is_empty());

    // Pruning again finds nothing to do
    reconcile_posts(&ctx).await.unwrap();
    assert_eq!(forum.mutation_count(), baseline + 1);
}

#[tokio::test]
async fn prune_tolerates_reply_records() {
    let posts = tempfile::tempdir().unwrap();

    let scoring = MockScoring::new(vec![], vec![]);
    let (ctx, _scoring, forum, _dir) = context(scoring, MockForum::new(), posts.path());
    ctx.mirror
        .create_team(1, "Alpha", "alpha-team", 11, 21)
        .await
        .unwrap();

    // A reply record: its post id is not a topic, so the platform 404s
    // the topic delete. The mirror row must still be removed.
    ctx.mirror
        .create_post_record(1, "retired-reply", 7777)
        .await
        .unwrap();

    reconcile_posts(&ctx).await.unwrap();

    assert!(ctx.mirror.list_post_records().await.unwrap().is_empty());
    assert!(forum.state.lock().unwrap().deleted_topics.is_empty());
}
