mod common;

use common::FakeFactory;
use quillpad_core::{
    Block, CoreConfig, Document, EditorLifecycle, EditorPhase, InMemoryNoteStore, LifecycleError,
    MountOutcome, Note, NoteIdentity, NoteSelection, SurfaceHost,
};
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

fn stored_note() -> Note {
    let content = Document::from_value(&json!({
        "time": 7,
        "blocks": [
            { "type": "header", "data": { "text": "Trip" } },
            { "type": "paragraph", "data": { "text": "pack light" } }
        ]
    }))
    .unwrap();
    Note {
        id: "n1".to_string(),
        title: "Trip".to_string(),
        content,
        tags: Vec::new(),
        created_at: 1,
        updated_at: 2,
    }
}

fn lifecycle() -> (EditorLifecycle<FakeFactory>, common::Probe) {
    let (factory, probe) = FakeFactory::new();
    (EditorLifecycle::new(factory, &CoreConfig::default()), probe)
}

async fn mounted(
    store: &InMemoryNoteStore,
    selection: NoteSelection,
) -> (EditorLifecycle<FakeFactory>, common::Probe, SurfaceHost) {
    let (mut lifecycle, probe) = lifecycle();
    let (host, surface) = SurfaceHost::new();
    lifecycle.attach_surface(surface);
    lifecycle.load(&selection, None, store).await.unwrap();
    assert_eq!(lifecycle.mount().await.unwrap(), MountOutcome::Mounted);
    (lifecycle, probe, host)
}

#[tokio::test(start_paused = true)]
async fn missing_note_resets_to_idle_and_navigates_back() {
    let (mut lifecycle, probe) = lifecycle();
    let store = InMemoryNoteStore::new();

    let err = lifecycle
        .load(&NoteSelection::Existing("gone".to_string()), None, &store)
        .await
        .unwrap_err();

    assert!(matches!(&err, LifecycleError::NotFound(id) if id == "gone"));
    assert!(err.navigates_back());
    assert_eq!(lifecycle.phase(), EditorPhase::Idle);
    assert_eq!(lifecycle.mount().await.unwrap(), MountOutcome::WaitingForDocument);
    assert_eq!(probe.constructed(), 0);
}

#[tokio::test(start_paused = true)]
async fn stored_content_is_sanitized_before_mounting() {
    let store = InMemoryNoteStore::with_notes([stored_note()]);
    let (mut lifecycle, probe) = lifecycle();
    let (_host, surface) = SurfaceHost::new();
    lifecycle.attach_surface(surface);

    let loaded = lifecycle
        .load(&NoteSelection::Existing("n1".to_string()), None, &store)
        .await
        .unwrap();
    assert_eq!(loaded.identity, NoteIdentity::Persisted("n1".to_string()));
    assert_eq!(loaded.repairs, 1);
    assert_eq!(lifecycle.phase(), EditorPhase::ReadyForMount);

    assert_eq!(lifecycle.mount().await.unwrap(), MountOutcome::Mounted);
    assert_eq!(lifecycle.phase(), EditorPhase::Mounted);
    let initial = probe.latest_initial_document();
    assert_eq!(initial.time, 7);
    assert_eq!(
        initial.blocks,
        vec![Block::header("Trip", 2), Block::paragraph("pack light")]
    );
}

#[tokio::test(start_paused = true)]
async fn cached_note_skips_the_store() {
    let store = InMemoryNoteStore::new();
    let (mut lifecycle, _probe) = lifecycle();

    let loaded = lifecycle
        .load(
            &NoteSelection::Existing("n1".to_string()),
            Some(stored_note()),
            &store,
        )
        .await
        .unwrap();

    assert_eq!(loaded.note.map(|note| note.id), Some("n1".to_string()));
}

#[tokio::test(start_paused = true)]
async fn new_selection_opens_an_empty_draft() {
    let store = InMemoryNoteStore::new();
    let (lifecycle, probe, _host) = mounted(&store, NoteSelection::New).await;

    assert!(lifecycle.identity().unwrap().is_draft());
    assert_eq!(*probe.latest_initial_document(), Document::empty());
}

#[tokio::test(start_paused = true)]
async fn mount_waits_for_an_attached_surface() {
    let store = InMemoryNoteStore::new();
    let (mut lifecycle, probe) = lifecycle();
    lifecycle.load(&NoteSelection::New, None, &store).await.unwrap();

    assert_eq!(lifecycle.mount().await.unwrap(), MountOutcome::WaitingForSurface);
    assert_eq!(lifecycle.phase(), EditorPhase::ReadyForMount);

    let (host, surface) = SurfaceHost::new();
    host.detach();
    lifecycle.attach_surface(surface);
    assert_eq!(lifecycle.mount().await.unwrap(), MountOutcome::WaitingForSurface);

    host.attach();
    assert_eq!(lifecycle.mount().await.unwrap(), MountOutcome::Mounted);
    assert_eq!(probe.constructed(), 1);
}

#[tokio::test(start_paused = true)]
async fn construction_failure_can_be_retried() {
    let store = InMemoryNoteStore::new();
    let (mut lifecycle, probe) = lifecycle();
    let (_host, surface) = SurfaceHost::new();
    lifecycle.attach_surface(surface);
    lifecycle.load(&NoteSelection::New, None, &store).await.unwrap();

    probe.fail_construction(true);
    let err = lifecycle.mount().await.unwrap_err();
    assert!(matches!(err, LifecycleError::EditorConstruction(_)));
    assert!(!err.navigates_back());
    assert_eq!(lifecycle.phase(), EditorPhase::ReadyForMount);
    assert!(lifecycle.last_error().unwrap().contains("failed to load"));

    probe.fail_construction(false);
    assert_eq!(lifecycle.mount().await.unwrap(), MountOutcome::Mounted);
    assert_eq!(lifecycle.last_error(), None);
}

#[tokio::test(start_paused = true)]
async fn detaching_during_the_mount_delay_cancels_construction() {
    let store = InMemoryNoteStore::new();
    let (mut lifecycle, probe) = lifecycle();
    let (host, surface) = SurfaceHost::new();
    lifecycle.attach_surface(surface);
    lifecycle.load(&NoteSelection::New, None, &store).await.unwrap();

    let (outcome, ()) = tokio::join!(lifecycle.mount(), async {
        sleep(Duration::from_millis(10)).await;
        host.detach();
    });

    assert_eq!(outcome.unwrap(), MountOutcome::Cancelled);
    assert_eq!(probe.constructed(), 0);
    assert_eq!(lifecycle.phase(), EditorPhase::ReadyForMount);
}

#[tokio::test(start_paused = true)]
async fn detaching_during_construction_discards_the_editor() {
    let store = InMemoryNoteStore::new();
    let (mut lifecycle, probe) = lifecycle();
    let (host, surface) = SurfaceHost::new();
    lifecycle.attach_surface(surface);
    lifecycle.load(&NoteSelection::New, None, &store).await.unwrap();
    probe.delay_construction(Duration::from_millis(500));

    let (outcome, ()) = tokio::join!(lifecycle.mount(), async {
        sleep(Duration::from_millis(200)).await;
        host.detach();
    });

    assert_eq!(outcome.unwrap(), MountOutcome::Cancelled);
    assert_eq!(probe.constructed(), 0);
    assert_ne!(lifecycle.phase(), EditorPhase::Mounted);
}

#[tokio::test(start_paused = true)]
async fn invalid_notifications_are_ignored() {
    let store = InMemoryNoteStore::new();
    let (mut lifecycle, probe, _host) = mounted(&store, NoteSelection::New).await;
    let sink = probe.latest_sink();

    assert!(sink.notify(json!({ "blocks": "not a list" })));
    assert!(sink.notify(json!(null)));
    assert_eq!(lifecycle.drain_changes(), None);
    assert_eq!(*lifecycle.snapshot().unwrap(), Document::empty());

    sink.notify(json!({ "blocks": 1 }));
    sink.notify(json!({ "blocks": [{ "type": "paragraph", "data": { "text": "typed" } }] }));
    let accepted = lifecycle.next_change().await;
    assert_eq!(accepted.blocks, vec![Block::paragraph("typed")]);
    assert_eq!(lifecycle.snapshot(), Some(accepted));
}

#[tokio::test(start_paused = true)]
async fn rerender_replaces_the_editor_and_ignores_stale_notifications() {
    let store = InMemoryNoteStore::new();
    let (mut lifecycle, probe, _host) = mounted(&store, NoteSelection::New).await;
    let stale_sink = probe.latest_sink();

    let outcome = lifecycle
        .rerender(Document::from_blocks(vec![Block::paragraph("rewritten")]))
        .await
        .unwrap();

    assert_eq!(outcome, MountOutcome::Mounted);
    assert_eq!(probe.constructed(), 2);
    assert_eq!(probe.destroyed(), 1);
    assert_eq!(
        probe.latest_initial_document().blocks,
        vec![Block::paragraph("rewritten")]
    );

    stale_sink.notify_document(&Document::from_blocks(vec![Block::paragraph("old")]));
    assert_eq!(lifecycle.drain_changes(), None);

    probe
        .latest_sink()
        .notify_document(&Document::from_blocks(vec![Block::paragraph("new")]));
    let latest = lifecycle.drain_changes().unwrap();
    assert_eq!(latest.blocks, vec![Block::paragraph("new")]);
}

#[tokio::test(start_paused = true)]
async fn loading_another_note_tears_down_the_mounted_editor() {
    let store = InMemoryNoteStore::with_notes([stored_note()]);
    let (mut lifecycle, probe, _host) = mounted(&store, NoteSelection::New).await;
    let old_sink = probe.latest_sink();

    lifecycle
        .load(&NoteSelection::Existing("n1".to_string()), None, &store)
        .await
        .unwrap();

    assert_eq!(probe.destroyed(), 1);
    assert_eq!(lifecycle.phase(), EditorPhase::ReadyForMount);
    old_sink.notify_document(&Document::empty());
    assert_eq!(lifecycle.drain_changes(), None);
}

#[tokio::test(start_paused = true)]
async fn latest_content_prefers_the_editor_and_falls_back_to_the_snapshot() {
    let store = InMemoryNoteStore::new();
    let (mut lifecycle, probe, _host) = mounted(&store, NoteSelection::New).await;

    probe.set_save_payload(json!({
        "blocks": [{ "type": "header", "data": { "text": "Fresh", "level": 9 } }]
    }));
    let latest = lifecycle.latest_content().await.unwrap();
    assert_eq!(latest.blocks, vec![Block::header("Fresh", 2)]);

    probe.set_save_payload(json!({ "blocks": "broken" }));
    assert_eq!(lifecycle.latest_content().await, Some(latest));
}

#[tokio::test(start_paused = true)]
async fn promote_only_replaces_draft_identities() {
    let store = InMemoryNoteStore::with_notes([stored_note()]);
    let (mut lifecycle, probe, _host) = mounted(&store, NoteSelection::New).await;

    lifecycle.promote("created-id".to_string());
    assert_eq!(
        lifecycle.identity(),
        Some(&NoteIdentity::Persisted("created-id".to_string()))
    );
    lifecycle.promote("other".to_string());
    assert_eq!(
        lifecycle.identity(),
        Some(&NoteIdentity::Persisted("created-id".to_string()))
    );
    assert_eq!(lifecycle.phase(), EditorPhase::Mounted);
    assert_eq!(probe.constructed(), 1);
}

#[tokio::test(start_paused = true)]
async fn destroy_is_idempotent_and_final() {
    let store = InMemoryNoteStore::new();
    let (mut lifecycle, probe, _host) = mounted(&store, NoteSelection::New).await;

    lifecycle.destroy().await;
    lifecycle.destroy().await;

    assert_eq!(probe.destroyed(), 1);
    assert_eq!(lifecycle.phase(), EditorPhase::Destroyed);
    assert_eq!(lifecycle.snapshot(), None);
    assert!(matches!(
        lifecycle.mount().await,
        Err(LifecycleError::NotReady(EditorPhase::Destroyed))
    ));
    assert!(lifecycle
        .load(&NoteSelection::New, None, &store)
        .await
        .is_err());
}
