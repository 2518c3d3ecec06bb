use anyhow::{Result, ensure};

use crate::client::{TestContext, wait_for};
use crate::fixtures;

/// NotesUpdates delivers the current list first, then the list after each
/// insert.
pub async fn notes_updates_follow_inserts(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    let mut updates = ctx.client.notes_updates(entity.clone()).await?;

    wait_for(&mut updates, "initial empty list", |data| data.notes.is_empty()).await?;

    let first = ctx.add_note(&entity, "live 1").await?;
    let seen = wait_for(&mut updates, "first insert", |data| data.notes.len() == 1).await?;
    ensure!(seen.notes[0].id() == first.id(), "pushed the wrong note");

    let second = ctx.add_note(&entity, "live 2").await?;
    let seen = wait_for(&mut updates, "second insert", |data| data.notes.len() == 2).await?;
    ensure!(
        seen.notes[0].id() == second.id(),
        "newest note must come first in pushed lists"
    );

    updates.unsubscribe().await;
    ctx.cleanup(&entity).await
}

/// ImportantNotesUpdates only changes when a flagged note appears.
pub async fn important_notes_updates_skip_plain_notes(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    let mut updates = ctx.client.important_notes_updates(entity.clone()).await?;

    wait_for(&mut updates, "initial empty list", |data| data.notes.is_empty()).await?;

    ctx.add_note(&entity, "routine").await?;
    let flagged = ctx.add_important_note(&entity, "urgent").await?;
    let seen = wait_for(&mut updates, "flagged note", |data| !data.notes.is_empty()).await?;
    ensure!(seen.notes.len() == 1, "plain note leaked: {:?}", seen.notes);
    ensure!(seen.notes[0].id() == flagged.id(), "pushed the wrong note");

    updates.unsubscribe().await;
    ctx.cleanup(&entity).await
}

/// NoteUpdates follows one note through an edit and reports `None` once it
/// is deleted.
pub async fn note_updates_report_deletion(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    let note = ctx.add_note(&entity, "watch me").await?;
    let mut updates = ctx.client.note_updates(note.id()).await?;

    wait_for(&mut updates, "current note", |data| {
        data.notes_by_pk.as_ref().is_some_and(|n| n.id() == note.id())
    })
    .await?;

    ctx.client.update_note_content(note.id(), "edited").await?;
    wait_for(&mut updates, "edited content", |data| {
        data.notes_by_pk
            .as_ref()
            .is_some_and(|n| n.note.content == "edited")
    })
    .await?;

    ctx.client.delete_note(note.id()).await?;
    wait_for(&mut updates, "deletion", |data| data.notes_by_pk.is_none()).await?;

    updates.unsubscribe().await;
    Ok(())
}
