use anyhow::{Result, ensure};
use uuid::Uuid;

use payroll_graphql_client::{EntityRef, ErrorKind};
use payroll_graphql_client::documents::notes::{add_note, get_notes};

use crate::client::TestContext;
use crate::fixtures;

/// AddNote returns the inserted row through the `NoteWithUser` fragment.
pub async fn add_note_returns_note_with_user(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    let note = ctx.add_note(&entity, "first note").await?;

    ensure!(note.note.entity_id == entity.entity_id, "entity id mismatch");
    ensure!(note.note.entity_type == entity.entity_type, "entity type mismatch");
    ensure!(note.note.content == "first note", "content: {:?}", note.note.content);
    ensure!(
        note.note.created_at == note.note.updated_at,
        "fresh note must not look edited"
    );
    ensure!(note.user.is_none(), "anonymous note has no author");

    ctx.cleanup(&entity).await
}

/// Omitting `isImportant` falls back to the document default.
pub async fn add_note_defaults_to_not_important(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    let note = ctx.add_note(&entity, "plain").await?;
    ensure!(!note.note.is_important, "default must be not important");

    let flagged = ctx.add_important_note(&entity, "flagged").await?;
    ensure!(flagged.note.is_important, "explicit flag must stick");

    ctx.cleanup(&entity).await
}

/// UpdateNote overwrites content and importance and bumps `updated_at`.
pub async fn update_note_replaces_content_and_importance(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    let note = ctx.add_note(&entity, "draft").await?;

    let updated = ctx
        .client
        .update_note(note.id(), "final", true)
        .await?
        .ok_or_else(|| anyhow::anyhow!("update returned no row"))?;
    ensure!(updated.id() == note.id(), "update changed identity");
    ensure!(updated.note.content == "final", "content not replaced");
    ensure!(updated.note.is_important, "importance not replaced");
    ensure!(
        updated.note.updated_at > note.note.updated_at,
        "updated_at must move forward"
    );
    ensure!(
        updated.note.created_at == note.note.created_at,
        "created_at must not change"
    );

    ctx.cleanup(&entity).await
}

/// UpdateNoteContent edits only the text.
pub async fn update_note_content_keeps_importance(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    let note = ctx.add_important_note(&entity, "v1").await?;

    let updated = ctx
        .client
        .update_note_content(note.id(), "v2")
        .await?
        .ok_or_else(|| anyhow::anyhow!("update returned no row"))?;
    ensure!(updated.content == "v2", "content not replaced");
    ensure!(updated.is_important, "importance must survive a content edit");

    ctx.cleanup(&entity).await
}

/// Updating an id that does not exist yields `None`, not an error.
pub async fn update_missing_note_returns_none(ctx: &TestContext) -> Result<()> {
    let missing = Uuid::new_v4();
    let updated = ctx.client.update_note(missing, "ghost", false).await?;
    ensure!(updated.is_none(), "expected no row, got {updated:?}");
    let edited = ctx.client.update_note_content(missing, "ghost").await?;
    ensure!(edited.is_none(), "expected no row, got {edited:?}");
    Ok(())
}

/// DeleteNote reports the id the first time and `None` afterwards.
pub async fn delete_note_returns_id_once(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    let note = ctx.add_note(&entity, "to delete").await?;

    let deleted = ctx.client.delete_note(note.id()).await?;
    ensure!(deleted == Some(note.id()), "expected {}, got {deleted:?}", note.id());
    let again = ctx.client.delete_note(note.id()).await?;
    ensure!(again.is_none(), "second delete must find nothing");
    ensure!(
        ctx.client.get_note_by_id(note.id()).await?.is_none(),
        "deleted note still readable"
    );
    Ok(())
}

/// MarkNoteImportant flips the flag both ways.
pub async fn mark_note_important_toggles(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    let note = ctx.add_note(&entity, "toggle me").await?;

    let on = ctx
        .client
        .mark_note_important(note.id(), true)
        .await?
        .ok_or_else(|| anyhow::anyhow!("mark returned no row"))?;
    ensure!(on.id == note.id() && on.is_important, "flag not set");
    ensure!(on.updated_at > note.note.updated_at, "updated_at not bumped");

    let off = ctx
        .client
        .mark_note_important(note.id(), false)
        .await?
        .ok_or_else(|| anyhow::anyhow!("unmark returned no row"))?;
    ensure!(!off.is_important, "flag not cleared");

    let missing = ctx.client.mark_note_important(Uuid::new_v4(), true).await?;
    ensure!(missing.is_none(), "unknown id must yield no row");

    ctx.cleanup(&entity).await
}

/// BulkDeleteNotes deletes exactly the notes on `(entityId, entityType)` and
/// reports that count.
pub async fn bulk_delete_removes_only_matching_entity(ctx: &TestContext) -> Result<()> {
    let target = fixtures::fresh_entity();
    let same_id_other_type = EntityRef::new(target.entity_id, "client");
    let bystander = fixtures::fresh_entity();

    for content in ["a", "b", "c"] {
        ctx.add_note(&target, content).await?;
    }
    ctx.add_note(&same_id_other_type, "other type").await?;
    ctx.add_note(&bystander, "other entity").await?;

    let deleted = ctx.client.bulk_delete_notes(target.clone()).await?;
    ensure!(deleted == 3, "expected 3 deleted, got {deleted}");
    ensure!(
        ctx.client.get_notes_basic(target.clone()).await?.is_empty(),
        "target still has notes"
    );
    ensure!(
        ctx.client.get_notes_basic(same_id_other_type.clone()).await?.len() == 1,
        "note with another entity type was deleted"
    );
    ensure!(
        ctx.client.get_notes_basic(bystander.clone()).await?.len() == 1,
        "note on another entity was deleted"
    );

    let again = ctx.client.bulk_delete_notes(target).await?;
    ensure!(again == 0, "second bulk delete must report 0, got {again}");

    ctx.cleanup(&same_id_other_type).await?;
    ctx.cleanup(&bystander).await
}

/// GetNotes lists newest first.
pub async fn get_notes_orders_newest_first(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    for content in ["oldest", "middle", "newest"] {
        ctx.add_note(&entity, content).await?;
    }

    let notes = ctx
        .client
        .get_notes(get_notes::Variables::new(entity.clone()))
        .await?;
    let contents: Vec<&str> = notes.iter().map(|n| n.note.content.as_str()).collect();
    ensure!(
        contents == ["newest", "middle", "oldest"],
        "unexpected order: {contents:?}"
    );
    ensure!(
        notes
            .windows(2)
            .all(|pair| pair[0].note.created_at >= pair[1].note.created_at),
        "created_at not descending"
    );

    ctx.cleanup(&entity).await
}

/// `limit` / `offset` page through the same ordering.
pub async fn get_notes_pages_with_limit_and_offset(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    for n in 1..=5 {
        ctx.add_note(&entity, &format!("note {n}")).await?;
    }

    let first = page_contents(ctx, &entity, 2, 0).await?;
    let second = page_contents(ctx, &entity, 2, 2).await?;
    let last = page_contents(ctx, &entity, 2, 4).await?;
    ensure!(first == ["note 5", "note 4"], "first page: {first:?}");
    ensure!(second == ["note 3", "note 2"], "second page: {second:?}");
    ensure!(last == ["note 1"], "last page: {last:?}");
    ensure!(
        page_contents(ctx, &entity, 2, 10).await?.is_empty(),
        "page past the end must be empty"
    );

    ctx.cleanup(&entity).await
}

async fn page_contents(
    ctx: &TestContext,
    entity: &EntityRef,
    limit: i32,
    offset: i32,
) -> Result<Vec<String>> {
    let notes = ctx
        .client
        .get_notes(get_notes::Variables::new(entity.clone()).page(limit, offset))
        .await?;
    Ok(notes.into_iter().map(|n| n.note.content).collect())
}

/// GetNotesBasic returns the same rows as GetNotes without the author.
pub async fn get_notes_basic_matches_full_listing(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    ctx.add_note(&entity, "one").await?;
    ctx.add_important_note(&entity, "two").await?;

    let full = ctx
        .client
        .get_notes(get_notes::Variables::new(entity.clone()))
        .await?;
    let basic = ctx.client.get_notes_basic(entity.clone()).await?;
    let stripped: Vec<_> = full.into_iter().map(|n| n.note).collect();
    ensure!(stripped == basic, "basic listing differs from full listing");

    ctx.cleanup(&entity).await
}

/// GetImportantNotes returns only flagged notes.
pub async fn get_important_notes_filters_flag(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    ctx.add_note(&entity, "routine").await?;
    let flagged = ctx.add_important_note(&entity, "urgent").await?;
    let later = ctx.add_note(&entity, "later flagged").await?;
    ctx.client.mark_note_important(later.id(), true).await?;

    let important = ctx.client.get_important_notes(entity.clone()).await?;
    let ids: Vec<Uuid> = important.iter().map(|n| n.id()).collect();
    ensure!(
        ids == [later.id(), flagged.id()],
        "expected the two flagged notes newest first, got {ids:?}"
    );
    ensure!(important.iter().all(|n| n.note.is_important), "unflagged note returned");

    ctx.cleanup(&entity).await
}

/// GetNoteById yields `None` for an unknown id and the row for a known one.
pub async fn get_note_by_id_missing_is_none(ctx: &TestContext) -> Result<()> {
    ensure!(
        ctx.client.get_note_by_id(Uuid::new_v4()).await?.is_none(),
        "unknown id must yield None"
    );

    let entity = fixtures::fresh_entity();
    let note = ctx.add_note(&entity, "findable").await?;
    let found = ctx.client.get_note_by_id(note.id()).await?;
    ensure!(found.as_ref() == Some(&note), "lookup differs from insert: {found:?}");

    ctx.cleanup(&entity).await
}

/// GetNotesForAudit lists notes of a type created since a point in time,
/// oldest first, with a matching aggregate count.
pub async fn get_notes_for_audit_counts_since(ctx: &TestContext) -> Result<()> {
    let since = fixtures::just_before_now();
    let entity = fixtures::fresh_entity_type();
    let sibling =
        EntityRef::new(Uuid::new_v4(), entity.entity_type.clone());

    let first = ctx.add_note(&entity, "audit 1").await?;
    let second = ctx.add_note(&sibling, "audit 2").await?;

    let audit = ctx
        .client
        .get_notes_for_audit(entity.entity_type.clone(), since)
        .await?;
    ensure!(audit.total == 2, "expected count 2, got {}", audit.total);
    let ids: Vec<Uuid> = audit.notes.iter().map(|n| n.id).collect();
    ensure!(ids == [first.id(), second.id()], "expected oldest first, got {ids:?}");
    ensure!(
        audit.notes.iter().all(|n| n.entity_type == entity.entity_type),
        "note of another type leaked into the audit"
    );

    let future = chrono::Utc::now() + chrono::Duration::hours(1);
    let none = ctx
        .client
        .get_notes_for_audit(entity.entity_type.clone(), future)
        .await?;
    ensure!(none.total == 0 && none.notes.is_empty(), "future window must be empty");

    ctx.cleanup(&entity).await?;
    ctx.cleanup(&sibling).await
}

/// A note attributed to an existing user embeds that user.
pub async fn add_note_by_seeded_user_embeds_author(ctx: &TestContext) -> Result<()> {
    let author = ctx.require_author()?;
    let entity = fixtures::fresh_entity();
    let note = ctx
        .client
        .add_note(add_note::Variables::new(entity.clone(), "signed").by_user(author))
        .await?;

    ensure!(note.note.user_id == Some(author), "user_id not stored");
    let user = note
        .user
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("author not embedded"))?;
    ensure!(user.id == author, "embedded author mismatch");
    ensure!(note.author_name().is_some(), "author name missing");

    let audit = ctx
        .client
        .get_notes_for_audit(entity.entity_type.clone(), note.note.created_at)
        .await?;
    let row = audit
        .notes
        .iter()
        .find(|n| n.id == note.id())
        .ok_or_else(|| anyhow::anyhow!("note missing from audit listing"))?;
    ensure!(
        row.user.as_ref().is_some_and(|u| u.id == author),
        "audit row lacks its author"
    );

    ctx.cleanup(&entity).await
}

/// Attributing a note to a user that does not exist violates the foreign key.
pub async fn add_note_by_unknown_user_violates_constraint(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    let result = ctx
        .client
        .add_note(add_note::Variables::new(entity.clone(), "orphan").by_user(Uuid::new_v4()))
        .await;
    let err = match result {
        Ok(note) => anyhow::bail!("insert unexpectedly succeeded: {note:?}"),
        Err(e) => e,
    };
    ensure!(
        err.kind() == Some(ErrorKind::ConstraintViolation),
        "expected constraint violation, got {err}"
    );
    ensure!(
        ctx.client.get_notes_basic(entity).await?.is_empty(),
        "failed insert left a row behind"
    );
    Ok(())
}
