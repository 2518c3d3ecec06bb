use anyhow::{Result, ensure};
use uuid::Uuid;

use payroll_graphql_types::federation::{Entity, Representation};

use crate::client::TestContext;
use crate::fixtures;

/// `_service { sdl }` returns a non-empty SDL that mentions notes.
pub async fn service_sdl_describes_notes(ctx: &TestContext) -> Result<()> {
    let sdl = ctx.client.service_sdl().await?;
    ensure!(!sdl.trim().is_empty(), "empty SDL");
    ensure!(sdl.contains("notes"), "SDL does not describe notes");
    Ok(())
}

/// `_entities` resolves representations in order, with `null` for unknown
/// keys.
pub async fn entities_resolve_notes_in_order(ctx: &TestContext) -> Result<()> {
    let entity = fixtures::fresh_entity();
    let first = ctx.add_note(&entity, "entity one").await?;
    let second = ctx.add_note(&entity, "entity two").await?;

    let resolved = ctx
        .client
        .entities(vec![
            Representation::by_id("notes", second.id()),
            Representation::by_id("notes", Uuid::new_v4()),
            Representation::by_id("notes", first.id()),
        ])
        .await?;
    ensure!(resolved.len() == 3, "expected 3 slots, got {}", resolved.len());

    let id_of = |slot: &Option<Entity>| match slot {
        Some(Entity::Note(row)) => row.id,
        _ => None,
    };
    ensure!(id_of(&resolved[0]) == Some(second.id()), "slot 0: {:?}", resolved[0]);
    ensure!(resolved[1].is_none(), "unknown id must resolve to null");
    ensure!(id_of(&resolved[2]) == Some(first.id()), "slot 2: {:?}", resolved[2]);
    if let Some(Entity::Note(row)) = &resolved[2] {
        ensure!(
            row.content.as_deref() == Some("entity one"),
            "content not selected"
        );
    }

    ensure!(
        ctx.client.entities(Vec::new()).await?.is_empty(),
        "empty representation list must resolve to nothing"
    );

    ctx.cleanup(&entity).await
}
