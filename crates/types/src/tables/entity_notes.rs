hasura_table! {
    /// Free-text notes attached to any entity by `(entity_type, entity_id)`.
    /// The pair is polymorphic, so there is no foreign key to the entity.
    table notes as Notes {
        columns {
            id => Id: Uuid,
            entity_type => EntityType: String,
            entity_id => EntityId: Uuid,
            user_id => UserId: Uuid,
            content => Content: String,
            is_important => IsImportant: bool,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            notes_pkey => NotesPkey,
        }
        object_relationships {
            user => users,
        }
        array_relationships {}
    }
}
