//! The notes sub-API: notes are free text attached to any entity, keyed by
//! `(entity_id, entity_type)`.

use serde::{Deserialize, Serialize};

use payroll_graphql_types::scalars::{Timestamptz, Uuid};
use payroll_graphql_types::tables::notes;

use super::fragments::{NoteBasicInfo, NoteForAudit, NoteWithUser};

/// `$entityId` / `$entityType` pair shared by the per-entity operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub entity_id: Uuid,
    pub entity_type: String,
}

impl EntityRef {
    pub fn new(entity_id: Uuid, entity_type: impl Into<String>) -> Self {
        Self {
            entity_id,
            entity_type: entity_type.into(),
        }
    }
}

pub struct AddNote;
pub mod add_note {
    use super::*;

    pub const OPERATION_NAME: &str = "AddNote";
    pub const QUERY: &str = with_note_with_user!(
        "mutation AddNote($entityId: uuid!, $entityType: String!, $content: String!, $isImportant: Boolean = false, $userId: uuid) {
  insert_notes_one(object: {entity_id: $entityId, entity_type: $entityType, content: $content, is_important: $isImportant, user_id: $userId}) {
    ...NoteWithUser
  }
}
"
    );

    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub entity_id: Uuid,
        pub entity_type: String,
        pub content: String,
        /// Omitted means the document default, `false`.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub is_important: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub user_id: Option<Uuid>,
    }

    impl Variables {
        pub fn new(entity: EntityRef, content: impl Into<String>) -> Self {
            Self {
                entity_id: entity.entity_id,
                entity_type: entity.entity_type,
                content: content.into(),
                is_important: None,
                user_id: None,
            }
        }

        pub fn important(mut self, is_important: bool) -> Self {
            self.is_important = Some(is_important);
            self
        }

        pub fn by_user(mut self, user_id: Uuid) -> Self {
            self.user_id = Some(user_id);
            self
        }
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        pub insert_notes_one: Option<NoteWithUser>,
    }
}
graphql_operation!(AddNote => add_note);

pub struct UpdateNote;
pub mod update_note {
    use super::*;

    pub const OPERATION_NAME: &str = "UpdateNote";
    pub const QUERY: &str = with_note_with_user!(
        "mutation UpdateNote($id: uuid!, $content: String!, $isImportant: Boolean!) {
  update_notes_by_pk(pk_columns: {id: $id}, _set: {content: $content, is_important: $isImportant, updated_at: \"now()\"}) {
    ...NoteWithUser
  }
}
"
    );

    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub id: Uuid,
        pub content: String,
        pub is_important: bool,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        pub update_notes_by_pk: Option<NoteWithUser>,
    }
}
graphql_operation!(UpdateNote => update_note);

pub struct UpdateNoteContent;
pub mod update_note_content {
    use super::*;

    pub const OPERATION_NAME: &str = "UpdateNoteContent";
    pub const QUERY: &str = with_note_basic_info!(
        "mutation UpdateNoteContent($id: uuid!, $content: String!) {
  update_notes_by_pk(pk_columns: {id: $id}, _set: {content: $content, updated_at: \"now()\"}) {
    ...NoteBasicInfo
  }
}
"
    );

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Variables {
        pub id: Uuid,
        pub content: String,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        pub update_notes_by_pk: Option<NoteBasicInfo>,
    }
}
graphql_operation!(UpdateNoteContent => update_note_content);

pub struct DeleteNote;
pub mod delete_note {
    use super::*;

    pub const OPERATION_NAME: &str = "DeleteNote";
    pub const QUERY: &str = "mutation DeleteNote($id: uuid!) {
  delete_notes_by_pk(id: $id) {
    id
  }
}
";

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Variables {
        pub id: Uuid,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        pub delete_notes_by_pk: Option<DeletedNote>,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct DeletedNote {
        pub id: Uuid,
    }
}
graphql_operation!(DeleteNote => delete_note);

pub struct MarkNoteImportant;
pub mod mark_note_important {
    use super::*;

    pub const OPERATION_NAME: &str = "MarkNoteImportant";
    pub const QUERY: &str = "mutation MarkNoteImportant($id: uuid!, $isImportant: Boolean!) {
  update_notes_by_pk(pk_columns: {id: $id}, _set: {is_important: $isImportant, updated_at: \"now()\"}) {
    id
    is_important
    updated_at
  }
}
";

    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub id: Uuid,
        pub is_important: bool,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        pub update_notes_by_pk: Option<ImportanceChange>,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ImportanceChange {
        pub id: Uuid,
        pub is_important: bool,
        pub updated_at: Timestamptz,
    }
}
graphql_operation!(MarkNoteImportant => mark_note_important);

pub struct BulkDeleteNotes;
pub mod bulk_delete_notes {
    use super::*;

    pub const OPERATION_NAME: &str = "BulkDeleteNotes";
    pub const QUERY: &str = "mutation BulkDeleteNotes($entityId: uuid!, $entityType: String!) {
  delete_notes(where: {entity_id: {_eq: $entityId}, entity_type: {_eq: $entityType}}) {
    affected_rows
  }
}
";

    pub type Variables = EntityRef;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        pub delete_notes: Option<AffectedRows>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
    pub struct AffectedRows {
        pub affected_rows: i64,
    }
}
graphql_operation!(BulkDeleteNotes => bulk_delete_notes);

pub struct GetNotes;
pub mod get_notes {
    use super::*;

    pub const OPERATION_NAME: &str = "GetNotes";
    pub const QUERY: &str = with_note_with_user!(
        "query GetNotes($entityId: uuid!, $entityType: String!, $limit: Int, $offset: Int) {
  notes(where: {entity_id: {_eq: $entityId}, entity_type: {_eq: $entityType}}, order_by: {created_at: desc}, limit: $limit, offset: $offset) {
    ...NoteWithUser
  }
}
"
    );

    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub entity_id: Uuid,
        pub entity_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub limit: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub offset: Option<i32>,
    }

    impl Variables {
        pub fn new(entity: EntityRef) -> Self {
            Self {
                entity_id: entity.entity_id,
                entity_type: entity.entity_type,
                limit: None,
                offset: None,
            }
        }

        pub fn page(mut self, limit: i32, offset: i32) -> Self {
            self.limit = Some(limit);
            self.offset = Some(offset);
            self
        }
    }

    /// Newest first.
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        pub notes: Vec<NoteWithUser>,
    }
}
graphql_operation!(GetNotes => get_notes);

pub struct GetNotesBasic;
pub mod get_notes_basic {
    use super::*;

    pub const OPERATION_NAME: &str = "GetNotesBasic";
    pub const QUERY: &str = with_note_basic_info!(
        "query GetNotesBasic($entityId: uuid!, $entityType: String!) {
  notes(where: {entity_id: {_eq: $entityId}, entity_type: {_eq: $entityType}}, order_by: {created_at: desc}) {
    ...NoteBasicInfo
  }
}
"
    );

    pub type Variables = EntityRef;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        pub notes: Vec<NoteBasicInfo>,
    }
}
graphql_operation!(GetNotesBasic => get_notes_basic);

pub struct GetImportantNotes;
pub mod get_important_notes {
    use super::*;

    pub const OPERATION_NAME: &str = "GetImportantNotes";
    pub const QUERY: &str = with_note_with_user!(
        "query GetImportantNotes($entityId: uuid!, $entityType: String!) {
  notes(where: {entity_id: {_eq: $entityId}, entity_type: {_eq: $entityType}, is_important: {_eq: true}}, order_by: {created_at: desc}) {
    ...NoteWithUser
  }
}
"
    );

    pub type Variables = EntityRef;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        pub notes: Vec<NoteWithUser>,
    }
}
graphql_operation!(GetImportantNotes => get_important_notes);

pub struct GetNoteById;
pub mod get_note_by_id {
    use super::*;

    pub const OPERATION_NAME: &str = "GetNoteById";
    pub const QUERY: &str = with_note_with_user!(
        "query GetNoteById($id: uuid!) {
  notes_by_pk(id: $id) {
    ...NoteWithUser
  }
}
"
    );

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Variables {
        pub id: Uuid,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        pub notes_by_pk: Option<NoteWithUser>,
    }
}
graphql_operation!(GetNoteById => get_note_by_id);

pub struct GetNotesForAudit;
pub mod get_notes_for_audit {
    use super::*;

    pub const OPERATION_NAME: &str = "GetNotesForAudit";
    pub const QUERY: &str = with_note_for_audit!(
        "query GetNotesForAudit($entityType: String!, $since: timestamptz!) {
  notes(where: {entity_type: {_eq: $entityType}, created_at: {_gte: $since}}, order_by: {created_at: asc}) {
    ...NoteForAudit
  }
  notes_aggregate(where: {entity_type: {_eq: $entityType}, created_at: {_gte: $since}}) {
    aggregate {
      count
    }
  }
}
"
    );

    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub entity_type: String,
        pub since: Timestamptz,
    }

    /// Oldest first.
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        pub notes: Vec<NoteForAudit>,
        pub notes_aggregate: notes::Aggregate,
    }
}
graphql_operation!(GetNotesForAudit => get_notes_for_audit);

pub struct NotesUpdates;
pub mod notes_updates {
    use super::*;

    pub const OPERATION_NAME: &str = "NotesUpdates";
    pub const QUERY: &str = with_note_with_user!(
        "subscription NotesUpdates($entityId: uuid!, $entityType: String!) {
  notes(where: {entity_id: {_eq: $entityId}, entity_type: {_eq: $entityType}}, order_by: {created_at: desc}) {
    ...NoteWithUser
  }
}
"
    );

    pub type Variables = EntityRef;
    pub type ResponseData = super::get_notes::ResponseData;
}
graphql_operation!(NotesUpdates => notes_updates);

pub struct ImportantNotesUpdates;
pub mod important_notes_updates {
    use super::*;

    pub const OPERATION_NAME: &str = "ImportantNotesUpdates";
    pub const QUERY: &str = with_note_with_user!(
        "subscription ImportantNotesUpdates($entityId: uuid!, $entityType: String!) {
  notes(where: {entity_id: {_eq: $entityId}, entity_type: {_eq: $entityType}, is_important: {_eq: true}}, order_by: {created_at: desc}) {
    ...NoteWithUser
  }
}
"
    );

    pub type Variables = EntityRef;
    pub type ResponseData = super::get_important_notes::ResponseData;
}
graphql_operation!(ImportantNotesUpdates => important_notes_updates);

pub struct NoteUpdates;
pub mod note_updates {
    use super::*;

    pub const OPERATION_NAME: &str = "NoteUpdates";
    pub const QUERY: &str = with_note_with_user!(
        "subscription NoteUpdates($id: uuid!) {
  notes_by_pk(id: $id) {
    ...NoteWithUser
  }
}
"
    );

    pub type Variables = super::get_note_by_id::Variables;
    pub type ResponseData = super::get_note_by_id::ResponseData;
}
graphql_operation!(NoteUpdates => note_updates);
