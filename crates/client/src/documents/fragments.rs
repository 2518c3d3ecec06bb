//! Shared `notes` selection sets.
//!
//! Each fragment exists twice: as a `macro_rules!` literal so documents can
//! splice it with `concat!` at compile time, and as the Rust type its
//! selection decodes into.

use serde::{Deserialize, Serialize};

use payroll_graphql_types::UserRole;
use payroll_graphql_types::scalars::{Timestamptz, Uuid};

macro_rules! note_basic_info_fragment {
    () => {
        "fragment NoteBasicInfo on notes {
  id
  entity_id
  entity_type
  content
  is_important
  user_id
  created_at
  updated_at
}
"
    };
}

/// Requires `note_basic_info_fragment!()` in the same document.
macro_rules! note_with_user_fragment {
    () => {
        "fragment NoteWithUser on notes {
  ...NoteBasicInfo
  user {
    id
    name
    email
  }
}
"
    };
}

macro_rules! note_for_audit_fragment {
    () => {
        "fragment NoteForAudit on notes {
  id
  entity_id
  entity_type
  user_id
  is_important
  created_at
  updated_at
  user {
    id
    name
    email
    role
  }
}
"
    };
}

/// An operation followed by the fragments it needs for `...NoteWithUser`.
macro_rules! with_note_with_user {
    ($operation:literal) => {
        concat!(
            $operation,
            "\n",
            note_with_user_fragment!(),
            "\n",
            note_basic_info_fragment!()
        )
    };
}

macro_rules! with_note_basic_info {
    ($operation:literal) => {
        concat!($operation, "\n", note_basic_info_fragment!())
    };
}

macro_rules! with_note_for_audit {
    ($operation:literal) => {
        concat!($operation, "\n", note_for_audit_fragment!())
    };
}

pub const NOTE_BASIC_INFO: &str = note_basic_info_fragment!();
pub const NOTE_WITH_USER: &str = note_with_user_fragment!();
pub const NOTE_FOR_AUDIT: &str = note_for_audit_fragment!();

/// `...NoteBasicInfo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteBasicInfo {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub entity_type: String,
    pub content: String,
    #[serde(default)]
    pub is_important: bool,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub created_at: Timestamptz,
    pub updated_at: Timestamptz,
}

/// `user { id name email }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// `...NoteWithUser`: the basic fields plus the author. `user` is null for
/// notes without a `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteWithUser {
    #[serde(flatten)]
    pub note: NoteBasicInfo,
    #[serde(default)]
    pub user: Option<NoteUser>,
}

impl NoteWithUser {
    pub fn id(&self) -> Uuid {
        self.note.id
    }

    pub fn author_name(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.name.as_str())
    }
}

impl From<NoteWithUser> for NoteBasicInfo {
    fn from(value: NoteWithUser) -> Self {
        value.note
    }
}

/// `user { id name email role }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// `...NoteForAudit`: everything but `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteForAudit {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub entity_type: String,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub is_important: bool,
    pub created_at: Timestamptz,
    pub updated_at: Timestamptz,
    #[serde(default)]
    pub user: Option<AuditUser>,
}
