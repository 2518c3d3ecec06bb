//! Apollo Federation surface (`_service`, `_entities`, `_Any`, `Entity`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::scalars::Uuid;
use crate::tables::{clients, notes, payrolls, users};

/// `_Service`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub sdl: Option<String>,
}

/// `_Any`: an entity reference, `__typename` plus its key fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representation {
    #[serde(rename = "__typename")]
    pub typename: String,
    #[serde(flatten)]
    pub keys: Map<String, Value>,
}

impl Representation {
    pub fn new(typename: impl Into<String>, keys: Map<String, Value>) -> Self {
        Self {
            typename: typename.into(),
            keys,
        }
    }

    /// Reference keyed by a single `id` column.
    pub fn by_id(typename: impl Into<String>, id: Uuid) -> Self {
        let mut keys = Map::new();
        keys.insert("id".to_string(), Value::String(id.to_string()));
        Self::new(typename, keys)
    }
}

/// The `_Entity` union, resolved by `__typename`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "__typename")]
pub enum Entity {
    #[serde(rename = "users")]
    User(users::Row),
    #[serde(rename = "payrolls")]
    Payroll(payrolls::Row),
    #[serde(rename = "clients")]
    Client(clients::Row),
    #[serde(rename = "notes")]
    Note(notes::Row),
    /// A member this client does not model.
    #[serde(other)]
    Unknown,
}

impl Entity {
    pub fn typename(&self) -> Option<&'static str> {
        match self {
            Self::User(_) => Some(users::TABLE_NAME),
            Self::Payroll(_) => Some(payrolls::TABLE_NAME),
            Self::Client(_) => Some(clients::TABLE_NAME),
            Self::Note(_) => Some(notes::TABLE_NAME),
            Self::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn representation_flattens_keys_next_to_typename() {
        let id: Uuid = "77777777-7777-7777-7777-777777777777".parse().unwrap();
        let rep = Representation::by_id("payrolls", id);
        assert_eq!(
            serde_json::to_value(&rep).unwrap(),
            json!({"__typename": "payrolls", "id": "77777777-7777-7777-7777-777777777777"})
        );
    }

    #[test]
    fn entities_dispatch_on_typename() {
        let entities: Vec<Option<Entity>> = serde_json::from_value(json!([
            {"__typename": "users", "id": "77777777-7777-7777-7777-777777777777", "name": "Ada"},
            {"__typename": "notes", "content": "hello"},
            {"__typename": "leave"},
            null
        ]))
        .unwrap();

        match &entities[0] {
            Some(Entity::User(user)) => assert_eq!(user.name.as_deref(), Some("Ada")),
            other => panic!("expected user, got {other:?}"),
        }
        assert_eq!(entities[1].as_ref().and_then(Entity::typename), Some("notes"));
        assert_eq!(entities[2], Some(Entity::Unknown));
        assert!(entities[3].is_none());
    }
}
