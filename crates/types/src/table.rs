//! Type-level description of a tracked table.

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A member of a `<table>_select_column` / `<table>_update_column` enum.
pub trait Column: Copy + Eq + Debug + Serialize + Send + Sync + 'static {
    fn all() -> &'static [Self];
    fn as_str(&self) -> &'static str;
}

/// The Hasura type family of one table.
///
/// Implemented by the `Table` marker in every module under
/// [`crate::tables`]; the client's generic CRUD builders read the table name,
/// the primary key and the associated input/output types from here.
pub trait HasuraTable: Send + Sync + 'static {
    const NAME: &'static str;
    /// `(column, GraphQL type)` pairs, in key order.
    const PRIMARY_KEY: &'static [(&'static str, &'static str)];

    type Row: Serialize + DeserializeOwned + Clone + Debug + Default + Send + 'static;
    type BoolExp: Serialize + Clone + Debug + Default + Send + Sync;
    type OrderBy: Serialize + Clone + Debug + Default + Send + Sync;
    type InsertInput: Serialize + Clone + Debug + Send + Sync;
    type SetInput: Serialize + Clone + Debug + Default + Send + Sync;
    type PkColumns: Serialize + Clone + Debug + Send + Sync;
    type SelectColumn: Column;
    type Constraint: Serialize + Clone + Debug + Send + Sync;
    type OnConflict: Serialize + Clone + Debug + Send + Sync;
    type StreamCursorInput: Serialize + Clone + Debug + Default + Send + Sync;

    fn bool_exp_type() -> String {
        format!("{}_bool_exp", Self::NAME)
    }

    fn order_by_type() -> String {
        format!("{}_order_by", Self::NAME)
    }

    fn insert_input_type() -> String {
        format!("{}_insert_input", Self::NAME)
    }

    fn set_input_type() -> String {
        format!("{}_set_input", Self::NAME)
    }

    fn pk_columns_type() -> String {
        format!("{}_pk_columns_input", Self::NAME)
    }

    fn on_conflict_type() -> String {
        format!("{}_on_conflict", Self::NAME)
    }

    fn select_column_type() -> String {
        format!("{}_select_column", Self::NAME)
    }

    fn stream_cursor_type() -> String {
        format!("{}_stream_cursor_input", Self::NAME)
    }
}
