//! Declarative generators for Postgres enums and Hasura table shapes.
//!
//! Hasura derives a fixed family of GraphQL types from every tracked table
//! (`<t>_bool_exp`, `<t>_order_by`, `<t>_insert_input`, ...). Writing them out
//! per table is pure repetition, so the table modules are expanded from a
//! compact column listing instead.

/// Expand a Postgres enum into a Rust enum that keeps unknown literals.
///
/// Serialises to the Postgres literal, deserialises unknown literals into
/// `Other(String)` so a server-side enum addition never breaks decoding.
macro_rules! pg_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $pg_name:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $literal:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Literal unknown to this client build.
            Other(String),
        }

        impl $name {
            /// Postgres type name of this enum.
            pub const PG_TYPE: &'static str = $pg_name;

            /// Every literal this client knows about, in declaration order.
            pub fn known_literals() -> &'static [&'static str] {
                &[$($literal),+]
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $literal, )+
                    Self::Other(raw) => raw.as_str(),
                }
            }

            pub fn from_literal(raw: &str) -> Self {
                match raw {
                    $( $literal => Self::$variant, )+
                    other => Self::Other(other.to_string()),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from_literal(s))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
                ser.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::from_literal(&raw))
            }
        }

        impl crate::comparison::HasuraScalar for $name {
            const GRAPHQL_TYPE: &'static str = $pg_name;
            type Comparison = crate::comparison::ComparisonExp<$name>;
        }
    };
}

/// Expand one tracked table into a module holding its Hasura type family.
///
/// Row fields are all optional: a `Row` is whatever projection the selection
/// set asked for, so unselected columns decode as `None`.
macro_rules! hasura_table {
    (
        $(#[$doc:meta])*
        table $table:ident as $marker:ident {
            columns {
                $( $col:ident => $variant:ident : $ty:ty ),+ $(,)?
            }
            primary_key { $( $pk:ident : $pk_ty:ty ),+ $(,)? }
            constraints { $( $constraint:ident => $cvariant:ident ),+ $(,)? }
            object_relationships { $( $orel:ident => $otable:ident ),* $(,)? }
            array_relationships { $( $arel:ident ( $arel_agg:ident ) => $atable:ident ),* $(,)? }
        }
    ) => {
        $(#[$doc])*
        pub mod $table {
            #![allow(unused_imports)]

            use serde::{Deserialize, Serialize};

            use crate::comparison::HasuraScalar;
            use crate::enums::*;
            use crate::order_by::OrderBy as Direction;
            use crate::scalars::*;
            use crate::table::Column;

            pub const TABLE_NAME: &str = stringify!($table);

            /// Projection of one row, including any selected relationships.
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct Row {
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $col: Option<$ty>,
                )+
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $orel: Option<Box<crate::tables::$otable::Row>>,
                )*
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $arel: Option<Vec<crate::tables::$atable::Row>>,
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $arel_agg: Option<crate::aggregate::Aggregate<crate::tables::$atable::Row>>,
                )*
            }

            /// `<table>_bool_exp`
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct BoolExp {
                #[serde(rename = "_and", default, skip_serializing_if = "Option::is_none")]
                pub and: Option<Vec<BoolExp>>,
                #[serde(rename = "_or", default, skip_serializing_if = "Option::is_none")]
                pub or: Option<Vec<BoolExp>>,
                #[serde(rename = "_not", default, skip_serializing_if = "Option::is_none")]
                pub not: Option<Box<BoolExp>>,
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $col: Option<<$ty as HasuraScalar>::Comparison>,
                )+
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $orel: Option<Box<crate::tables::$otable::BoolExp>>,
                )*
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $arel: Option<Box<crate::tables::$atable::BoolExp>>,
                )*
            }

            impl BoolExp {
                pub fn all_of(exps: Vec<BoolExp>) -> Self {
                    Self {
                        and: Some(exps),
                        ..Default::default()
                    }
                }

                pub fn any_of(exps: Vec<BoolExp>) -> Self {
                    Self {
                        or: Some(exps),
                        ..Default::default()
                    }
                }

                pub fn negate(exp: BoolExp) -> Self {
                    Self {
                        not: Some(Box::new(exp)),
                        ..Default::default()
                    }
                }

                /// True when the expression matches every row.
                pub fn is_empty(&self) -> bool {
                    *self == Self::default()
                }
            }

            /// `<table>_order_by`
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct OrderByInput {
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $col: Option<Direction>,
                )+
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $orel: Option<Box<crate::tables::$otable::OrderByInput>>,
                )*
            }

            /// `<table>_insert_input`
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct InsertInput {
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $col: Option<$ty>,
                )+
            }

            /// `<table>_set_input`
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct SetInput {
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $col: Option<$ty>,
                )+
            }

            /// `<table>_pk_columns_input`
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            pub struct PkColumnsInput {
                $( pub $pk: $pk_ty, )+
            }

            /// `<table>_select_column`
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum SelectColumn {
                $( $variant, )+
            }

            /// Hasura emits a separate `<table>_update_column` enum with the
            /// same members.
            pub type UpdateColumn = SelectColumn;

            impl Column for SelectColumn {
                fn all() -> &'static [Self] {
                    &[$( Self::$variant ),+]
                }

                fn as_str(&self) -> &'static str {
                    match self {
                        $( Self::$variant => stringify!($col), )+
                    }
                }
            }

            impl Serialize for SelectColumn {
                fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
                    ser.serialize_str(self.as_str())
                }
            }

            impl<'de> Deserialize<'de> for SelectColumn {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let raw = String::deserialize(deserializer)?;
                    Self::all()
                        .iter()
                        .copied()
                        .find(|column| column.as_str() == raw)
                        .ok_or_else(|| {
                            serde::de::Error::unknown_variant(&raw, &[$( stringify!($col) ),+])
                        })
                }
            }

            /// `<table>_constraint`
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum Constraint {
                $( $cvariant, )+
            }

            impl Constraint {
                pub fn as_str(&self) -> &'static str {
                    match self {
                        $( Self::$cvariant => stringify!($constraint), )+
                    }
                }
            }

            impl Serialize for Constraint {
                fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
                    ser.serialize_str(self.as_str())
                }
            }

            impl<'de> Deserialize<'de> for Constraint {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let raw = String::deserialize(deserializer)?;
                    match raw.as_str() {
                        $( stringify!($constraint) => Ok(Self::$cvariant), )+
                        _ => Err(serde::de::Error::unknown_variant(
                            &raw,
                            &[$( stringify!($constraint) ),+],
                        )),
                    }
                }
            }

            /// `<table>_on_conflict`
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            pub struct OnConflict {
                pub constraint: Constraint,
                #[serde(default)]
                pub update_columns: Vec<UpdateColumn>,
                #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
                pub filter: Option<BoolExp>,
            }

            impl OnConflict {
                /// Ignore the conflicting row.
                pub fn do_nothing(constraint: Constraint) -> Self {
                    Self {
                        constraint,
                        update_columns: Vec::new(),
                        filter: None,
                    }
                }

                /// Overwrite `columns` on the conflicting row.
                pub fn update(constraint: Constraint, columns: Vec<UpdateColumn>) -> Self {
                    Self {
                        constraint,
                        update_columns: columns,
                        filter: None,
                    }
                }
            }

            /// `<table>_stream_cursor_value_input`
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct StreamCursorValueInput {
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $col: Option<$ty>,
                )+
            }

            /// `<table>_stream_cursor_input`
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct StreamCursorInput {
                pub initial_value: StreamCursorValueInput,
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub ordering: Option<CursorOrdering>,
            }

            /// `<table>_aggregate`
            pub type Aggregate = crate::aggregate::Aggregate<Row>;

            /// Type-level handle used by the generic CRUD builders.
            #[derive(Debug, Clone, Copy, Default)]
            pub struct Table;

            impl crate::table::HasuraTable for Table {
                const NAME: &'static str = TABLE_NAME;
                const PRIMARY_KEY: &'static [(&'static str, &'static str)] =
                    &[$( (stringify!($pk), <$pk_ty as HasuraScalar>::GRAPHQL_TYPE) ),+];

                type Row = Row;
                type BoolExp = BoolExp;
                type OrderBy = OrderByInput;
                type InsertInput = InsertInput;
                type SetInput = SetInput;
                type PkColumns = PkColumnsInput;
                type SelectColumn = SelectColumn;
                type Constraint = Constraint;
                type OnConflict = OnConflict;
                type StreamCursorInput = StreamCursorInput;
            }
        }

        pub type $marker = $table::Table;
    };
}
