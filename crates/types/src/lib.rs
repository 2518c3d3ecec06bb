//! Typed mirror of the payroll Hasura GraphQL schema.
//!
//! This crate is the **single source of truth** for the shapes exchanged with
//! the Hasura endpoint: custom scalars, Postgres enums, the generic
//! `_bool_exp` / `order_by` / `_aggregate` / `on_conflict` building blocks and
//! one module per exposed table. It carries no transport; see
//! `payroll-graphql-client` for that.

#[macro_use]
mod macros;

pub mod actions;
pub mod aggregate;
pub mod comparison;
pub mod enums;
pub mod federation;
pub mod mutation;
pub mod order_by;
pub mod scalars;
pub mod table;
pub mod tables;

pub use aggregate::{Aggregate, AggregateFields, ColumnStats};
pub use comparison::{ComparisonExp, HasuraScalar, JsonbComparisonExp, StringComparisonExp};
pub use enums::{
    CursorOrdering, LeaveStatus, PayrollCycleType, PayrollDateType, PayrollStatus,
    PermissionAction, UserRole,
};
pub use mutation::MutationResponse;
pub use order_by::OrderBy;
pub use table::{Column, HasuraTable};
