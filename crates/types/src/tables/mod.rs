//! One module per tracked table, each expanded by `hasura_table!`.
//!
//! Every module exposes `Row`, `BoolExp`, `OrderByInput`, `InsertInput`,
//! `SetInput`, `PkColumnsInput`, `SelectColumn`, `UpdateColumn`,
//! `Constraint`, `OnConflict`, `StreamCursorInput`, `Aggregate` and the
//! `Table` marker; the marker is also re-exported under a CamelCase alias
//! (`Notes`, `Payrolls`, ...).

mod audit;
mod billing;
mod entity_notes;
mod leave_requests;
mod payroll;
mod rbac;

pub use audit::*;
pub use billing::*;
pub use entity_notes::*;
pub use leave_requests::*;
pub use payroll::*;
pub use rbac::*;
