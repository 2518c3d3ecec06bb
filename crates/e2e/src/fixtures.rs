use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use payroll_graphql_client::EntityRef;
use payroll_graphql_types::actions::{AuditEventInput, ComplianceReportInput, PayrollAssignmentInput};
use payroll_graphql_types::scalars::Timestamptz;

/// Entity type the note specs attach to.
pub const ENTITY_TYPE: &str = "payroll";

/// A payroll id nothing else in the run uses, so specs can run in parallel
/// without seeing each other's notes.
pub fn fresh_entity() -> EntityRef {
    EntityRef::new(Uuid::new_v4(), ENTITY_TYPE)
}

/// An entity with its own entity type, for queries that span every entity
/// of a type.
pub fn fresh_entity_type() -> EntityRef {
    let short = &Uuid::new_v4().simple().to_string()[..8];
    EntityRef::new(Uuid::new_v4(), format!("e2e-{short}"))
}

/// A little before now, tolerant of clock skew against the server.
pub fn just_before_now() -> Timestamptz {
    Utc::now() - Duration::seconds(5)
}

pub fn assignment(original: Option<Uuid>) -> PayrollAssignmentInput {
    PayrollAssignmentInput {
        payroll_date_id: Uuid::new_v4(),
        consultant_id: Uuid::new_v4(),
        original_consultant_id: original,
        is_backup: None,
    }
}

pub fn failed_login(resource_id: &str) -> AuditEventInput {
    AuditEventInput {
        action: "login".into(),
        resource_type: "session".into(),
        resource_id: Some(resource_id.into()),
        success: Some(false),
        error_message: Some("invalid password".into()),
        ..Default::default()
    }
}

pub fn report_range(report_type: &str, start: NaiveDate, days: i64) -> ComplianceReportInput {
    ComplianceReportInput {
        report_type: report_type.into(),
        start_date: start,
        end_date: start + Duration::days(days),
        include_details: Some(true),
    }
}
