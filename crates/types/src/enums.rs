//! Postgres enums exposed through Hasura.

use serde::{Deserialize, Serialize};

pg_enum! {
    /// Lifecycle state of a payroll.
    PayrollStatus as "payroll_status" {
        Implementation => "Implementation",
        Active => "Active",
        Inactive => "Inactive",
    }
}

pg_enum! {
    /// How often a payroll runs.
    PayrollCycleType as "payroll_cycle_type" {
        Weekly => "weekly",
        Fortnightly => "fortnightly",
        BiMonthly => "bi_monthly",
        Monthly => "monthly",
        Quarterly => "quarterly",
    }
}

pg_enum! {
    /// Rule used to place a payroll's processing date within its cycle.
    PayrollDateType as "payroll_date_type" {
        FixedDate => "fixed_date",
        /// End of month.
        Eom => "eom",
        /// Start of month.
        Som => "som",
        WeekA => "week_a",
        WeekB => "week_b",
        /// Fixed day of week.
        Dow => "dow",
    }
}

pg_enum! {
    LeaveStatus as "leave_status_enum" {
        Pending => "Pending",
        Approved => "Approved",
        Rejected => "Rejected",
    }
}

pg_enum! {
    /// Application-level role; also the value of `x-hasura-role`.
    UserRole as "user_role" {
        Developer => "developer",
        OrgAdmin => "org_admin",
        Manager => "manager",
        Consultant => "consultant",
        Viewer => "viewer",
    }
}

pg_enum! {
    PermissionAction as "permission_action" {
        Create => "create",
        Read => "read",
        Update => "update",
        Delete => "delete",
        List => "list",
        Manage => "manage",
        Approve => "approve",
        Reject => "reject",
    }
}

/// Direction of a `_stream` subscription cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CursorOrdering {
    #[default]
    Asc,
    Desc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_literals_round_trip() {
        for literal in PayrollCycleType::known_literals() {
            let value: PayrollCycleType = serde_json::from_value((*literal).into()).unwrap();
            assert!(value.is_known());
            assert_eq!(serde_json::to_value(&value).unwrap(), *literal);
        }
    }

    #[test]
    fn unknown_literal_is_preserved() {
        let status: PayrollStatus = serde_json::from_str("\"Suspended\"").unwrap();
        assert_eq!(status, PayrollStatus::Other("Suspended".to_string()));
        assert!(!status.is_known());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Suspended\"");
    }

    #[test]
    fn literals_are_case_sensitive() {
        // Postgres enum comparison is exact; "active" is not "Active".
        assert_eq!(
            PayrollStatus::from_literal("active"),
            PayrollStatus::Other("active".to_string())
        );
        assert_eq!(PayrollStatus::from_literal("Active"), PayrollStatus::Active);
    }

    #[test]
    fn display_matches_wire_literal() {
        assert_eq!(UserRole::OrgAdmin.to_string(), "org_admin");
        assert_eq!(PayrollDateType::WeekB.to_string(), "week_b");
        assert_eq!(LeaveStatus::Approved.as_str(), "Approved");
    }

    #[test]
    fn parse_from_str_never_fails() {
        let action: PermissionAction = "approve".parse().unwrap();
        assert_eq!(action, PermissionAction::Approve);
        let odd: PermissionAction = "escalate".parse().unwrap();
        assert_eq!(odd.as_str(), "escalate");
    }

    #[test]
    fn cursor_ordering_uses_upper_case() {
        assert_eq!(
            serde_json::to_string(&CursorOrdering::Desc).unwrap(),
            "\"DESC\""
        );
    }
}
