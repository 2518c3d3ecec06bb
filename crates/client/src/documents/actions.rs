//! Hasura actions backed by the payroll services.

use serde::{Deserialize, Serialize};

use payroll_graphql_types::actions::{
    AuditEventInput, CommitPayrollAssignmentsOutput, ComplianceReportInput,
    ComplianceReportOutput, LogAuditEventOutput, PayrollAssignmentInput,
    SuspiciousActivityOutput,
};
use payroll_graphql_types::scalars::Uuid;

pub struct CommitPayrollAssignments;
pub mod commit_payroll_assignments {
    use super::*;

    pub const OPERATION_NAME: &str = "CommitPayrollAssignments";
    pub const QUERY: &str = "mutation CommitPayrollAssignments($assignments: [PayrollAssignmentInput!]!) {
  commitPayrollAssignments(assignments: $assignments) {
    success
    message
    affectedAssignments {
      id
      payrollId
      payrollDateId
      consultantId
      originalConsultantId
    }
  }
}
";

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Variables {
        pub assignments: Vec<PayrollAssignmentInput>,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        #[serde(rename = "commitPayrollAssignments")]
        pub commit_payroll_assignments: Option<CommitPayrollAssignmentsOutput>,
    }
}
graphql_operation!(CommitPayrollAssignments => commit_payroll_assignments);

pub struct LogAuditEvent;
pub mod log_audit_event {
    use super::*;

    pub const OPERATION_NAME: &str = "LogAuditEvent";
    pub const QUERY: &str = "mutation LogAuditEvent($event: AuditEventInput!) {
  logAuditEvent(event: $event) {
    success
    eventId
  }
}
";

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Variables {
        pub event: AuditEventInput,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        #[serde(rename = "logAuditEvent")]
        pub log_audit_event: Option<LogAuditEventOutput>,
    }
}
graphql_operation!(LogAuditEvent => log_audit_event);

pub struct CheckSuspiciousActivity;
pub mod check_suspicious_activity {
    use super::*;

    pub const OPERATION_NAME: &str = "CheckSuspiciousActivity";
    pub const QUERY: &str = "mutation CheckSuspiciousActivity($userId: uuid, $timeWindow: Int) {
  checkSuspiciousActivity(userId: $userId, timeWindow: $timeWindow) {
    suspicious
    patterns {
      type
      count
      details
    }
    riskLevel
  }
}
";

    /// Both arguments are optional; the action defaults to every user over
    /// the last 24 hours.
    #[derive(Debug, Clone, Default, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub user_id: Option<Uuid>,
        /// Hours.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub time_window: Option<i32>,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        #[serde(rename = "checkSuspiciousActivity")]
        pub check_suspicious_activity: Option<SuspiciousActivityOutput>,
    }
}
graphql_operation!(CheckSuspiciousActivity => check_suspicious_activity);

pub struct GenerateComplianceReport;
pub mod generate_compliance_report {
    use super::*;

    pub const OPERATION_NAME: &str = "GenerateComplianceReport";
    pub const QUERY: &str = "mutation GenerateComplianceReport($input: ComplianceReportInput!) {
  generateComplianceReport(input: $input) {
    success
    reportId
    reportUrl
    generatedAt
    summary
  }
}
";

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Variables {
        pub input: ComplianceReportInput,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct ResponseData {
        #[serde(rename = "generateComplianceReport")]
        pub generate_compliance_report: Option<ComplianceReportOutput>,
    }
}
graphql_operation!(GenerateComplianceReport => generate_compliance_report);

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_client::GraphQLQuery;
    use payroll_graphql_types::actions::RiskLevel;
    use serde_json::json;

    #[test]
    fn commit_assignments_sends_camel_case_inputs() {
        let body = CommitPayrollAssignments::build_query(commit_payroll_assignments::Variables {
            assignments: vec![PayrollAssignmentInput {
                payroll_date_id: "11111111-1111-1111-1111-111111111111".parse().unwrap(),
                consultant_id: "22222222-2222-2222-2222-222222222222".parse().unwrap(),
                original_consultant_id: None,
                is_backup: None,
            }],
        });
        let value = serde_json::to_value(&body.variables).unwrap();
        assert_eq!(
            value,
            json!({"assignments": [{
                "payrollDateId": "11111111-1111-1111-1111-111111111111",
                "consultantId": "22222222-2222-2222-2222-222222222222",
            }]})
        );
    }

    #[test]
    fn suspicious_activity_variables_are_optional() {
        let vars = check_suspicious_activity::Variables::default();
        assert_eq!(serde_json::to_value(&vars).unwrap(), json!({}));
    }

    #[test]
    fn action_results_decode_from_camel_case_fields() {
        let data: check_suspicious_activity::ResponseData = serde_json::from_value(json!({
            "checkSuspiciousActivity": {
                "suspicious": true,
                "patterns": [{"type": "failed_actions", "count": 6, "details": null}],
                "riskLevel": "high",
            }
        }))
        .unwrap();
        let out = data.check_suspicious_activity.unwrap();
        assert!(out.suspicious);
        assert_eq!(out.patterns[0].kind, "failed_actions");
        assert_eq!(out.risk_level, RiskLevel::High);
    }
}
