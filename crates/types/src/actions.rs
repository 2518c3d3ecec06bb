//! Inputs and outputs of the custom actions layered over the generated CRUD.
//!
//! The business logic runs server side; these are the call/response shapes.

use serde::{Deserialize, Serialize};

use crate::scalars::{Date, Jsonb, Timestamptz, Uuid};

// ─── commitPayrollAssignments ────────────────────────────────────────────────

/// One consultant assignment to commit for a payroll date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollAssignmentInput {
    pub payroll_date_id: Uuid,
    pub consultant_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_consultant_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_backup: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPayrollAssignmentsOutput {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub affected_assignments: Vec<AffectedAssignment>,
}

/// An assignment row the commit created or changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedAssignment {
    pub id: Uuid,
    pub payroll_id: Uuid,
    pub payroll_date_id: Uuid,
    pub consultant_id: Uuid,
    #[serde(default)]
    pub original_consultant_id: Option<Uuid>,
}

impl AffectedAssignment {
    /// True when the commit moved the date away from its original consultant.
    pub fn is_reassignment(&self) -> bool {
        self.original_consultant_id
            .is_some_and(|original| original != self.consultant_id)
    }
}

// ─── logAuditEvent ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEventInput {
    pub action: String,
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_values: Option<Jsonb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_values: Option<Jsonb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Jsonb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogAuditEventOutput {
    pub success: bool,
    #[serde(default)]
    pub event_id: Option<Uuid>,
}

// ─── checkSuspiciousActivity ─────────────────────────────────────────────────

/// `riskLevel` of a suspicious-activity check. Literals the client does not
/// know decode into `Other` and count as elevated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    Other(String),
}

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_elevated(&self) -> bool {
        !matches!(self, Self::Low | Self::Medium)
    }
}

impl From<String> for RiskLevel {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Other(raw),
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousPattern {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: i32,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousActivityOutput {
    pub suspicious: bool,
    #[serde(default)]
    pub patterns: Vec<SuspiciousPattern>,
    pub risk_level: RiskLevel,
}

// ─── generateComplianceReport ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReportInput {
    /// e.g. `soc2`, `access_review`, `data_retention`.
    pub report_type: String,
    pub start_date: Date,
    pub end_date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_details: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReportOutput {
    pub success: bool,
    #[serde(default)]
    pub report_id: Option<Uuid>,
    #[serde(default)]
    pub report_url: Option<String>,
    #[serde(default)]
    pub generated_at: Option<Timestamptz>,
    #[serde(default)]
    pub summary: Option<Jsonb>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assignment_input_uses_camel_case_and_skips_unset() {
        let input = PayrollAssignmentInput {
            payroll_date_id: "44444444-4444-4444-4444-444444444444".parse().unwrap(),
            consultant_id: "55555555-5555-5555-5555-555555555555".parse().unwrap(),
            original_consultant_id: None,
            is_backup: Some(true),
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "payrollDateId": "44444444-4444-4444-4444-444444444444",
                "consultantId": "55555555-5555-5555-5555-555555555555",
                "isBackup": true
            })
        );
    }

    #[test]
    fn reassignment_detection() {
        let consultant: Uuid = "55555555-5555-5555-5555-555555555555".parse().unwrap();
        let other: Uuid = "66666666-6666-6666-6666-666666666666".parse().unwrap();
        let mut affected = AffectedAssignment {
            id: Uuid::nil(),
            payroll_id: Uuid::nil(),
            payroll_date_id: Uuid::nil(),
            consultant_id: consultant,
            original_consultant_id: Some(other),
        };
        assert!(affected.is_reassignment());
        affected.original_consultant_id = Some(consultant);
        assert!(!affected.is_reassignment());
        affected.original_consultant_id = None;
        assert!(!affected.is_reassignment());
    }

    #[test]
    fn suspicious_activity_decodes_pattern_type() {
        let out: SuspiciousActivityOutput = serde_json::from_value(json!({
            "suspicious": true,
            "riskLevel": "high",
            "patterns": [{"type": "failed_logins", "count": 7}]
        }))
        .unwrap();
        assert!(out.risk_level.is_elevated());
        assert_eq!(out.patterns[0].kind, "failed_logins");
        assert_eq!(out.patterns[0].details, None);
    }

    #[test]
    fn unknown_risk_level_is_kept_and_treated_as_elevated() {
        let out: SuspiciousActivityOutput = serde_json::from_value(json!({
            "suspicious": true,
            "riskLevel": "severe",
            "patterns": []
        }))
        .unwrap();
        assert_eq!(out.risk_level, RiskLevel::Other("severe".into()));
        assert!(out.risk_level.is_elevated());
        assert_eq!(serde_json::to_value(&out.risk_level).unwrap(), json!("severe"));
        assert!(!RiskLevel::Medium.is_elevated());
        assert_eq!(serde_json::to_value(RiskLevel::Critical).unwrap(), json!("critical"));
    }

    #[test]
    fn compliance_report_dates_are_plain_days() {
        let input = ComplianceReportInput {
            report_type: "soc2".into(),
            start_date: "2025-01-01".parse().unwrap(),
            end_date: "2025-03-31".parse().unwrap(),
            include_details: None,
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"reportType": "soc2", "startDate": "2025-01-01", "endDate": "2025-03-31"})
        );
    }
}
