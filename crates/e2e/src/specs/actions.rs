use anyhow::{Result, ensure};
use chrono::NaiveDate;
use uuid::Uuid;

use payroll_graphql_client::{Error, ErrorKind};
use payroll_graphql_types::actions::{AuditEventInput, RiskLevel};

use crate::client::TestContext;
use crate::fixtures;

/// commitPayrollAssignments echoes every committed assignment and flags
/// reassignments.
pub async fn commit_payroll_assignments_reports_affected(ctx: &TestContext) -> Result<()> {
    let original = Uuid::new_v4();
    let assignments = vec![fixtures::assignment(None), fixtures::assignment(Some(original))];

    let out = ctx
        .client
        .commit_payroll_assignments(assignments.clone())
        .await?;
    ensure!(out.success, "commit failed: {:?}", out.message);
    ensure!(
        out.affected_assignments.len() == assignments.len(),
        "expected {} affected, got {}",
        assignments.len(),
        out.affected_assignments.len()
    );
    for (input, affected) in assignments.iter().zip(&out.affected_assignments) {
        ensure!(
            affected.payroll_date_id == input.payroll_date_id
                && affected.consultant_id == input.consultant_id,
            "affected assignment does not match its input"
        );
    }
    ensure!(
        !out.affected_assignments[0].is_reassignment(),
        "fresh assignment reported as reassignment"
    );
    ensure!(
        out.affected_assignments[1].is_reassignment(),
        "reassignment not detected"
    );

    let empty = ctx.client.commit_payroll_assignments(Vec::new()).await?;
    ensure!(!empty.success, "empty commit must not succeed");
    ensure!(empty.affected_assignments.is_empty(), "empty commit affected rows");
    Ok(())
}

/// logAuditEvent acknowledges with an event id; an empty action is rejected.
pub async fn log_audit_event_returns_event_id(ctx: &TestContext) -> Result<()> {
    let out = ctx
        .client
        .log_audit_event(AuditEventInput {
            action: "export".into(),
            resource_type: "payroll".into(),
            resource_id: Some(Uuid::new_v4().to_string()),
            new_values: Some(serde_json::json!({"format": "csv"})),
            success: Some(true),
            ..Default::default()
        })
        .await?;
    ensure!(out.success, "audit event not acknowledged");
    ensure!(out.event_id.is_some(), "missing event id");

    let rejected = ctx
        .client
        .log_audit_event(AuditEventInput {
            action: " ".into(),
            resource_type: "payroll".into(),
            ..Default::default()
        })
        .await;
    match rejected {
        Err(e) => ensure!(
            e.kind() == Some(ErrorKind::DataException),
            "expected data exception, got {e}"
        ),
        Ok(out) => anyhow::bail!("blank action accepted: {out:?}"),
    }
    Ok(())
}

/// Repeated failed logins push checkSuspiciousActivity to an elevated risk
/// for the user who logged them, and only for that user.
pub async fn check_suspicious_activity_flags_failures(ctx: &TestContext) -> Result<()> {
    let user = Some(ctx.require_author()?);
    let before = ctx.client.check_suspicious_activity(user, Some(1)).await?;
    ensure!(!before.suspicious, "quiet endpoint reported suspicious activity");
    ensure!(before.risk_level == RiskLevel::Low, "risk: {:?}", before.risk_level);

    let session = Uuid::new_v4().to_string();
    for _ in 0..3 {
        ctx.client
            .log_audit_event(fixtures::failed_login(&session))
            .await?;
    }

    let after = ctx.client.check_suspicious_activity(user, Some(1)).await?;
    ensure!(after.suspicious, "three failed logins not flagged");
    ensure!(after.risk_level.is_elevated(), "risk: {:?}", after.risk_level);
    let logins = after
        .patterns
        .iter()
        .find(|p| p.kind == "failed_login")
        .ok_or_else(|| anyhow::anyhow!("no failed_login pattern: {:?}", after.patterns))?;
    ensure!(logins.count == 3, "expected 3 failures, got {}", logins.count);

    let bystander = ctx
        .client
        .check_suspicious_activity(Some(Uuid::new_v4()), Some(1))
        .await?;
    ensure!(
        !bystander.suspicious && bystander.patterns.is_empty(),
        "failures attributed to another user: {:?}",
        bystander.patterns
    );
    Ok(())
}

/// generateComplianceReport returns a report for a valid range; an inverted
/// range is refused before anything is sent.
pub async fn generate_compliance_report_summarises_range(ctx: &TestContext) -> Result<()> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1)
        .ok_or_else(|| anyhow::anyhow!("invalid fixture date"))?;
    let out = ctx
        .client
        .generate_compliance_report(fixtures::report_range("soc2", start, 90))
        .await?;
    ensure!(out.success, "report not generated");
    let report_id = out
        .report_id
        .ok_or_else(|| anyhow::anyhow!("missing report id"))?;
    ensure!(
        out.report_url
            .as_deref()
            .is_some_and(|url| url.contains(&report_id.to_string())),
        "report url does not reference the report: {:?}",
        out.report_url
    );
    ensure!(out.generated_at.is_some(), "missing generation time");
    let summary = out
        .summary
        .ok_or_else(|| anyhow::anyhow!("missing summary"))?;
    ensure!(summary["reportType"] == "soc2", "summary: {summary}");

    let inverted = ctx
        .client
        .generate_compliance_report(fixtures::report_range("soc2", start, -1))
        .await;
    ensure!(
        matches!(inverted, Err(Error::InvalidInput(_))),
        "inverted range must be refused locally, got {inverted:?}"
    );
    Ok(())
}
