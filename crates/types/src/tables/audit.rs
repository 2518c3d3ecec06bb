hasura_table! {
    /// Append-only audit trail. Rows are written by triggers and by the
    /// `logAuditEvent` action, never updated.
    table audit_log as AuditLog {
        columns {
            id => Id: Uuid,
            event_time => EventTime: Timestamptz,
            user_id => UserId: Uuid,
            user_email => UserEmail: String,
            user_role => UserRole: String,
            action => Action: String,
            resource_type => ResourceType: String,
            resource_id => ResourceId: String,
            old_values => OldValues: Jsonb,
            new_values => NewValues: Jsonb,
            ip_address => IpAddress: String,
            user_agent => UserAgent: String,
            session_id => SessionId: String,
            request_id => RequestId: String,
            success => Success: bool,
            error_message => ErrorMessage: String,
            metadata => Metadata: Jsonb,
            created_at => CreatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            audit_log_pkey => AuditLogPkey,
        }
        object_relationships {
            user => users,
        }
        array_relationships {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::comparison::{JsonbComparisonExp, StringComparisonExp};

    #[test]
    fn jsonb_columns_filter_by_containment() {
        let exp = audit_log::BoolExp {
            resource_type: Some(StringComparisonExp::eq("payrolls")),
            new_values: Some(JsonbComparisonExp::contains(json!({"status": "Inactive"}))),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&exp).unwrap(),
            json!({
                "resource_type": {"_eq": "payrolls"},
                "new_values": {"_contains": {"status": "Inactive"}}
            })
        );
    }

    #[test]
    fn jsonb_values_decode_verbatim() {
        let row: audit_log::Row = serde_json::from_value(json!({
            "action": "UPDATE",
            "old_values": {"status": "Active"},
            "new_values": null
        }))
        .unwrap();
        assert_eq!(row.old_values, Some(json!({"status": "Active"})));
        assert_eq!(row.new_values, None);
    }
}
