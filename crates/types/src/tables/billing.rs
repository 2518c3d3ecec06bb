hasura_table! {
    table billing_invoice as BillingInvoice {
        columns {
            id => Id: Uuid,
            client_id => ClientId: Uuid,
            invoice_number => InvoiceNumber: String,
            billing_period_start => BillingPeriodStart: Date,
            billing_period_end => BillingPeriodEnd: Date,
            issued_date => IssuedDate: Date,
            due_date => DueDate: Date,
            total_amount => TotalAmount: Numeric,
            currency => Currency: String,
            status => Status: String,
            notes => Notes: String,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            billing_invoice_pkey => BillingInvoicePkey,
            billing_invoice_invoice_number_key => BillingInvoiceInvoiceNumberKey,
        }
        object_relationships {
            client => clients,
        }
        array_relationships {
            billing_items(billing_items_aggregate) => billing_items,
        }
    }
}

hasura_table! {
    table billing_items as BillingItems {
        columns {
            id => Id: Uuid,
            invoice_id => InvoiceId: Uuid,
            payroll_id => PayrollId: Uuid,
            description => Description: String,
            service_code => ServiceCode: String,
            quantity => Quantity: i32,
            unit_price => UnitPrice: Numeric,
            amount => Amount: Numeric,
            is_approved => IsApproved: bool,
            approved_by => ApprovedBy: Uuid,
            approval_date => ApprovalDate: Timestamptz,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            billing_items_pkey => BillingItemsPkey,
        }
        object_relationships {
            invoice => billing_invoice,
            payroll => payrolls,
        }
        array_relationships {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn invoice_aggregate_sums_line_amounts() {
        let invoice: billing_invoice::Row = serde_json::from_value(json!({
            "invoice_number": "INV-2025-0042",
            "total_amount": 1250.5,
            "billing_items_aggregate": {
                "aggregate": {
                    "count": 2,
                    "sum": {"amount": 1250.5, "quantity": 3.0},
                    "avg": {"unit_price": 416.83}
                }
            }
        }))
        .unwrap();

        let agg = invoice.billing_items_aggregate.unwrap();
        let fields = agg.aggregate.unwrap();
        assert_eq!(fields.count, 2);
        assert_eq!(fields.sum.unwrap()["amount"], Some(1250.5));
        assert_eq!(invoice.total_amount, Some(1250.5));
    }

    #[test]
    fn insert_input_skips_unset_columns() {
        let line = billing_items::InsertInput {
            description: Some("Payroll processing".into()),
            quantity: Some(1),
            unit_price: Some(95.0),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&line).unwrap(),
            json!({"description": "Payroll processing", "quantity": 1, "unit_price": 95.0})
        );
    }
}
