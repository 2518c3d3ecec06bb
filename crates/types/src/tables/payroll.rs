hasura_table! {
    table clients as Clients {
        columns {
            id => Id: Uuid,
            name => Name: String,
            contact_person => ContactPerson: String,
            contact_email => ContactEmail: String,
            contact_phone => ContactPhone: String,
            active => Active: bool,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            clients_pkey => ClientsPkey,
        }
        object_relationships {}
        array_relationships {
            payrolls(payrolls_aggregate) => payrolls,
            billing_invoices(billing_invoices_aggregate) => billing_invoice,
        }
    }
}

hasura_table! {
    table payroll_cycles as PayrollCycles {
        columns {
            id => Id: Uuid,
            name => Name: PayrollCycleType,
            description => Description: String,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            payroll_cycles_pkey => PayrollCyclesPkey,
            payroll_cycles_name_key => PayrollCyclesNameKey,
        }
        object_relationships {}
        array_relationships {
            payrolls(payrolls_aggregate) => payrolls,
        }
    }
}

hasura_table! {
    table payroll_date_types as PayrollDateTypes {
        columns {
            id => Id: Uuid,
            name => Name: PayrollDateType,
            description => Description: String,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            payroll_date_types_pkey => PayrollDateTypesPkey,
            payroll_date_types_name_key => PayrollDateTypesNameKey,
        }
        object_relationships {}
        array_relationships {
            payrolls(payrolls_aggregate) => payrolls,
        }
    }
}

hasura_table! {
    /// A client payroll. Edits create a new row with `version_number + 1`
    /// and `parent_payroll_id` pointing at the superseded row.
    table payrolls as Payrolls {
        columns {
            id => Id: Uuid,
            client_id => ClientId: Uuid,
            name => Name: String,
            cycle_id => CycleId: Uuid,
            date_type_id => DateTypeId: Uuid,
            date_value => DateValue: i32,
            primary_consultant_user_id => PrimaryConsultantUserId: Uuid,
            backup_consultant_user_id => BackupConsultantUserId: Uuid,
            manager_user_id => ManagerUserId: Uuid,
            processing_days_before_eft => ProcessingDaysBeforeEft: i32,
            status => Status: PayrollStatus,
            employee_count => EmployeeCount: i32,
            payroll_system => PayrollSystem: String,
            version_number => VersionNumber: i32,
            parent_payroll_id => ParentPayrollId: Uuid,
            go_live_date => GoLiveDate: Date,
            superseded_date => SupersededDate: Date,
            version_reason => VersionReason: String,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            payrolls_pkey => PayrollsPkey,
        }
        object_relationships {
            client => clients,
            cycle => payroll_cycles,
            date_type => payroll_date_types,
            primary_consultant => users,
            backup_consultant => users,
            manager => users,
            parent_payroll => payrolls,
        }
        array_relationships {
            payroll_dates(payroll_dates_aggregate) => payroll_dates,
            child_payrolls(child_payrolls_aggregate) => payrolls,
        }
    }
}

hasura_table! {
    table payroll_dates as PayrollDates {
        columns {
            id => Id: Uuid,
            payroll_id => PayrollId: Uuid,
            original_eft_date => OriginalEftDate: Date,
            adjusted_eft_date => AdjustedEftDate: Date,
            processing_date => ProcessingDate: Date,
            notes => Notes: String,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            payroll_dates_pkey => PayrollDatesPkey,
            payroll_dates_payroll_id_original_eft_date_key => PayrollDatesPayrollIdOriginalEftDateKey,
        }
        object_relationships {
            payroll => payrolls,
        }
        array_relationships {
            payroll_assignments(payroll_assignments_aggregate) => payroll_assignments,
        }
    }
}

hasura_table! {
    /// Consultant assigned to process one payroll date.
    table payroll_assignments as PayrollAssignments {
        columns {
            id => Id: Uuid,
            payroll_date_id => PayrollDateId: Uuid,
            consultant_id => ConsultantId: Uuid,
            original_consultant_id => OriginalConsultantId: Uuid,
            assigned_by => AssignedBy: Uuid,
            is_backup => IsBackup: bool,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            payroll_assignments_pkey => PayrollAssignmentsPkey,
            payroll_assignments_payroll_date_id_key => PayrollAssignmentsPayrollDateIdKey,
        }
        object_relationships {
            payroll_date => payroll_dates,
            consultant => users,
            original_consultant => users,
        }
        array_relationships {}
    }
}
