hasura_table! {
    table leave as Leave {
        columns {
            id => Id: Uuid,
            user_id => UserId: Uuid,
            start_date => StartDate: Date,
            end_date => EndDate: Date,
            leave_type => LeaveType: String,
            reason => Reason: String,
            status => Status: LeaveStatus,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            leave_pkey => LeavePkey,
        }
        object_relationships {
            user => users,
        }
        array_relationships {}
    }
}
