hasura_table! {
    /// Application users. `role` is the default `x-hasura-role`.
    table users as Users {
        columns {
            id => Id: Uuid,
            name => Name: String,
            email => Email: String,
            username => Username: String,
            image => Image: String,
            role => Role: UserRole,
            is_staff => IsStaff: bool,
            is_active => IsActive: bool,
            manager_id => ManagerId: Uuid,
            clerk_user_id => ClerkUserId: String,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            users_pkey => UsersPkey,
            users_email_key => UsersEmailKey,
            users_clerk_user_id_key => UsersClerkUserIdKey,
        }
        object_relationships {
            manager => users,
        }
        array_relationships {
            notes(notes_aggregate) => notes,
            leaves(leaves_aggregate) => leave,
            user_roles(user_roles_aggregate) => user_roles,
        }
    }
}

hasura_table! {
    table roles as Roles {
        columns {
            id => Id: Uuid,
            name => Name: String,
            display_name => DisplayName: String,
            description => Description: String,
            priority => Priority: i32,
            is_system_role => IsSystemRole: bool,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            roles_pkey => RolesPkey,
            roles_name_key => RolesNameKey,
        }
        object_relationships {}
        array_relationships {
            role_permissions(role_permissions_aggregate) => role_permissions,
            user_roles(user_roles_aggregate) => user_roles,
        }
    }
}

hasura_table! {
    /// An action on a resource, e.g. `payrolls` + `approve`.
    table permissions as Permissions {
        columns {
            id => Id: Uuid,
            resource_id => ResourceId: Uuid,
            action => Action: PermissionAction,
            description => Description: String,
            legacy_permission_name => LegacyPermissionName: String,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            permissions_pkey => PermissionsPkey,
            permissions_resource_id_action_key => PermissionsResourceIdActionKey,
        }
        object_relationships {}
        array_relationships {
            role_permissions(role_permissions_aggregate) => role_permissions,
        }
    }
}

hasura_table! {
    table role_permissions as RolePermissions {
        columns {
            id => Id: Uuid,
            role_id => RoleId: Uuid,
            permission_id => PermissionId: Uuid,
            conditions => Conditions: Jsonb,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            role_permissions_pkey => RolePermissionsPkey,
            role_permissions_role_id_permission_id_key => RolePermissionsRoleIdPermissionIdKey,
        }
        object_relationships {
            role => roles,
            permission => permissions,
        }
        array_relationships {}
    }
}

hasura_table! {
    table user_roles as UserRoles {
        columns {
            id => Id: Uuid,
            user_id => UserId: Uuid,
            role_id => RoleId: Uuid,
            created_at => CreatedAt: Timestamptz,
            updated_at => UpdatedAt: Timestamptz,
        }
        primary_key { id: Uuid }
        constraints {
            user_roles_pkey => UserRolesPkey,
            user_roles_user_id_role_id_key => UserRolesUserIdRoleIdKey,
        }
        object_relationships {
            user => users,
            role => roles,
        }
        array_relationships {}
    }
}
