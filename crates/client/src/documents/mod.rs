//! Static GraphQL operations.
//!
//! Every operation is a unit struct implementing
//! [`graphql_client::GraphQLQuery`], paired with a snake_case module holding
//! its `OPERATION_NAME`, `QUERY`, `Variables` and `ResponseData`.

#[macro_use]
mod fragments;

/// `impl GraphQLQuery for $op` from the items in `$module`.
macro_rules! graphql_operation {
    ($op:ident => $module:ident) => {
        impl graphql_client::GraphQLQuery for $op {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> graphql_client::QueryBody<Self::Variables> {
                graphql_client::QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

pub mod actions;
pub mod federation;
pub mod notes;

pub use fragments::{
    AuditUser, NOTE_BASIC_INFO, NOTE_FOR_AUDIT, NOTE_WITH_USER, NoteBasicInfo, NoteForAudit,
    NoteUser, NoteWithUser,
};

/// `(operation name, document)` for every static operation.
pub const ALL: &[(&str, &str)] = &[
    (notes::add_note::OPERATION_NAME, notes::add_note::QUERY),
    (notes::update_note::OPERATION_NAME, notes::update_note::QUERY),
    (
        notes::update_note_content::OPERATION_NAME,
        notes::update_note_content::QUERY,
    ),
    (notes::delete_note::OPERATION_NAME, notes::delete_note::QUERY),
    (
        notes::mark_note_important::OPERATION_NAME,
        notes::mark_note_important::QUERY,
    ),
    (
        notes::bulk_delete_notes::OPERATION_NAME,
        notes::bulk_delete_notes::QUERY,
    ),
    (notes::get_notes::OPERATION_NAME, notes::get_notes::QUERY),
    (notes::get_notes_basic::OPERATION_NAME, notes::get_notes_basic::QUERY),
    (
        notes::get_important_notes::OPERATION_NAME,
        notes::get_important_notes::QUERY,
    ),
    (notes::get_note_by_id::OPERATION_NAME, notes::get_note_by_id::QUERY),
    (
        notes::get_notes_for_audit::OPERATION_NAME,
        notes::get_notes_for_audit::QUERY,
    ),
    (notes::notes_updates::OPERATION_NAME, notes::notes_updates::QUERY),
    (
        notes::important_notes_updates::OPERATION_NAME,
        notes::important_notes_updates::QUERY,
    ),
    (notes::note_updates::OPERATION_NAME, notes::note_updates::QUERY),
    (
        actions::commit_payroll_assignments::OPERATION_NAME,
        actions::commit_payroll_assignments::QUERY,
    ),
    (
        actions::log_audit_event::OPERATION_NAME,
        actions::log_audit_event::QUERY,
    ),
    (
        actions::check_suspicious_activity::OPERATION_NAME,
        actions::check_suspicious_activity::QUERY,
    ),
    (
        actions::generate_compliance_report::OPERATION_NAME,
        actions::generate_compliance_report::QUERY,
    ),
    (federation::service_sdl::OPERATION_NAME, federation::service_sdl::QUERY),
    (federation::entities::OPERATION_NAME, federation::entities::QUERY),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{OperationKind, check_document};
    use std::collections::HashSet;

    #[test]
    fn every_document_is_self_consistent() {
        for (name, query) in ALL {
            check_document(query, name).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn operation_names_are_unique() {
        let names: HashSet<_> = ALL.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn subscriptions_are_exactly_the_updates_feeds() {
        let subscriptions: Vec<_> = ALL
            .iter()
            .filter(|(_, query)| OperationKind::detect(query) == OperationKind::Subscription)
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(
            subscriptions,
            vec!["NotesUpdates", "ImportantNotesUpdates", "NoteUpdates"]
        );
    }

    #[test]
    fn note_with_user_documents_also_define_basic_info() {
        for (name, query) in ALL {
            if query.contains("...NoteWithUser") {
                assert!(
                    query.contains("fragment NoteBasicInfo on notes"),
                    "{name} spreads NoteWithUser without NoteBasicInfo"
                );
            }
        }
    }
}
