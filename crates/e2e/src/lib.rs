pub mod client;
pub mod fixtures;
pub mod mock;
pub mod runner;
pub mod specs;

/// Invoke `$mac!(module::name)` for every spec that holds against any Hasura
/// endpoint carrying the payroll schema.
///
/// This is the **single source of truth** for the spec list. Adding a new spec
/// here automatically registers it in `runner::run_all`, `tests/mock.rs`, and
/// `tests/live.rs`.
#[macro_export]
macro_rules! for_each_spec {
    ($mac:ident) => {
        // notes mutations (7)
        $mac!(notes::add_note_returns_note_with_user);
        $mac!(notes::add_note_defaults_to_not_important);
        $mac!(notes::update_note_replaces_content_and_importance);
        $mac!(notes::update_note_content_keeps_importance);
        $mac!(notes::update_missing_note_returns_none);
        $mac!(notes::delete_note_returns_id_once);
        $mac!(notes::mark_note_important_toggles);

        // bulk delete (1)
        $mac!(notes::bulk_delete_removes_only_matching_entity);

        // notes queries (6)
        $mac!(notes::get_notes_orders_newest_first);
        $mac!(notes::get_notes_pages_with_limit_and_offset);
        $mac!(notes::get_notes_basic_matches_full_listing);
        $mac!(notes::get_important_notes_filters_flag);
        $mac!(notes::get_note_by_id_missing_is_none);
        $mac!(notes::get_notes_for_audit_counts_since);

        // subscriptions (3)
        $mac!(subscriptions::notes_updates_follow_inserts);
        $mac!(subscriptions::important_notes_updates_skip_plain_notes);
        $mac!(subscriptions::note_updates_report_deletion);

        // federation (2)
        $mac!(federation::service_sdl_describes_notes);
        $mac!(federation::entities_resolve_notes_in_order);
    };
}

/// Specs that depend on behaviour only the in-process mock guarantees:
/// action handlers with canned business rules and seeded rows.
#[macro_export]
macro_rules! for_each_mock_only_spec {
    ($mac:ident) => {
        $mac!(actions::commit_payroll_assignments_reports_affected);
        $mac!(actions::log_audit_event_returns_event_id);
        $mac!(actions::check_suspicious_activity_flags_failures);
        $mac!(actions::generate_compliance_report_summarises_range);
        $mac!(notes::add_note_by_unknown_user_violates_constraint);
        $mac!(notes::add_note_by_seeded_user_embeds_author);
    };
}
