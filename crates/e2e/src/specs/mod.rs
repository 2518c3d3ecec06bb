pub mod actions;
pub mod federation;
pub mod notes;
pub mod subscriptions;
