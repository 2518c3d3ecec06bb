//! Typed GraphQL client for the payroll Hasura endpoint.
//!
//! * [`documents`]: the static notes, action and federation operations, each
//!   implementing [`graphql_client::GraphQLQuery`].
//! * [`GraphQLClient`]: HTTP transport with Hasura auth headers and retry,
//!   plus one helper per static operation.
//! * [`crud`]: select / insert / update / delete / stream for any table in
//!   [`payroll_graphql_types::tables`], built at runtime.
//! * [`subscription`]: `graphql-transport-ws` subscriptions as a `Stream`.

pub mod client;
pub mod config;
pub mod crud;
pub mod documents;
pub mod error;
pub mod retry;
pub mod subscription;
pub mod validate;

pub use client::{AuditNotes, GraphQLClient};
pub use config::ClientConfig;
pub use crud::{Document, SelectArgs};
pub use documents::notes::EntityRef;
pub use documents::{NoteBasicInfo, NoteForAudit, NoteUser, NoteWithUser};
pub use error::{Error, ErrorKind, GraphQLErrors, Result};
pub use retry::RetryConfig;
pub use subscription::Subscription;
pub use validate::OperationKind;

pub use payroll_graphql_types as types;
