use graphql_client::{GraphQLQuery, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::debug;

use payroll_graphql_types::actions::{
    AuditEventInput, CommitPayrollAssignmentsOutput, ComplianceReportInput,
    ComplianceReportOutput, LogAuditEventOutput, PayrollAssignmentInput,
    SuspiciousActivityOutput,
};
use payroll_graphql_types::federation::{Entity, Representation};
use payroll_graphql_types::scalars::{Timestamptz, Uuid};

use crate::config::{AuthSettings, ClientConfig, SubscriptionSettings};
use crate::documents::actions::{
    CheckSuspiciousActivity, CommitPayrollAssignments, GenerateComplianceReport, LogAuditEvent,
    check_suspicious_activity, commit_payroll_assignments, generate_compliance_report,
    log_audit_event,
};
use crate::documents::federation::{Entities, ServiceSdl, entities, service_sdl};
use crate::documents::notes::{
    AddNote, BulkDeleteNotes, DeleteNote, EntityRef, GetImportantNotes, GetNoteById, GetNotes,
    GetNotesBasic, GetNotesForAudit, ImportantNotesUpdates, MarkNoteImportant, NoteUpdates,
    NotesUpdates, UpdateNote, UpdateNoteContent, add_note, delete_note, get_note_by_id,
    get_notes, get_notes_for_audit, mark_note_important, update_note, update_note_content,
};
use crate::documents::{NoteBasicInfo, NoteForAudit, NoteWithUser};
use crate::error::{Error, GraphQLErrors, Result};
use crate::retry::{RetryConfig, retry_post};
use crate::subscription::{self, Subscription};
use crate::validate::OperationKind;

pub const HEADER_ADMIN_SECRET: &str = "x-hasura-admin-secret";
pub const HEADER_ROLE: &str = "x-hasura-role";
pub const HEADER_USER_ID: &str = "x-hasura-user-id";

/// Typed client for the payroll Hasura endpoint.
///
/// Queries and mutations go over HTTP POST; subscriptions open one
/// `graphql-transport-ws` socket each. High-level helpers wrap the static
/// notes, action and federation documents; [`crate::crud`] adds generic
/// table access on top of [`GraphQLClient::execute_raw`].
#[derive(Debug, Clone)]
pub struct GraphQLClient {
    http: reqwest::Client,
    endpoint: String,
    ws_endpoint: String,
    auth: AuthSettings,
    retry: RetryConfig,
    retry_mutations: bool,
    subscriptions: SubscriptionSettings,
}

/// Body for documents built at runtime.
#[derive(Debug, Serialize)]
pub(crate) struct RawRequest<'a> {
    pub query: &'a str,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
    pub variables: &'a Value,
}

/// Notes for one entity type created since a point in time, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditNotes {
    pub notes: Vec<NoteForAudit>,
    /// Server-side count of the same filter.
    pub total: i64,
}

impl GraphQLClient {
    /// Build a client with its own connection pool and the configured
    /// timeout.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Self::with_client(http, config)
    }

    /// Build on an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(http: reqwest::Client, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            http,
            endpoint: config.endpoint.url.clone(),
            ws_endpoint: config.endpoint.websocket_url()?,
            auth: config.auth.clone(),
            retry: config.retry_config(),
            retry_mutations: config.http.retry_mutations,
            subscriptions: config.subscriptions.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn ws_endpoint(&self) -> &str {
        &self.ws_endpoint
    }

    pub fn auth(&self) -> &AuthSettings {
        &self.auth
    }

    pub fn set_bearer_token(&mut self, token: Option<String>) {
        self.auth.bearer_token = token;
    }

    pub fn set_role(&mut self, role: Option<String>) {
        self.auth.role = role;
    }

    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.auth.user_id = user_id;
    }

    /// Copy of this client acting as `role`, sharing the connection pool.
    pub fn with_role(&self, role: impl Into<String>) -> Self {
        let mut client = self.clone();
        client.auth.role = Some(role.into());
        client
    }

    /// Access the underlying `reqwest::Client`.
    pub fn reqwest_client(&self) -> &reqwest::Client {
        &self.http
    }

    fn auth_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(secret) = &self.auth.admin_secret {
            pairs.push((HEADER_ADMIN_SECRET, secret.clone()));
        }
        if let Some(token) = &self.auth.bearer_token {
            pairs.push(("authorization", format!("Bearer {token}")));
        }
        if let Some(role) = &self.auth.role {
            pairs.push((HEADER_ROLE, role.clone()));
        }
        if let Some(user_id) = &self.auth.user_id {
            pairs.push((HEADER_USER_ID, user_id.clone()));
        }
        pairs
    }

    /// Headers attached to every HTTP request.
    pub fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.auth_pairs() {
            let name = if name == "authorization" {
                AUTHORIZATION
            } else {
                HeaderName::from_static(name)
            };
            let value = HeaderValue::from_str(&value)
                .map_err(|e| Error::Config(format!("invalid {name} header: {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// `connection_init` payload: the same headers, as Hasura reads them.
    pub fn connection_payload(&self) -> Value {
        let headers: Map<String, Value> = self
            .auth_pairs()
            .into_iter()
            .map(|(name, value)| {
                let name = if name == "authorization" {
                    "Authorization"
                } else {
                    name
                };
                (name.to_string(), Value::String(value))
            })
            .collect();
        json!({ "headers": headers })
    }

    // ── Transport ─────────────────────────────────────────────────────────

    /// Run a typed query or mutation.
    pub async fn execute<Q: GraphQLQuery>(&self, variables: Q::Variables) -> Result<Q::ResponseData> {
        let body = Q::build_query(variables);
        let kind = OperationKind::detect(body.query);
        if kind == OperationKind::Subscription {
            return Err(Error::Document(format!(
                "{} is a subscription; use subscribe",
                body.operation_name
            )));
        }
        let response: Response<Q::ResponseData> =
            self.post(&body, body.operation_name, kind).await?;
        into_data(response)
    }

    /// Run a document built at runtime and return its `data` object.
    pub async fn execute_raw(
        &self,
        query: &str,
        operation_name: Option<&str>,
        variables: Value,
    ) -> Result<Value> {
        let kind = OperationKind::detect(query);
        if kind == OperationKind::Subscription {
            return Err(Error::Document(
                "subscription documents cannot be sent over HTTP".into(),
            ));
        }
        let body = RawRequest {
            query,
            operation_name,
            variables: &variables,
        };
        let response: Response<Value> = self
            .post(&body, operation_name.unwrap_or("<anonymous>"), kind)
            .await?;
        into_data(response)
    }

    /// Start a typed subscription.
    pub async fn subscribe<Q>(&self, variables: Q::Variables) -> Result<Subscription<Q::ResponseData>>
    where
        Q: GraphQLQuery,
        Q::ResponseData: Send + 'static,
    {
        let body = Q::build_query(variables);
        self.subscribe_body(&body, subscription::decode_into())
            .await
    }

    /// Start a subscription from any serialisable query body, decoding each
    /// `data` object with `decode`.
    pub(crate) async fn subscribe_body<B, T>(
        &self,
        body: &B,
        decode: subscription::Decode<T>,
    ) -> Result<Subscription<T>>
    where
        B: Serialize,
        T: Send + 'static,
    {
        let request = serde_json::to_value(body)?;
        let query = request.get("query").and_then(Value::as_str).unwrap_or_default();
        if OperationKind::detect(query) != OperationKind::Subscription {
            return Err(Error::Document(
                "only subscription documents can be subscribed to".into(),
            ));
        }
        debug!(
            operation = ?request.get("operationName").and_then(|v| v.as_str()),
            url = %self.ws_endpoint,
            "starting subscription"
        );
        subscription::start(
            &self.ws_endpoint,
            self.connection_payload(),
            request,
            &self.subscriptions,
            decode,
        )
        .await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        body: &B,
        operation_name: &str,
        kind: OperationKind,
    ) -> Result<T> {
        let payload = serde_json::to_value(body)?;
        let headers = self.auth_headers()?;
        let retry = if kind == OperationKind::Mutation && !self.retry_mutations {
            RetryConfig::none()
        } else {
            self.retry.clone()
        };
        debug!(operation = operation_name, kind = %kind, "sending graphql request");
        let resp = retry_post(&self.http, &self.endpoint, &headers, &payload, &retry).await?;
        parse_response(resp).await
    }

    // ── Notes ─────────────────────────────────────────────────────────────

    /// Insert a note. Fails with [`Error::MissingData`] if the insert was
    /// filtered out by permissions.
    pub async fn add_note(&self, variables: add_note::Variables) -> Result<NoteWithUser> {
        self.execute::<AddNote>(variables)
            .await?
            .insert_notes_one
            .ok_or(Error::MissingData)
    }

    /// Replace content and importance. `None` when no such note exists.
    pub async fn update_note(
        &self,
        id: Uuid,
        content: impl Into<String>,
        is_important: bool,
    ) -> Result<Option<NoteWithUser>> {
        let variables = update_note::Variables {
            id,
            content: content.into(),
            is_important,
        };
        Ok(self.execute::<UpdateNote>(variables).await?.update_notes_by_pk)
    }

    pub async fn update_note_content(
        &self,
        id: Uuid,
        content: impl Into<String>,
    ) -> Result<Option<NoteBasicInfo>> {
        let variables = update_note_content::Variables {
            id,
            content: content.into(),
        };
        Ok(self
            .execute::<UpdateNoteContent>(variables)
            .await?
            .update_notes_by_pk)
    }

    /// Id of the deleted note, `None` when it did not exist.
    pub async fn delete_note(&self, id: Uuid) -> Result<Option<Uuid>> {
        let data = self.execute::<DeleteNote>(delete_note::Variables { id }).await?;
        Ok(data.delete_notes_by_pk.map(|deleted| deleted.id))
    }

    pub async fn mark_note_important(
        &self,
        id: Uuid,
        is_important: bool,
    ) -> Result<Option<mark_note_important::ImportanceChange>> {
        let variables = mark_note_important::Variables { id, is_important };
        Ok(self
            .execute::<MarkNoteImportant>(variables)
            .await?
            .update_notes_by_pk)
    }

    /// Delete every note on `entity`; returns the number deleted.
    pub async fn bulk_delete_notes(&self, entity: EntityRef) -> Result<i64> {
        let data = self.execute::<BulkDeleteNotes>(entity).await?;
        Ok(data.delete_notes.map_or(0, |deleted| deleted.affected_rows))
    }

    /// Notes on `entity`, newest first, optionally paged.
    pub async fn get_notes(&self, variables: get_notes::Variables) -> Result<Vec<NoteWithUser>> {
        Ok(self.execute::<GetNotes>(variables).await?.notes)
    }

    pub async fn get_notes_basic(&self, entity: EntityRef) -> Result<Vec<NoteBasicInfo>> {
        Ok(self.execute::<GetNotesBasic>(entity).await?.notes)
    }

    pub async fn get_important_notes(&self, entity: EntityRef) -> Result<Vec<NoteWithUser>> {
        Ok(self.execute::<GetImportantNotes>(entity).await?.notes)
    }

    pub async fn get_note_by_id(&self, id: Uuid) -> Result<Option<NoteWithUser>> {
        let data = self
            .execute::<GetNoteById>(get_note_by_id::Variables { id })
            .await?;
        Ok(data.notes_by_pk)
    }

    pub async fn get_notes_for_audit(
        &self,
        entity_type: impl Into<String>,
        since: Timestamptz,
    ) -> Result<AuditNotes> {
        let variables = get_notes_for_audit::Variables {
            entity_type: entity_type.into(),
            since,
        };
        let data = self.execute::<GetNotesForAudit>(variables).await?;
        Ok(AuditNotes {
            total: data.notes_aggregate.count(),
            notes: data.notes,
        })
    }

    /// Live list of the notes on `entity`; each item is the full list.
    pub async fn notes_updates(
        &self,
        entity: EntityRef,
    ) -> Result<Subscription<<NotesUpdates as GraphQLQuery>::ResponseData>> {
        self.subscribe::<NotesUpdates>(entity).await
    }

    pub async fn important_notes_updates(
        &self,
        entity: EntityRef,
    ) -> Result<Subscription<<ImportantNotesUpdates as GraphQLQuery>::ResponseData>> {
        self.subscribe::<ImportantNotesUpdates>(entity).await
    }

    /// Live view of one note; items carry `None` once it is deleted.
    pub async fn note_updates(
        &self,
        id: Uuid,
    ) -> Result<Subscription<<NoteUpdates as GraphQLQuery>::ResponseData>> {
        self.subscribe::<NoteUpdates>(get_note_by_id::Variables { id })
            .await
    }

    // ── Actions ───────────────────────────────────────────────────────────

    pub async fn commit_payroll_assignments(
        &self,
        assignments: Vec<PayrollAssignmentInput>,
    ) -> Result<CommitPayrollAssignmentsOutput> {
        self.execute::<CommitPayrollAssignments>(commit_payroll_assignments::Variables {
            assignments,
        })
        .await?
        .commit_payroll_assignments
        .ok_or(Error::MissingData)
    }

    pub async fn log_audit_event(&self, event: AuditEventInput) -> Result<LogAuditEventOutput> {
        self.execute::<LogAuditEvent>(log_audit_event::Variables { event })
            .await?
            .log_audit_event
            .ok_or(Error::MissingData)
    }

    /// `time_window` is in hours.
    pub async fn check_suspicious_activity(
        &self,
        user_id: Option<Uuid>,
        time_window: Option<i32>,
    ) -> Result<SuspiciousActivityOutput> {
        let variables = check_suspicious_activity::Variables {
            user_id,
            time_window,
        };
        self.execute::<CheckSuspiciousActivity>(variables)
            .await?
            .check_suspicious_activity
            .ok_or(Error::MissingData)
    }

    pub async fn generate_compliance_report(
        &self,
        input: ComplianceReportInput,
    ) -> Result<ComplianceReportOutput> {
        if input.start_date > input.end_date {
            return Err(Error::InvalidInput(format!(
                "report range starts after it ends ({} > {})",
                input.start_date, input.end_date
            )));
        }
        self.execute::<GenerateComplianceReport>(generate_compliance_report::Variables { input })
            .await?
            .generate_compliance_report
            .ok_or(Error::MissingData)
    }

    // ── Federation ────────────────────────────────────────────────────────

    /// Federation SDL of this subgraph; empty if the server returned none.
    pub async fn service_sdl(&self) -> Result<String> {
        let data = self
            .execute::<ServiceSdl>(service_sdl::Variables::default())
            .await?;
        Ok(data.service.sdl.unwrap_or_default())
    }

    /// Resolve entity references, preserving order.
    pub async fn entities(&self, representations: Vec<Representation>) -> Result<Vec<Option<Entity>>> {
        if representations.is_empty() {
            return Ok(Vec::new());
        }
        let data = self
            .execute::<Entities>(entities::Variables { representations })
            .await?;
        Ok(data.entities)
    }
}

/// Split a GraphQL response into `data` or the error list.
///
/// Errors take precedence: a response with both partial data and errors is
/// an error.
pub(crate) fn into_data<T>(response: Response<T>) -> Result<T> {
    match (response.data, response.errors) {
        (_, Some(errors)) if !errors.is_empty() => Err(Error::GraphQL(GraphQLErrors(errors))),
        (Some(data), _) => Ok(data),
        (None, _) => Err(Error::MissingData),
    }
}

/// Decode a successful response; non-2xx bodies that still carry a GraphQL
/// error list surface as [`Error::GraphQL`].
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let body = resp.text().await.unwrap_or_default();
    if let Ok(Response {
        errors: Some(errors),
        ..
    }) = serde_json::from_str::<Response<Value>>(&body)
    {
        if !errors.is_empty() {
            return Err(Error::GraphQL(GraphQLErrors(errors)));
        }
    }
    Err(Error::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with(auth: AuthSettings) -> GraphQLClient {
        let mut config = ClientConfig::for_endpoint("https://hasura.example.com/v1/graphql");
        config.auth = auth;
        GraphQLClient::new(&config).unwrap()
    }

    #[test]
    fn websocket_endpoint_follows_http_scheme() {
        let client = client_with(AuthSettings::default());
        assert_eq!(client.ws_endpoint(), "wss://hasura.example.com/v1/graphql");
    }

    #[test]
    fn anonymous_client_sends_no_auth_headers() {
        let client = client_with(AuthSettings::default());
        assert!(client.auth_headers().unwrap().is_empty());
        assert_eq!(client.connection_payload(), json!({"headers": {}}));
    }

    #[test]
    fn configured_auth_becomes_hasura_headers() {
        let client = client_with(AuthSettings {
            admin_secret: Some("s3cret".into()),
            bearer_token: Some("jwt.token.here".into()),
            role: Some("manager".into()),
            user_id: Some("3e8a1b9c-6f2d-4a7e-b1c5-9d0f2e4a6b33".into()),
        });
        let headers = client.auth_headers().unwrap();
        assert_eq!(headers[HEADER_ADMIN_SECRET], "s3cret");
        assert_eq!(headers[AUTHORIZATION], "Bearer jwt.token.here");
        assert_eq!(headers[HEADER_ROLE], "manager");
        assert_eq!(
            headers[HEADER_USER_ID],
            "3e8a1b9c-6f2d-4a7e-b1c5-9d0f2e4a6b33"
        );
        let payload = client.connection_payload();
        assert_eq!(payload["headers"]["Authorization"], "Bearer jwt.token.here");
        assert_eq!(payload["headers"]["x-hasura-role"], "manager");
    }

    #[test]
    fn with_role_leaves_original_untouched() {
        let client = client_with(AuthSettings::default());
        let viewer = client.with_role("viewer");
        assert_eq!(viewer.auth().role.as_deref(), Some("viewer"));
        assert_eq!(client.auth().role, None);
    }

    #[test]
    fn header_values_with_newlines_are_rejected() {
        let client = client_with(AuthSettings {
            admin_secret: Some("bad\nvalue".into()),
            ..Default::default()
        });
        assert!(matches!(client.auth_headers(), Err(Error::Config(_))));
    }

    #[test]
    fn errors_win_over_partial_data() {
        let response: Response<Value> = serde_json::from_value(json!({
            "data": {"notes": []},
            "errors": [{"message": "denied", "extensions": {"code": "permission-error"}}],
        }))
        .unwrap();
        let err = into_data(response).unwrap_err();
        assert_eq!(err.kind(), Some(crate::ErrorKind::PermissionDenied));
    }

    #[test]
    fn empty_response_is_missing_data() {
        let response: Response<Value> = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(into_data(response), Err(Error::MissingData)));
    }

    #[tokio::test]
    async fn subscription_documents_are_refused_over_http() {
        let client = client_with(AuthSettings::default());
        let err = client
            .execute::<NotesUpdates>(EntityRef::new(Uuid::new_v4(), "payroll"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }

    #[tokio::test]
    async fn inverted_report_range_fails_before_sending() {
        let client = client_with(AuthSettings::default());
        let err = client
            .generate_compliance_report(ComplianceReportInput {
                report_type: "sox".into(),
                start_date: "2025-06-30".parse().unwrap(),
                end_date: "2025-01-01".parse().unwrap(),
                include_details: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
