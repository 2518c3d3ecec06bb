//! In-process stand-in for a Hasura endpoint carrying the payroll schema.
//!
//! Serves `POST /v1/graphql` with axum and `graphql-transport-ws` on a second
//! port with tokio-tungstenite. Requests are dispatched on `operationName`
//! against an in-memory store; documents themselves are not parsed.
//! Subscriptions recompute on every store change and push a `next` only when
//! the result differs from the last one sent.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use chrono::{DateTime, Duration, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::{debug, warn};
use uuid::Uuid;

use payroll_graphql_client::client::{HEADER_ADMIN_SECRET, HEADER_USER_ID};
use payroll_graphql_client::subscription::{PROTOCOL, ProtocolMessage};
use payroll_graphql_client::{ClientConfig, GraphQLClient};
use payroll_graphql_types::actions::{AuditEventInput, ComplianceReportInput, PayrollAssignmentInput};

use crate::client::TestContext;

/// Admin secret every mock instance expects.
pub const ADMIN_SECRET: &str = "e2e-admin-secret";

const SUBSCRIPTIONS: &[&str] = &["NotesUpdates", "ImportantNotesUpdates", "NoteUpdates"];

/// Failed audit events within the window at which activity is suspicious.
const SUSPICIOUS_FAILURES: usize = 3;

const DEFAULT_TIME_WINDOW_HOURS: i64 = 24;

const SDL: &str = r#"type notes @key(fields: "id") {
  id: uuid!
  entity_id: uuid!
  entity_type: String!
  content: String!
  is_important: Boolean!
  user_id: uuid
  created_at: timestamptz!
  updated_at: timestamptz!
  user: users
}

type users @key(fields: "id") {
  id: uuid!
  name: String!
  email: String!
  role: user_role!
}
"#;

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct MockError {
    code: &'static str,
    message: String,
}

impl MockError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn missing_variable(name: &str) -> Self {
        Self::new(
            "validation-failed",
            format!("expecting a value for non-nullable variable: \"{name}\""),
        )
    }

    fn to_json(&self) -> Value {
        json!({
            "message": self.message,
            "extensions": {"path": "$", "code": self.code},
        })
    }
}

type Resolved = std::result::Result<Value, MockError>;

// ── Variables ───────────────────────────────────────────────────────────────

fn present<'a>(vars: &'a Value, name: &str) -> Option<&'a Value> {
    vars.get(name).filter(|value| !value.is_null())
}

fn decode_var<T: DeserializeOwned>(vars: &Value, name: &str) -> std::result::Result<T, MockError> {
    let value = present(vars, name).ok_or_else(|| MockError::missing_variable(name))?;
    serde_json::from_value(value.clone()).map_err(|e| {
        MockError::new(
            "validation-failed",
            format!("variable \"{name}\" has the wrong shape: {e}"),
        )
    })
}

fn optional_var<T: DeserializeOwned>(
    vars: &Value,
    name: &str,
) -> std::result::Result<Option<T>, MockError> {
    match present(vars, name) {
        Some(_) => decode_var(vars, name).map(Some),
        None => Ok(None),
    }
}

fn entity_vars(vars: &Value) -> std::result::Result<(Uuid, String), MockError> {
    Ok((decode_var(vars, "entityId")?, decode_var(vars, "entityType")?))
}

// ── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct NoteRecord {
    id: Uuid,
    entity_id: Uuid,
    entity_type: String,
    content: String,
    is_important: bool,
    user_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NoteRecord {
    fn basic_json(&self) -> Value {
        json!({
            "id": self.id,
            "entity_id": self.entity_id,
            "entity_type": self.entity_type,
            "content": self.content,
            "is_important": self.is_important,
            "user_id": self.user_id,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }

    fn on_entity(&self, entity_id: Uuid, entity_type: &str) -> bool {
        self.entity_id == entity_id && self.entity_type == entity_type
    }
}

#[derive(Debug, Clone)]
struct UserRecord {
    name: String,
    email: String,
    role: &'static str,
}

#[derive(Debug, Clone)]
struct AuditRecord {
    /// `x-hasura-user-id` of the session that logged the event.
    user_id: Option<Uuid>,
    action: String,
    success: bool,
    at: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    notes: Vec<NoteRecord>,
    users: HashMap<Uuid, UserRecord>,
    audit: Vec<AuditRecord>,
    clock: Option<DateTime<Utc>>,
}

impl Store {
    /// Strictly increasing timestamps, so ordering by `created_at` is total.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.clock {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(next);
        next
    }

    fn user_json(&self, id: Option<Uuid>, with_role: bool) -> Value {
        let Some((id, user)) = id.and_then(|id| self.users.get(&id).map(|user| (id, user))) else {
            return Value::Null;
        };
        let mut out = json!({"id": id, "name": user.name, "email": user.email});
        if with_role {
            out["role"] = json!(user.role);
        }
        out
    }

    fn note_with_user(&self, note: &NoteRecord) -> Value {
        let mut out = note.basic_json();
        out["user"] = self.user_json(note.user_id, false);
        out
    }

    fn note_for_audit(&self, note: &NoteRecord) -> Value {
        json!({
            "id": note.id,
            "entity_id": note.entity_id,
            "entity_type": note.entity_type,
            "user_id": note.user_id,
            "is_important": note.is_important,
            "created_at": note.created_at,
            "updated_at": note.updated_at,
            "user": self.user_json(note.user_id, true),
        })
    }

    /// Notes on one entity, newest first.
    fn on_entity(&self, entity_id: Uuid, entity_type: &str, important_only: bool) -> Vec<&NoteRecord> {
        let mut notes: Vec<_> = self
            .notes
            .iter()
            .filter(|note| note.on_entity(entity_id, entity_type))
            .filter(|note| !important_only || note.is_important)
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notes
    }

    fn find(&self, id: Uuid) -> Option<&NoteRecord> {
        self.notes.iter().find(|note| note.id == id)
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut NoteRecord> {
        self.notes.iter_mut().find(|note| note.id == id)
    }

    // notes mutations

    fn add_note(&mut self, vars: &Value) -> Resolved {
        let (entity_id, entity_type) = entity_vars(vars)?;
        let content: String = decode_var(vars, "content")?;
        let is_important = optional_var(vars, "isImportant")?.unwrap_or(false);
        let user_id: Option<Uuid> = optional_var(vars, "userId")?;
        if user_id.is_some_and(|id| !self.users.contains_key(&id)) {
            return Err(MockError::new(
                "constraint-violation",
                "Foreign key violation. insert or update on table \"notes\" violates foreign key constraint \"notes_user_id_fkey\"",
            ));
        }
        let now = self.tick();
        let note = NoteRecord {
            id: Uuid::new_v4(),
            entity_id,
            entity_type,
            content,
            is_important,
            user_id,
            created_at: now,
            updated_at: now,
        };
        let out = self.note_with_user(&note);
        self.notes.push(note);
        Ok(json!({"insert_notes_one": out}))
    }

    fn update_note(&mut self, vars: &Value) -> Resolved {
        let id: Uuid = decode_var(vars, "id")?;
        let content: String = decode_var(vars, "content")?;
        let is_important: bool = decode_var(vars, "isImportant")?;
        let now = self.tick();
        let updated = self.find_mut(id).map(|note| {
            note.content = content;
            note.is_important = is_important;
            note.updated_at = now;
            note.clone()
        });
        Ok(json!({"update_notes_by_pk": updated.map(|note| self.note_with_user(&note))}))
    }

    fn update_note_content(&mut self, vars: &Value) -> Resolved {
        let id: Uuid = decode_var(vars, "id")?;
        let content: String = decode_var(vars, "content")?;
        let now = self.tick();
        let updated = self.find_mut(id).map(|note| {
            note.content = content;
            note.updated_at = now;
            note.basic_json()
        });
        Ok(json!({"update_notes_by_pk": updated}))
    }

    fn delete_note(&mut self, vars: &Value) -> Resolved {
        let id: Uuid = decode_var(vars, "id")?;
        let index = self.notes.iter().position(|note| note.id == id);
        let deleted = index.map(|index| json!({"id": self.notes.remove(index).id}));
        Ok(json!({"delete_notes_by_pk": deleted}))
    }

    fn mark_note_important(&mut self, vars: &Value) -> Resolved {
        let id: Uuid = decode_var(vars, "id")?;
        let is_important: bool = decode_var(vars, "isImportant")?;
        let now = self.tick();
        let changed = self.find_mut(id).map(|note| {
            note.is_important = is_important;
            note.updated_at = now;
            json!({"id": note.id, "is_important": note.is_important, "updated_at": note.updated_at})
        });
        Ok(json!({"update_notes_by_pk": changed}))
    }

    fn bulk_delete_notes(&mut self, vars: &Value) -> Resolved {
        let (entity_id, entity_type) = entity_vars(vars)?;
        let before = self.notes.len();
        self.notes.retain(|note| !note.on_entity(entity_id, &entity_type));
        Ok(json!({"delete_notes": {"affected_rows": before - self.notes.len()}}))
    }

    // notes queries

    fn get_notes(&self, vars: &Value) -> Resolved {
        let (entity_id, entity_type) = entity_vars(vars)?;
        let offset: Option<usize> = optional_var(vars, "offset")?;
        let limit: Option<usize> = optional_var(vars, "limit")?;
        let notes: Vec<Value> = self
            .on_entity(entity_id, &entity_type, false)
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .map(|note| self.note_with_user(note))
            .collect();
        Ok(json!({"notes": notes}))
    }

    fn get_notes_basic(&self, vars: &Value) -> Resolved {
        let (entity_id, entity_type) = entity_vars(vars)?;
        let notes: Vec<Value> = self
            .on_entity(entity_id, &entity_type, false)
            .into_iter()
            .map(NoteRecord::basic_json)
            .collect();
        Ok(json!({"notes": notes}))
    }

    fn get_important_notes(&self, vars: &Value) -> Resolved {
        let (entity_id, entity_type) = entity_vars(vars)?;
        let notes: Vec<Value> = self
            .on_entity(entity_id, &entity_type, true)
            .into_iter()
            .map(|note| self.note_with_user(note))
            .collect();
        Ok(json!({"notes": notes}))
    }

    fn get_note_by_id(&self, vars: &Value) -> Resolved {
        let id: Uuid = decode_var(vars, "id")?;
        let note = self.find(id).map(|note| self.note_with_user(note));
        Ok(json!({"notes_by_pk": note}))
    }

    fn get_notes_for_audit(&self, vars: &Value) -> Resolved {
        let entity_type: String = decode_var(vars, "entityType")?;
        let since: DateTime<Utc> = decode_var(vars, "since")?;
        let mut notes: Vec<&NoteRecord> = self
            .notes
            .iter()
            .filter(|note| note.entity_type == entity_type && note.created_at >= since)
            .collect();
        notes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let count = notes.len();
        let notes: Vec<Value> = notes.into_iter().map(|note| self.note_for_audit(note)).collect();
        Ok(json!({
            "notes": notes,
            "notes_aggregate": {"aggregate": {"count": count}},
        }))
    }

    // actions

    fn commit_payroll_assignments(&mut self, vars: &Value) -> Resolved {
        let assignments: Vec<PayrollAssignmentInput> = decode_var(vars, "assignments")?;
        if assignments.is_empty() {
            return Ok(json!({"commitPayrollAssignments": {
                "success": false,
                "message": "no assignments to commit",
                "affectedAssignments": [],
            }}));
        }
        let payroll_id = Uuid::new_v4();
        let affected: Vec<Value> = assignments
            .iter()
            .map(|assignment| {
                json!({
                    "id": Uuid::new_v4(),
                    "payrollId": payroll_id,
                    "payrollDateId": assignment.payroll_date_id,
                    "consultantId": assignment.consultant_id,
                    "originalConsultantId": assignment.original_consultant_id,
                })
            })
            .collect();
        Ok(json!({"commitPayrollAssignments": {
            "success": true,
            "message": format!("committed {} assignments", affected.len()),
            "affectedAssignments": affected,
        }}))
    }

    fn log_audit_event(&mut self, vars: &Value, session: &Session) -> Resolved {
        let event: AuditEventInput = decode_var(vars, "event")?;
        if event.action.trim().is_empty() {
            return Err(MockError::new("data-exception", "event.action must not be empty"));
        }
        let at = self.tick();
        self.audit.push(AuditRecord {
            user_id: session.user_id,
            action: event.action,
            success: event.success.unwrap_or(true),
            at,
        });
        Ok(json!({"logAuditEvent": {"success": true, "eventId": Uuid::new_v4()}}))
    }

    fn check_suspicious_activity(&self, vars: &Value) -> Resolved {
        let hours: i64 = optional_var(vars, "timeWindow")?.unwrap_or(DEFAULT_TIME_WINDOW_HOURS);
        let user_id: Option<Uuid> = optional_var(vars, "userId")?;
        let since = Utc::now() - Duration::hours(hours);
        let mut failures: Vec<(String, usize)> = Vec::new();
        let relevant = self.audit.iter().filter(|r| {
            !r.success && r.at >= since && user_id.is_none_or(|user| r.user_id == Some(user))
        });
        for record in relevant {
            match failures.iter_mut().find(|(action, _)| *action == record.action) {
                Some((_, count)) => *count += 1,
                None => failures.push((record.action.clone(), 1)),
            }
        }
        let total: usize = failures.iter().map(|(_, count)| count).sum();
        let risk_level = match total {
            0 => "low",
            n if n < SUSPICIOUS_FAILURES => "medium",
            n if n < SUSPICIOUS_FAILURES * 3 => "high",
            _ => "critical",
        };
        let patterns: Vec<Value> = failures
            .iter()
            .map(|(action, count)| {
                json!({
                    "type": format!("failed_{action}"),
                    "count": count,
                    "details": format!("{count} failed {action} events in the last {hours}h"),
                })
            })
            .collect();
        Ok(json!({"checkSuspiciousActivity": {
            "suspicious": total >= SUSPICIOUS_FAILURES,
            "patterns": patterns,
            "riskLevel": risk_level,
        }}))
    }

    fn generate_compliance_report(&mut self, vars: &Value) -> Resolved {
        let input: ComplianceReportInput = decode_var(vars, "input")?;
        if input.start_date > input.end_date {
            return Err(MockError::new(
                "data-exception",
                "startDate must not be after endDate",
            ));
        }
        let report_id = Uuid::new_v4();
        let generated_at = self.tick();
        Ok(json!({"generateComplianceReport": {
            "success": true,
            "reportId": report_id,
            "reportUrl": format!("https://reports.e2e.local/{}/{report_id}.pdf", input.report_type),
            "generatedAt": generated_at,
            "summary": {
                "reportType": input.report_type,
                "startDate": input.start_date,
                "endDate": input.end_date,
                "auditEvents": self.audit.len(),
                "notes": self.notes.len(),
            },
        }}))
    }

    // federation

    fn entities(&self, vars: &Value) -> Resolved {
        let representations: Vec<Value> = decode_var(vars, "representations")?;
        let resolved: Vec<Value> = representations
            .iter()
            .map(|rep| {
                let id = rep
                    .get("id")
                    .and_then(Value::as_str)
                    .and_then(|raw| raw.parse::<Uuid>().ok());
                match (rep.get("__typename").and_then(Value::as_str), id) {
                    (Some("notes"), Some(id)) => self.find(id).map_or(Value::Null, |note| {
                        json!({
                            "__typename": "notes",
                            "id": note.id,
                            "entity_id": note.entity_id,
                            "entity_type": note.entity_type,
                            "content": note.content,
                            "is_important": note.is_important,
                        })
                    }),
                    (Some("users"), Some(id)) => match self.user_json(Some(id), true) {
                        Value::Null => Value::Null,
                        mut user => {
                            user["__typename"] = json!("users");
                            user
                        }
                    },
                    _ => Value::Null,
                }
            })
            .collect();
        Ok(json!({"_entities": resolved}))
    }
}

// ── Dispatch ────────────────────────────────────────────────────────────────

struct MockState {
    store: Mutex<Store>,
    changes: broadcast::Sender<()>,
    admin_secret: String,
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self, f: impl FnOnce(&Store) -> Resolved) -> Resolved {
        f(&self.lock())
    }

    /// Run a mutation and wake subscriptions if it succeeded.
    fn write(&self, f: impl FnOnce(&mut Store) -> Resolved) -> Resolved {
        let out = f(&mut self.lock());
        if out.is_ok() {
            let _ = self.changes.send(());
        }
        out
    }

    fn resolve(&self, operation: &str, vars: &Value, session: &Session) -> Resolved {
        match operation {
            "AddNote" => self.write(|s| s.add_note(vars)),
            "UpdateNote" => self.write(|s| s.update_note(vars)),
            "UpdateNoteContent" => self.write(|s| s.update_note_content(vars)),
            "DeleteNote" => self.write(|s| s.delete_note(vars)),
            "MarkNoteImportant" => self.write(|s| s.mark_note_important(vars)),
            "BulkDeleteNotes" => self.write(|s| s.bulk_delete_notes(vars)),
            "GetNotes" | "NotesUpdates" => self.read(|s| s.get_notes(vars)),
            "GetNotesBasic" => self.read(|s| s.get_notes_basic(vars)),
            "GetImportantNotes" | "ImportantNotesUpdates" => {
                self.read(|s| s.get_important_notes(vars))
            }
            "GetNoteById" | "NoteUpdates" => self.read(|s| s.get_note_by_id(vars)),
            "GetNotesForAudit" => self.read(|s| s.get_notes_for_audit(vars)),
            "CommitPayrollAssignments" => self.write(|s| s.commit_payroll_assignments(vars)),
            "LogAuditEvent" => self.write(|s| s.log_audit_event(vars, session)),
            "CheckSuspiciousActivity" => self.read(|s| s.check_suspicious_activity(vars)),
            "GenerateComplianceReport" => self.write(|s| s.generate_compliance_report(vars)),
            "ServiceSdl" => Ok(json!({"_service": {"sdl": SDL}})),
            "Entities" => self.read(|s| s.entities(vars)),
            other => Err(MockError::new(
                "validation-failed",
                format!("operation {other:?} is not served by this endpoint"),
            )),
        }
    }

    fn check_secret(&self, secret: Option<&str>) -> std::result::Result<(), MockError> {
        match secret {
            Some(secret) if secret == self.admin_secret => Ok(()),
            Some(_) => Err(MockError::new(
                "access-denied",
                "invalid x-hasura-admin-secret/x-hasura-access-key",
            )),
            None => Err(MockError::new(
                "access-denied",
                "x-hasura-admin-secret/x-hasura-access-key required, but not found",
            )),
        }
    }
}

/// Session variables Hasura would forward to action handlers.
#[derive(Debug, Default)]
struct Session {
    user_id: Option<Uuid>,
}

impl Session {
    fn from_headers(headers: &HeaderMap) -> Self {
        let user_id = headers
            .get(HEADER_USER_ID)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| raw.parse().ok());
        Self { user_id }
    }
}

async fn graphql(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let secret = headers
        .get(HEADER_ADMIN_SECRET)
        .and_then(|value| value.to_str().ok());
    let operation = body
        .get("operationName")
        .and_then(Value::as_str)
        .unwrap_or_default();
    debug!(operation, "mock request");

    let session = Session::from_headers(&headers);
    let resolved = state
        .check_secret(secret)
        .and_then(|()| state.resolve(operation, &body["variables"], &session));
    Json(match resolved {
        Ok(data) => json!({"data": data}),
        Err(e) => json!({"errors": [e.to_json()]}),
    })
}

// ── WebSocket ───────────────────────────────────────────────────────────────

fn negotiate(request: &Request, mut response: Response) -> std::result::Result<Response, ErrorResponse> {
    let offered = request
        .headers()
        .get(SEC_WEBSOCKET_PROTOCOL)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if offered.split(',').any(|protocol| protocol.trim() == PROTOCOL) {
        response
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(PROTOCOL));
    }
    Ok(response)
}

fn close(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code: CloseCode::Library(code),
        reason: reason.into(),
    }))
}

fn send(out: &mpsc::UnboundedSender<Message>, message: ProtocolMessage) -> Result<()> {
    out.send(message.to_text()?)?;
    Ok(())
}

/// Header lookup in a `connection_init` payload; header names are
/// case-insensitive.
fn init_header<'a>(payload: Option<&'a Value>, name: &str) -> Option<&'a str> {
    payload?
        .get("headers")?
        .as_object()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.as_str())
}

async fn accept_sockets(listener: TcpListener, state: Arc<MockState>) {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(e) => {
                warn!(error = %e, "mock websocket accept failed");
                continue;
            }
        };
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = serve_socket(stream, state).await {
                debug!(error = %e, "mock websocket ended");
            }
        });
    }
}

async fn serve_socket(stream: TcpStream, state: Arc<MockState>) -> Result<()> {
    let socket = tokio_tungstenite::accept_hdr_async(stream, negotiate).await?;
    let (mut sink, mut source) = socket.split();

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
    let writer = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if sink.send(message).await.is_err() || closing {
                break;
            }
        }
    });

    let mut active: HashMap<String, JoinHandle<()>> = HashMap::new();
    let mut acknowledged = false;

    while let Some(frame) = source.next().await {
        let text = match frame? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        match serde_json::from_str::<ProtocolMessage>(&text)? {
            ProtocolMessage::ConnectionInit { payload } => {
                let secret = init_header(payload.as_ref(), HEADER_ADMIN_SECRET);
                if state.check_secret(secret).is_err() {
                    let _ = out_tx.send(close(4403, "Forbidden"));
                    break;
                }
                acknowledged = true;
                send(&out_tx, ProtocolMessage::ConnectionAck { payload: None })?;
            }
            ProtocolMessage::Ping { payload } => send(&out_tx, ProtocolMessage::Pong { payload })?,
            ProtocolMessage::Subscribe { id, payload } if acknowledged => {
                let task = tokio::spawn(run_subscription(
                    state.clone(),
                    id.clone(),
                    payload,
                    out_tx.clone(),
                ));
                if let Some(previous) = active.insert(id, task) {
                    previous.abort();
                }
            }
            ProtocolMessage::Subscribe { .. } => {
                let _ = out_tx.send(close(4401, "Unauthorized"));
                break;
            }
            ProtocolMessage::Complete { id } => {
                if let Some(task) = active.remove(&id) {
                    task.abort();
                }
            }
            other => debug!(message = ?other, "mock ignoring message"),
        }
    }

    for task in active.into_values() {
        task.abort();
    }
    drop(out_tx);
    let _ = writer.await;
    Ok(())
}

async fn run_subscription(
    state: Arc<MockState>,
    id: String,
    request: Value,
    out: mpsc::UnboundedSender<Message>,
) {
    let mut changes = state.changes.subscribe();
    let operation = request
        .get("operationName")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let variables = &request["variables"];

    if !SUBSCRIPTIONS.contains(&operation) {
        let error = MockError::new(
            "validation-failed",
            format!("{operation:?} is not a subscription served by this endpoint"),
        );
        let _ = send(
            &out,
            ProtocolMessage::Error {
                id,
                payload: json!([error.to_json()]),
            },
        );
        return;
    }

    let mut last: Option<Value> = None;
    loop {
        match state.resolve(operation, variables, &Session::default()) {
            Ok(data) if last.as_ref() == Some(&data) => {}
            Ok(data) => {
                let next = ProtocolMessage::Next {
                    id: id.clone(),
                    payload: json!({"data": data}),
                };
                last = Some(data);
                if send(&out, next).is_err() {
                    return;
                }
            }
            Err(e) => {
                let _ = send(
                    &out,
                    ProtocolMessage::Error {
                        id,
                        payload: json!([e.to_json()]),
                    },
                );
                return;
            }
        }
        match changes.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

// ── Handle ──────────────────────────────────────────────────────────────────

/// A running mock endpoint; stops serving when dropped.
pub struct MockHasura {
    http_addr: SocketAddr,
    ws_addr: SocketAddr,
    seeded_user: Uuid,
    tasks: Vec<JoinHandle<()>>,
}

impl MockHasura {
    /// Bind both listeners on loopback and seed one `manager` user.
    pub async fn start() -> Result<Self> {
        let seeded_user = Uuid::new_v4();
        let mut store = Store::default();
        store.users.insert(
            seeded_user,
            UserRecord {
                name: "E2E Author".into(),
                email: "author@e2e.local".into(),
                role: "manager",
            },
        );
        let (changes, _) = broadcast::channel(64);
        let state = Arc::new(MockState {
            store: Mutex::new(store),
            changes,
            admin_secret: ADMIN_SECRET.to_string(),
        });

        let http = TcpListener::bind("127.0.0.1:0").await?;
        let http_addr = http.local_addr()?;
        let app = axum::Router::new()
            .route("/v1/graphql", post(graphql))
            .with_state(state.clone());
        let http_task = tokio::spawn(async move {
            if let Err(e) = axum::serve(http, app).await {
                warn!(error = %e, "mock http server stopped");
            }
        });

        let ws = TcpListener::bind("127.0.0.1:0").await?;
        let ws_addr = ws.local_addr()?;
        let ws_task = tokio::spawn(accept_sockets(ws, state));

        debug!(%http_addr, %ws_addr, "mock hasura listening");
        Ok(Self {
            http_addr,
            ws_addr,
            seeded_user,
            tasks: vec![http_task, ws_task],
        })
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/v1/graphql", self.http_addr)
    }

    pub fn ws_endpoint(&self) -> String {
        format!("ws://{}/v1/graphql", self.ws_addr)
    }

    /// Id of the `users` row present from startup.
    pub fn seeded_user(&self) -> Uuid {
        self.seeded_user
    }

    /// Client config with the right secret and immediate retries.
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::for_endpoint(self.endpoint());
        config.endpoint.ws_url = Some(self.ws_endpoint());
        config.auth.admin_secret = Some(ADMIN_SECRET.to_string());
        config.auth.user_id = Some(self.seeded_user.to_string());
        config.http.retry_delays_secs = vec![0];
        config.subscriptions.connection_init_timeout_secs = 5;
        config
    }

    pub fn context(&self) -> Result<TestContext> {
        let client = GraphQLClient::new(&self.config())?;
        Ok(TestContext::new(client, Some(self.seeded_user)))
    }
}

impl Drop for MockHasura {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
