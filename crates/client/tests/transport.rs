//! HTTP transport behaviour against a scripted in-process endpoint.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};

use payroll_graphql_client::types::tables::{Notes, notes};
use payroll_graphql_client::{ClientConfig, EntityRef, Error, ErrorKind, GraphQLClient, SelectArgs};

enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, &'static str),
}

#[derive(Default)]
struct Script {
    replies: Mutex<VecDeque<Reply>>,
    seen: Mutex<Vec<(HeaderMap, Value)>>,
}

impl Script {
    fn requests(&self) -> Vec<(HeaderMap, Value)> {
        self.seen.lock().unwrap().clone()
    }
}

async fn graphql(
    State(script): State<Arc<Script>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    script.seen.lock().unwrap().push((headers, body));
    let reply = script.replies.lock().unwrap().pop_front();
    match reply {
        Some(Reply::Json(status, value)) => (status, Json(value)).into_response(),
        Some(Reply::Text(status, text)) => (status, text).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "script exhausted").into_response(),
    }
}

async fn serve(replies: Vec<Reply>) -> (Arc<Script>, ClientConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let script = Arc::new(Script {
        replies: Mutex::new(replies.into()),
        seen: Mutex::default(),
    });
    let app = axum::Router::new()
        .route("/v1/graphql", post(graphql))
        .with_state(script.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut config = ClientConfig::for_endpoint(format!("http://{addr}/v1/graphql"));
    config.http.max_retries = 2;
    config.http.retry_delays_secs = vec![0];
    (script, config)
}

fn ok(data: Value) -> Reply {
    Reply::Json(StatusCode::OK, json!({ "data": data }))
}

fn entity() -> EntityRef {
    EntityRef::new(
        "7d2c4f1a-55b3-4d0e-8f3e-2a9e6b1c0d22".parse().unwrap(),
        "payroll",
    )
}

#[tokio::test]
async fn request_carries_operation_variables_and_auth_headers() {
    let (script, mut config) = serve(vec![ok(json!({"notes_by_pk": null}))]).await;
    config.auth.admin_secret = Some("s3cret".into());
    config.auth.role = Some("manager".into());
    let client = GraphQLClient::new(&config).unwrap();

    let id = "0b5f6c2e-0d8a-4c35-9a52-4c1b9c0f7a11".parse().unwrap();
    assert!(client.get_note_by_id(id).await.unwrap().is_none());

    let requests = script.requests();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["x-hasura-admin-secret"], "s3cret");
    assert_eq!(headers["x-hasura-role"], "manager");
    assert!(headers.get("authorization").is_none());
    assert_eq!(body["operationName"], "GetNoteById");
    assert_eq!(body["variables"], json!({"id": "0b5f6c2e-0d8a-4c35-9a52-4c1b9c0f7a11"}));
    assert!(body["query"].as_str().unwrap().contains("fragment NoteWithUser on notes"));
}

#[tokio::test]
async fn queries_are_retried_on_server_errors() {
    let (script, config) = serve(vec![
        Reply::Text(StatusCode::SERVICE_UNAVAILABLE, "starting"),
        Reply::Text(StatusCode::BAD_GATEWAY, "starting"),
        ok(json!({"notes": []})),
    ])
    .await;
    let client = GraphQLClient::new(&config).unwrap();

    let notes = client.get_notes_basic(entity()).await.unwrap();
    assert!(notes.is_empty());
    assert_eq!(script.requests().len(), 3);
}

#[tokio::test]
async fn retries_stop_at_the_configured_limit() {
    let (script, config) = serve(vec![
        Reply::Text(StatusCode::SERVICE_UNAVAILABLE, "down"),
        Reply::Text(StatusCode::SERVICE_UNAVAILABLE, "down"),
        Reply::Text(StatusCode::SERVICE_UNAVAILABLE, "still down"),
    ])
    .await;
    let client = GraphQLClient::new(&config).unwrap();

    let err = client.get_notes_basic(entity()).await.unwrap_err();
    match err {
        Error::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "still down");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(script.requests().len(), 3);
}

#[tokio::test]
async fn mutations_are_sent_once_by_default() {
    let (script, config) = serve(vec![
        Reply::Text(StatusCode::SERVICE_UNAVAILABLE, "down"),
        ok(json!({"delete_notes": {"affected_rows": 2}})),
    ])
    .await;
    let client = GraphQLClient::new(&config).unwrap();

    let err = client.bulk_delete_notes(entity()).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 503, .. }));
    assert_eq!(script.requests().len(), 1);
}

#[tokio::test]
async fn mutations_retry_when_enabled() {
    let (script, mut config) = serve(vec![
        Reply::Text(StatusCode::SERVICE_UNAVAILABLE, "down"),
        ok(json!({"delete_notes": {"affected_rows": 2}})),
    ])
    .await;
    config.http.retry_mutations = true;
    let client = GraphQLClient::new(&config).unwrap();

    assert_eq!(client.bulk_delete_notes(entity()).await.unwrap(), 2);
    assert_eq!(script.requests().len(), 2);
    assert_eq!(script.requests()[1].1["operationName"], "BulkDeleteNotes");
}

#[tokio::test]
async fn graphql_errors_are_classified_by_code() {
    let (_script, config) = serve(vec![Reply::Json(
        StatusCode::OK,
        json!({"errors": [{
            "message": "Uniqueness violation. duplicate key value violates unique constraint \"notes_pkey\"",
            "extensions": {"path": "$.selectionSet.insert_notes_one.args.object", "code": "constraint-violation"},
        }]}),
    )])
    .await;
    let client = GraphQLClient::new(&config).unwrap();

    let vars = payroll_graphql_client::documents::notes::add_note::Variables::new(entity(), "dup");
    let err = client.add_note(vars).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ConstraintViolation));
    assert!(err.to_string().contains("notes_pkey"));
}

#[tokio::test]
async fn error_list_on_client_error_status_is_a_graphql_error() {
    let (script, config) = serve(vec![Reply::Json(
        StatusCode::BAD_REQUEST,
        json!({"errors": [{"message": "field 'nope' not found in type: 'query_root'", "extensions": {"code": "validation-failed"}}]}),
    )])
    .await;
    let client = GraphQLClient::new(&config).unwrap();

    let err = client
        .execute_raw("query Nope { nope }", Some("Nope"), json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ValidationFailed));
    assert_eq!(script.requests().len(), 1);
}

#[tokio::test]
async fn crud_select_decodes_the_root_field() {
    let (script, config) = serve(vec![ok(json!({
        "notes": [
            {"id": "0b5f6c2e-0d8a-4c35-9a52-4c1b9c0f7a11", "content": "first"},
            {"id": "1c6a7d3f-1e9b-4d46-ab63-5d2cad108b22", "content": "second"},
        ]
    }))])
    .await;
    let client = GraphQLClient::new(&config).unwrap();

    let rows = client
        .select::<Notes>(
            &SelectArgs::new()
                .limit(2)
                .columns(vec![notes::SelectColumn::Id, notes::SelectColumn::Content]),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].content.as_deref(), Some("second"));
    assert_eq!(rows[1].entity_type, None);

    let (_, body) = &script.requests()[0];
    assert_eq!(body["operationName"], "SelectNotes");
    assert_eq!(body["variables"], json!({"limit": 2}));
}

#[tokio::test]
async fn crud_count_reads_aggregate() {
    let (_script, config) = serve(vec![ok(json!({
        "notes_aggregate": {"aggregate": {"count": 12}}
    }))])
    .await;
    let client = GraphQLClient::new(&config).unwrap();

    let filter = notes::BoolExp {
        is_important: Some(payroll_graphql_client::types::ComparisonExp::eq(true)),
        ..Default::default()
    };
    assert_eq!(client.count::<Notes>(Some(&filter)).await.unwrap(), 12);
}
