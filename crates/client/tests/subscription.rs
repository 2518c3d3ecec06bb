//! `graphql-transport-ws` behaviour against a scripted in-process socket.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;

use payroll_graphql_client::subscription::PROTOCOL;
use payroll_graphql_client::types::CursorOrdering;
use payroll_graphql_client::types::tables::{Notes, notes};
use payroll_graphql_client::{ClientConfig, EntityRef, Error, ErrorKind, GraphQLClient};

const WAIT: Duration = Duration::from_secs(5);

/// What the server sends once it sees `subscribe`, in order.
enum Step {
    Next(Value),
    Error(Value),
    Complete,
    Ping,
}

impl Step {
    fn frame(&self, id: &str) -> Message {
        let value = match self {
            Step::Next(data) => json!({"type": "next", "id": id, "payload": {"data": data}}),
            Step::Error(errors) => json!({"type": "error", "id": id, "payload": errors}),
            Step::Complete => json!({"type": "complete", "id": id}),
            Step::Ping => json!({"type": "ping"}),
        };
        Message::Text(value.to_string())
    }
}

struct WsScript {
    ack: bool,
    steps: Vec<Step>,
}

fn negotiate(request: &Request, mut response: Response) -> Result<Response, ErrorResponse> {
    let offered = request
        .headers()
        .get(SEC_WEBSOCKET_PROTOCOL)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if offered.contains(PROTOCOL) {
        response
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(PROTOCOL));
    }
    Ok(response)
}

/// Play `script` on one connection, forwarding every client message to
/// `seen`. The sender is dropped once the client goes away.
async fn play(stream: TcpStream, script: Arc<WsScript>, seen: mpsc::UnboundedSender<Value>) {
    let Ok(mut socket) = tokio_tungstenite::accept_hdr_async(stream, negotiate).await else {
        return;
    };
    while let Some(Ok(frame)) = socket.next().await {
        let text = match frame {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let Ok(message) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        let _ = seen.send(message.clone());
        match message["type"].as_str() {
            Some("connection_init") if script.ack => {
                let ack = Message::Text(json!({"type": "connection_ack"}).to_string());
                if socket.send(ack).await.is_err() {
                    break;
                }
            }
            Some("subscribe") => {
                let id = message["id"].as_str().unwrap_or_default().to_string();
                for step in &script.steps {
                    if socket.send(step.frame(&id)).await.is_err() {
                        return;
                    }
                }
            }
            _ => {}
        }
    }
}

async fn serve(ack: bool, steps: Vec<Step>) -> (mpsc::UnboundedReceiver<Value>, ClientConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let script = Arc::new(WsScript { ack, steps });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(play(stream, script.clone(), seen_tx.clone()));
        }
    });

    let mut config = ClientConfig::for_endpoint(format!("http://{addr}/v1/graphql"));
    config.endpoint.ws_url = Some(format!("ws://{addr}/v1/graphql"));
    config.subscriptions.connection_init_timeout_secs = 1;
    (seen_rx, config)
}

/// Next client message of type `ty`, skipping the others.
async fn expect_frame(seen: &mut mpsc::UnboundedReceiver<Value>, ty: &str) -> Value {
    timeout(WAIT, async {
        while let Some(message) = seen.recv().await {
            if message["type"] == ty {
                return message;
            }
        }
        panic!("connection ended before a {ty} message");
    })
    .await
    .unwrap_or_else(|_| panic!("no {ty} message within {WAIT:?}"))
}

fn entity() -> EntityRef {
    EntityRef::new(
        "7d2c4f1a-55b3-4d0e-8f3e-2a9e6b1c0d22".parse().unwrap(),
        "payroll",
    )
}

fn empty_notes() -> Step {
    Step::Next(json!({"notes": []}))
}

#[tokio::test]
async fn connection_init_carries_auth_headers() {
    let (mut seen, mut config) = serve(true, vec![empty_notes()]).await;
    config.auth.admin_secret = Some("s3cret".into());
    let client = GraphQLClient::new(&config).unwrap();

    let mut sub = client.notes_updates(entity()).await.unwrap();
    let init = expect_frame(&mut seen, "connection_init").await;
    assert_eq!(init["payload"]["headers"]["x-hasura-admin-secret"], "s3cret");

    let subscribe = expect_frame(&mut seen, "subscribe").await;
    assert_eq!(subscribe["id"], sub.id());
    assert_eq!(subscribe["payload"]["operationName"], "NotesUpdates");
    assert_eq!(
        subscribe["payload"]["variables"]["entityId"],
        "7d2c4f1a-55b3-4d0e-8f3e-2a9e6b1c0d22"
    );
    assert!(matches!(sub.next().await, Some(Ok(data)) if data.notes.is_empty()));
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let (mut seen, config) = serve(true, vec![Step::Ping, empty_notes()]).await;
    let client = GraphQLClient::new(&config).unwrap();

    let mut sub = client.notes_updates(entity()).await.unwrap();
    let pong = expect_frame(&mut seen, "pong").await;
    assert!(pong.get("payload").is_none());
    assert!(matches!(sub.next().await, Some(Ok(_))));
}

#[tokio::test]
async fn server_complete_ends_the_stream() {
    let (_seen, config) = serve(true, vec![empty_notes(), Step::Complete]).await;
    let client = GraphQLClient::new(&config).unwrap();

    let mut sub = client.notes_updates(entity()).await.unwrap();
    assert!(matches!(sub.next().await, Some(Ok(_))));
    let end = timeout(WAIT, sub.next()).await.unwrap();
    assert!(end.is_none(), "stream kept going after complete");
}

#[tokio::test]
async fn server_error_is_yielded_then_the_stream_ends() {
    let errors = json!([{
        "message": "field 'nope' not found in type: 'notes'",
        "extensions": {"code": "validation-failed", "path": "$.selectionSet.notes"}
    }]);
    let (_seen, config) = serve(true, vec![Step::Error(errors)]).await;
    let client = GraphQLClient::new(&config).unwrap();

    let mut sub = client.notes_updates(entity()).await.unwrap();
    match timeout(WAIT, sub.next()).await.unwrap() {
        Some(Err(Error::GraphQL(errors))) => {
            assert_eq!(errors.kind(), ErrorKind::ValidationFailed);
        }
        Some(Err(other)) => panic!("expected a GraphQL error, got {other}"),
        Some(Ok(_)) => panic!("expected a GraphQL error, got data"),
        None => panic!("stream ended without the error"),
    }
    assert!(timeout(WAIT, sub.next()).await.unwrap().is_none());
}

#[tokio::test]
async fn missing_connection_ack_times_out() {
    let (_seen, config) = serve(false, Vec::new()).await;
    let client = GraphQLClient::new(&config).unwrap();

    let started = timeout(WAIT, client.notes_updates(entity())).await.unwrap();
    assert!(
        matches!(started, Err(Error::Timeout(_))),
        "expected a connection_ack timeout"
    );
}

#[tokio::test]
async fn unsubscribe_sends_complete() {
    let (mut seen, config) = serve(true, vec![empty_notes()]).await;
    let client = GraphQLClient::new(&config).unwrap();

    let mut sub = client.notes_updates(entity()).await.unwrap();
    let id = sub.id().to_string();
    assert!(matches!(sub.next().await, Some(Ok(_))));
    timeout(WAIT, sub.unsubscribe()).await.unwrap();

    let complete = expect_frame(&mut seen, "complete").await;
    assert_eq!(complete["id"], id);
}

#[tokio::test]
async fn dropping_a_subscription_sends_complete() {
    let (mut seen, config) = serve(true, vec![empty_notes()]).await;
    let client = GraphQLClient::new(&config).unwrap();

    let sub = client.notes_updates(entity()).await.unwrap();
    let id = sub.id().to_string();
    drop(sub);

    let complete = expect_frame(&mut seen, "complete").await;
    assert_eq!(complete["id"], id);
}

#[tokio::test]
async fn unsubscribe_returns_while_the_consumer_lags() {
    let steps = (0..8).map(|_| empty_notes()).collect();
    let (mut seen, mut config) = serve(true, steps).await;
    config.subscriptions.channel_capacity = 1;
    let client = GraphQLClient::new(&config).unwrap();

    let sub = client.notes_updates(entity()).await.unwrap();
    let id = sub.id().to_string();
    // Let the reader fill every buffer without anyone consuming.
    tokio::time::sleep(Duration::from_millis(200)).await;

    timeout(WAIT, sub.unsubscribe())
        .await
        .expect("unsubscribe stalled behind unread items");
    let complete = expect_frame(&mut seen, "complete").await;
    assert_eq!(complete["id"], id);
}

#[tokio::test]
async fn lagging_consumer_still_receives_every_item_in_order() {
    let steps = (0..6)
        .map(|n| Step::Next(json!({"notes_stream": [{"content": format!("row {n}")}]})))
        .chain([Step::Complete])
        .collect();
    let (_seen, mut config) = serve(true, steps).await;
    config.subscriptions.channel_capacity = 1;
    let client = GraphQLClient::new(&config).unwrap();

    let cursor = notes::StreamCursorInput {
        initial_value: notes::StreamCursorValueInput::default(),
        ordering: Some(CursorOrdering::Asc),
    };
    let sub = client.stream::<Notes>(1, &cursor, None, &[]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let batches: Vec<_> = timeout(WAIT, sub.collect::<Vec<_>>()).await.unwrap();
    let contents: Vec<String> = batches
        .into_iter()
        .map(|batch| batch.unwrap().remove(0).content.unwrap())
        .collect();
    assert_eq!(
        contents,
        (0..6).map(|n| format!("row {n}")).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn table_stream_subscribes_to_the_stream_root_field() {
    let row = json!({
        "id": "0b5f6c2e-0d8a-4c35-9a52-4c1b9c0f7a11",
        "content": "hello",
        "is_important": false
    });
    let (mut seen, config) = serve(true, vec![Step::Next(json!({"notes_stream": [row]}))]).await;
    let client = GraphQLClient::new(&config).unwrap();

    let cursor = notes::StreamCursorInput {
        initial_value: notes::StreamCursorValueInput {
            created_at: Some("2025-01-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        },
        ordering: Some(CursorOrdering::Asc),
    };
    let mut sub = client.stream::<Notes>(10, &cursor, None, &[]).await.unwrap();

    let subscribe = expect_frame(&mut seen, "subscribe").await;
    assert_eq!(subscribe["payload"]["operationName"], "StreamNotes");
    assert_eq!(subscribe["payload"]["variables"]["batch_size"], 10);
    assert!(
        subscribe["payload"]["query"]
            .as_str()
            .unwrap()
            .contains("notes_stream(")
    );

    let rows = match timeout(WAIT, sub.next()).await.unwrap() {
        Some(Ok(rows)) => rows,
        _ => panic!("expected a batch of rows"),
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].content.as_deref(), Some("hello"));
    assert_eq!(rows[0].is_important, Some(false));
}
