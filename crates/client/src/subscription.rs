//! `graphql-transport-ws` subscriptions.
//!
//! One WebSocket per subscription: `connection_init` → `connection_ack` →
//! `subscribe` → `next`* → `complete`. A background task owns the socket and
//! forwards decoded payloads over a bounded channel; dropping the
//! [`Subscription`] tells the task to send `complete` and close.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{SinkExt, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::client::into_data;
use crate::config::SubscriptionSettings;
use crate::error::{Error, GraphQLErrors, Result};

/// `Sec-WebSocket-Protocol` value.
pub const PROTOCOL: &str = "graphql-transport-ws";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Messages of the `graphql-transport-ws` protocol, both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolMessage {
    ConnectionInit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    ConnectionAck {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Subscribe {
        id: String,
        payload: Value,
    },
    Next {
        id: String,
        payload: Value,
    },
    /// Payload is a list of GraphQL errors.
    Error {
        id: String,
        payload: Value,
    },
    Complete {
        id: String,
    },
}

impl ProtocolMessage {
    pub fn to_text(&self) -> Result<WsMessage> {
        Ok(WsMessage::Text(serde_json::to_string(self)?))
    }
}

/// Decoder applied to every `next` payload's `data`.
pub(crate) type Decode<T> = Box<dyn Fn(Value) -> Result<T> + Send + Sync>;

/// Live results of one subscription.
///
/// Yields one item per `next` message; ends after `complete`, after an
/// `error` message (yielded as `Err`), or when the socket closes. A consumer
/// that falls behind does not stop the reader from answering `ping` or from
/// honouring [`Subscription::unsubscribe`].
pub struct Subscription<T> {
    id: String,
    rx: mpsc::Receiver<Result<T>>,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl<T> Unpin for Subscription<T> {}

impl<T> Subscription<T> {
    /// Protocol-level subscription id.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn next(&mut self) -> Option<Result<T>> {
        self.rx.recv().await
    }

    /// Send `complete`, close the socket and wait for the reader to exit.
    pub async fn unsubscribe(mut self) {
        self.rx.close();
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl<T> Stream for Subscription<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

/// Open a socket, handshake and start `request` (a serialised query body).
pub(crate) async fn start<T: Send + 'static>(
    url: &str,
    init_payload: Value,
    request: Value,
    settings: &SubscriptionSettings,
    decode: Decode<T>,
) -> Result<Subscription<T>> {
    let mut handshake = url.into_client_request()?;
    handshake
        .headers_mut()
        .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(PROTOCOL));

    let (mut socket, _) = tokio_tungstenite::connect_async(handshake).await?;
    debug!(url, "websocket connected");

    send(
        &mut socket,
        &ProtocolMessage::ConnectionInit {
            payload: Some(init_payload),
        },
    )
    .await?;
    tokio::time::timeout(settings.connection_init_timeout(), wait_for_ack(&mut socket))
        .await
        .map_err(|_| Error::Timeout("connection_ack"))??;

    let id = uuid::Uuid::new_v4().to_string();
    send(
        &mut socket,
        &ProtocolMessage::Subscribe {
            id: id.clone(),
            payload: request,
        },
    )
    .await?;
    info!(id = %id, "subscription started");

    let capacity = settings.channel_capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    let (stop_tx, stop_rx) = oneshot::channel();
    let task = tokio::spawn(pump(socket, id.clone(), tx, stop_rx, decode, capacity));

    Ok(Subscription {
        id,
        rx,
        stop: Some(stop_tx),
        task: Some(task),
    })
}

/// Wrap `serde_json::from_value` as a [`Decode`].
pub(crate) fn decode_into<T: DeserializeOwned + Send + 'static>() -> Decode<T> {
    Box::new(|data| serde_json::from_value(data).map_err(Error::from))
}

async fn send(socket: &mut Socket, message: &ProtocolMessage) -> Result<()> {
    socket.send(message.to_text()?).await?;
    Ok(())
}

async fn wait_for_ack(socket: &mut Socket) -> Result<()> {
    while let Some(frame) = socket.next().await {
        match frame? {
            WsMessage::Text(text) => match serde_json::from_str::<ProtocolMessage>(&text)? {
                ProtocolMessage::ConnectionAck { .. } => return Ok(()),
                ProtocolMessage::Ping { .. } => {
                    send(socket, &ProtocolMessage::Pong { payload: None }).await?;
                }
                other => {
                    return Err(Error::Protocol(format!(
                        "expected connection_ack, got {other:?}"
                    )));
                }
            },
            WsMessage::Close(frame) => {
                let reason = frame.map_or_else(String::new, |f| f.reason.into_owned());
                return Err(Error::Protocol(format!(
                    "server closed the connection during init: {reason}"
                )));
            }
            _ => {}
        }
    }
    Err(Error::Protocol(
        "connection closed before connection_ack".into(),
    ))
}

enum Flow {
    Continue,
    /// The server ended the operation; flush what is buffered and close.
    Finished,
    /// Stop reading; flush, then tell the server we are done.
    Abandon,
}

async fn pump<T>(
    mut socket: Socket,
    id: String,
    tx: mpsc::Sender<Result<T>>,
    mut stop: oneshot::Receiver<()>,
    decode: Decode<T>,
    capacity: usize,
) {
    // Items read off the socket but not yet accepted by the consumer. The
    // socket is only read while this has room.
    let mut backlog: VecDeque<Result<T>> = VecDeque::new();
    let mut reading = true;
    let mut send_complete = false;

    loop {
        if !reading && backlog.is_empty() {
            break;
        }
        tokio::select! {
            _ = &mut stop => {
                debug!(id = %id, "unsubscribing");
                send_complete = true;
                break;
            }
            _ = tx.closed() => {
                debug!(id = %id, "receiver dropped");
                send_complete = true;
                break;
            }
            permit = tx.reserve(), if !backlog.is_empty() => match permit {
                Ok(permit) => {
                    if let Some(item) = backlog.pop_front() {
                        permit.send(item);
                    }
                }
                Err(_) => {
                    send_complete = true;
                    break;
                }
            },
            frame = socket.next(), if reading && backlog.len() < capacity => {
                let flow = match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_text(&mut socket, &id, &decode, &text, &mut backlog).await
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        debug!(id = %id, "websocket closed by server");
                        Flow::Finished
                    }
                    Some(Ok(_)) => Flow::Continue,
                    Some(Err(e)) => {
                        warn!(id = %id, error = %e, "websocket read failed");
                        backlog.push_back(Err(e.into()));
                        Flow::Finished
                    }
                };
                match flow {
                    Flow::Continue => {}
                    Flow::Finished => reading = false,
                    Flow::Abandon => {
                        reading = false;
                        send_complete = true;
                    }
                }
            }
        }
    }

    if send_complete {
        let _ = send(&mut socket, &ProtocolMessage::Complete { id: id.clone() }).await;
    }
    let _ = socket.close(None).await;
    info!(id = %id, "subscription ended");
}

async fn handle_text<T>(
    socket: &mut Socket,
    id: &str,
    decode: &Decode<T>,
    text: &str,
    backlog: &mut VecDeque<Result<T>>,
) -> Flow {
    let message = match serde_json::from_str::<ProtocolMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            backlog.push_back(Err(e.into()));
            return Flow::Abandon;
        }
    };

    match message {
        ProtocolMessage::Next { id: msg_id, payload } if msg_id == id => {
            let item = serde_json::from_value::<graphql_client::Response<Value>>(payload)
                .map_err(Error::from)
                .and_then(into_data)
                .and_then(|data| decode(data));
            backlog.push_back(item);
            Flow::Continue
        }
        ProtocolMessage::Error { id: msg_id, payload } if msg_id == id => {
            let item = match serde_json::from_value::<Vec<graphql_client::Error>>(payload) {
                Ok(errors) if !errors.is_empty() => Err(Error::GraphQL(GraphQLErrors(errors))),
                Ok(_) => Err(Error::Protocol("error message without errors".into())),
                Err(e) => Err(e.into()),
            };
            backlog.push_back(item);
            Flow::Finished
        }
        ProtocolMessage::Complete { id: msg_id } if msg_id == id => Flow::Finished,
        ProtocolMessage::Ping { .. } => {
            match send(socket, &ProtocolMessage::Pong { payload: None }).await {
                Ok(()) => Flow::Continue,
                Err(_) => Flow::Finished,
            }
        }
        other => {
            debug!(id, message = ?other, "ignoring message");
            Flow::Continue
        }
    }
}
