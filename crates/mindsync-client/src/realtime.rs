//! Realtime change-feed subscriber.
//!
//! Speaks the Phoenix channel protocol exposed by the hosted realtime
//! service: one websocket, one channel join per table, periodic heartbeats
//! on the `phoenix` topic, and `postgres_changes` payloads decoded into
//! [`ChangeEvent`]s. On socket failure the feed reconnects with bounded
//! exponential backoff and re-joins every table channel; per-table delivery
//! order within one session follows feed order.

use std::time::Duration;

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use mindsync_config::{RelayConfig, SupabaseConfig};
use mindsync_core::ChangeEvent;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// A change event tagged with the table it happened on.
#[derive(Debug, Clone, PartialEq)]
pub struct TableChange {
    /// Source table the mutation was observed on.
    pub table: String,
    /// The decoded mutation.
    pub event: ChangeEvent,
}

/// Wire envelope shared by every Phoenix frame.
#[derive(Debug, Serialize, Deserialize)]
struct SocketMessage {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    reference: Option<Value>,
}

/// Payload of a `postgres_changes` frame.
#[derive(Debug, Deserialize)]
struct ChangePayload {
    #[serde(default)]
    data: Option<ChangeData>,
}

#[derive(Debug, Deserialize)]
struct ChangeData {
    #[serde(rename = "type")]
    kind: String,
    table: String,
    #[serde(default)]
    record: Option<Map<String, Value>>,
    #[serde(default)]
    old_record: Option<Map<String, Value>>,
}

/// What one inbound text frame means to the feed loop.
#[derive(Debug)]
enum Inbound {
    Change(TableChange),
    Reply { topic: String, ok: bool },
    System,
    Ignored,
}

/// Long-lived subscriber for a fixed set of tables.
pub struct RealtimeFeed {
    url: String,
    tables: Vec<String>,
    heartbeat: Duration,
    backoff_base: Duration,
    backoff_max: Duration,
}

impl RealtimeFeed {
    /// Build a feed against a configured endpoint for the given tables.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the endpoint is unconfigured or
    /// its URL scheme is not http(s).
    pub fn new(
        endpoint: &SupabaseConfig,
        relay: &RelayConfig,
        tables: Vec<String>,
    ) -> Result<Self, ClientError> {
        if !endpoint.is_configured() {
            return Err(ClientError::Config(
                "endpoint URL and service-role key must both be set".to_string(),
            ));
        }
        Ok(Self {
            url: websocket_url(endpoint)?,
            tables,
            heartbeat: Duration::from_secs(relay.heartbeat_secs),
            backoff_base: Duration::from_millis(relay.reconnect_base_ms),
            backoff_max: Duration::from_millis(relay.reconnect_max_ms),
        })
    }

    /// Run the feed until `shutdown` flips or the event receiver goes away,
    /// delivering decoded changes to `tx` in feed order.
    ///
    /// Socket failures are not fatal: the feed backs off (doubling from the
    /// configured base up to the cap), reconnects, and re-joins every table
    /// channel. Only shutdown ends the loop.
    ///
    /// # Errors
    ///
    /// Currently never returns an error; the `Result` keeps room for fatal
    /// protocol conditions (e.g., authentication rejection) to surface.
    pub async fn run(
        self,
        tx: mpsc::Sender<TableChange>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), ClientError> {
        let mut backoff = self.backoff_base;
        loop {
            if *shutdown.borrow() {
                return Ok(());
            }
            match self.session(&mut backoff, &tx, &mut shutdown).await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    warn!(%error, delay_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX), "change feed dropped, reconnecting");
                }
            }
            tokio::select! {
                () = tokio::time::sleep(backoff) => {}
                _ = shutdown.changed() => {}
            }
            backoff = (backoff * 2).min(self.backoff_max);
        }
    }

    /// One connected session: join all channels, then pump frames until the
    /// socket drops (error) or shutdown is requested (clean return).
    async fn session(
        &self,
        backoff: &mut Duration,
        tx: &mpsc::Sender<TableChange>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), ClientError> {
        info!(tables = self.tables.len(), "connecting to change feed");
        let (socket, _) = connect_async(self.url.as_str()).await?;
        let (mut sink, mut stream) = socket.split();

        let mut reference: u64 = 0;
        for table in &self.tables {
            reference += 1;
            send_frame(&mut sink, &join_frame(table, reference)).await?;
        }
        // Connected and joined; the next failure starts backing off afresh.
        *backoff = self.backoff_base;

        let mut heartbeat = tokio::time::interval(self.heartbeat);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The server answers every heartbeat, so a healthy link yields at
        // least one frame per interval. Three silent intervals means the
        // link is dead even if the socket never errored.
        let idle_limit = self.heartbeat * 3;
        let mut deadline = tokio::time::Instant::now() + idle_limit;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.leave(&mut sink, reference).await;
                        return Ok(());
                    }
                }
                _ = heartbeat.tick() => {
                    reference += 1;
                    send_frame(&mut sink, &heartbeat_frame(reference)).await?;
                }
                () = tokio::time::sleep_until(deadline) => {
                    return Err(ClientError::Feed(
                        "no frames within the heartbeat window".to_string(),
                    ));
                }
                frame = stream.next() => {
                    deadline = tokio::time::Instant::now() + idle_limit;
                    if self.handle_frame(frame, &mut sink, tx).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Process one inbound frame. Returns `Ok(true)` when the loop should
    /// end cleanly (event receiver gone -- the engine is shutting down).
    async fn handle_frame(
        &self,
        frame: Option<Result<Message, tokio_tungstenite::tungstenite::Error>>,
        sink: &mut WsSink,
        tx: &mpsc::Sender<TableChange>,
    ) -> Result<bool, ClientError> {
        match frame {
            None => Err(ClientError::Feed("socket closed by peer".to_string())),
            Some(Err(error)) => Err(error.into()),
            Some(Ok(Message::Text(text))) => {
                match decode_frame(&text) {
                    Ok(Inbound::Change(change)) => {
                        if tx.send(change).await.is_err() {
                            return Ok(true);
                        }
                    }
                    Ok(Inbound::Reply { topic, ok }) => {
                        if ok {
                            debug!(topic, "channel reply ok");
                        } else {
                            warn!(topic, "channel reply reported an error");
                        }
                    }
                    Ok(Inbound::System | Inbound::Ignored) => {}
                    Err(error) => warn!(%error, "skipping undecodable feed frame"),
                }
                Ok(false)
            }
            Some(Ok(Message::Ping(payload))) => {
                sink.send(Message::Pong(payload)).await?;
                Ok(false)
            }
            Some(Ok(Message::Close(_))) => {
                Err(ClientError::Feed("server closed the socket".to_string()))
            }
            Some(Ok(_)) => Ok(false),
        }
    }

    /// Best-effort channel leave + socket close on shutdown.
    async fn leave(&self, sink: &mut WsSink, mut reference: u64) {
        for table in &self.tables {
            reference += 1;
            let _ = send_frame(sink, &leave_frame(table, reference)).await;
        }
        let _ = sink.send(Message::Close(None)).await;
        debug!("left all channels");
    }
}

async fn send_frame(sink: &mut WsSink, frame: &SocketMessage) -> Result<(), ClientError> {
    let text = serde_json::to_string(frame).map_err(|e| ClientError::Feed(e.to_string()))?;
    sink.send(Message::Text(text.into())).await?;
    Ok(())
}

/// Channel topic for one table's change subscription.
fn topic_for(table: &str) -> String {
    format!("realtime:table-changes-{table}")
}

fn join_frame(table: &str, reference: u64) -> SocketMessage {
    SocketMessage {
        topic: topic_for(table),
        event: "phx_join".to_string(),
        payload: json!({
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [
                    { "event": "*", "schema": "public", "table": table }
                ]
            }
        }),
        reference: Some(json!(reference.to_string())),
    }
}

fn heartbeat_frame(reference: u64) -> SocketMessage {
    SocketMessage {
        topic: "phoenix".to_string(),
        event: "heartbeat".to_string(),
        payload: json!({}),
        reference: Some(json!(reference.to_string())),
    }
}

fn leave_frame(table: &str, reference: u64) -> SocketMessage {
    SocketMessage {
        topic: topic_for(table),
        event: "phx_leave".to_string(),
        payload: json!({}),
        reference: Some(json!(reference.to_string())),
    }
}

/// Derive the websocket endpoint from the project URL.
fn websocket_url(endpoint: &SupabaseConfig) -> Result<String, ClientError> {
    let base = endpoint.base_url();
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(ClientError::Config(format!(
            "unsupported endpoint scheme: {base}"
        )));
    };
    Ok(format!(
        "{ws_base}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
        urlencoding::encode(&endpoint.service_role_key)
    ))
}

/// Decode one inbound text frame.
fn decode_frame(text: &str) -> Result<Inbound, ClientError> {
    let message: SocketMessage =
        serde_json::from_str(text).map_err(|e| ClientError::Feed(e.to_string()))?;

    match message.event.as_str() {
        "postgres_changes" => {
            let payload: ChangePayload = serde_json::from_value(message.payload)
                .map_err(|e| ClientError::Feed(e.to_string()))?;
            let Some(data) = payload.data else {
                return Err(ClientError::Feed(
                    "postgres_changes frame without data".to_string(),
                ));
            };
            Ok(Inbound::Change(decode_change(data)?))
        }
        "phx_reply" => {
            let ok = message
                .payload
                .get("status")
                .and_then(Value::as_str)
                .is_some_and(|status| status == "ok");
            Ok(Inbound::Reply {
                topic: message.topic,
                ok,
            })
        }
        "system" => Ok(Inbound::System),
        _ => Ok(Inbound::Ignored),
    }
}

fn decode_change(data: ChangeData) -> Result<TableChange, ClientError> {
    let event = match data.kind.as_str() {
        "INSERT" => ChangeEvent::Insert {
            record: data
                .record
                .ok_or_else(|| ClientError::Feed("INSERT without record".to_string()))?,
        },
        "UPDATE" => ChangeEvent::Update {
            record: data
                .record
                .ok_or_else(|| ClientError::Feed("UPDATE without record".to_string()))?,
        },
        "DELETE" => ChangeEvent::Delete {
            old_record: data
                .old_record
                .ok_or_else(|| ClientError::Feed("DELETE without old_record".to_string()))?,
        },
        other => {
            return Err(ClientError::Feed(format!("unknown change type: {other}")));
        }
    };
    Ok(TableChange {
        table: data.table,
        event,
    })
}
