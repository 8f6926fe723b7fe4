//! `WsLogSource` — a `LogSource` over an Ethereum JSON-RPC WebSocket.
//!
//! For every opened query the source spawns one background task that
//! fetches the historical backlog with `eth_getLogs`, then — for
//! open-ended queries — follows the live chain with
//! `eth_subscribe("logs", filter)`. Bounded queries complete cleanly once
//! the backlog is delivered. Reorg-removed logs are skipped.

use async_trait::async_trait;
use chainbind_core::{RawLog, SourceError, StreamError};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::query::LogQuery;
use crate::source::{FeedHandle, LogFeed, LogSource, DEFAULT_FEED_CAPACITY};

const GET_LOGS_ID: u64 = 1;
const SUBSCRIBE_ID: u64 = 2;

/// WebSocket log source. Cheap to clone; each opened feed gets its own
/// connection and background task.
#[derive(Debug, Clone)]
pub struct WsLogSource {
    url: String,
}

impl WsLogSource {
    /// `url` must be a `ws://` or `wss://` JSON-RPC endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl LogSource for WsLogSource {
    async fn open_log_feed(&self, query: &LogQuery) -> Result<LogFeed, SourceError> {
        // Fail synchronously on a malformed endpoint; connection errors are
        // also an open-time failure, not a stream error.
        url::Url::parse(&self.url).map_err(|e| SourceError::InvalidQuery {
            reason: format!("bad endpoint url: {e}"),
        })?;

        info!(url = %self.url, "connecting log feed");
        let (ws, _) = connect_async(&self.url)
            .await
            .map_err(|e| SourceError::ConnectionFailed {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        let (handle, feed) = LogFeed::channel(DEFAULT_FEED_CAPACITY);
        let query = query.clone();
        tokio::spawn(run_feed(ws, query, handle));
        Ok(feed)
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn run_feed(ws: WsStream, query: LogQuery, handle: FeedHandle) {
    let (mut write, mut read) = ws.split();
    let filter = build_filter(&query);

    // Historical backlog first.
    let get_logs = json!({
        "jsonrpc": "2.0",
        "id": GET_LOGS_ID,
        "method": "eth_getLogs",
        "params": [filter],
    });
    if let Err(e) = write.send(Message::Text(get_logs.to_string())).await {
        handle.finish(Err(StreamError::Subscription {
            reason: format!("eth_getLogs send failed: {e}"),
        }));
        return;
    }

    let backlog = match await_response(&mut read, GET_LOGS_ID).await {
        Ok(result) => result,
        Err(e) => {
            handle.finish(Err(e));
            return;
        }
    };
    let logs = backlog.as_array().cloned().unwrap_or_default();
    debug!(count = logs.len(), "backlog received");
    for value in &logs {
        if let Some(raw) = parse_log_object(value) {
            if !handle.send(raw).await {
                return; // consumer released the feed
            }
        }
    }

    if query.is_bounded() {
        handle.finish(Ok(()));
        return;
    }

    // Live tail.
    let subscribe = json!({
        "jsonrpc": "2.0",
        "id": SUBSCRIBE_ID,
        "method": "eth_subscribe",
        "params": ["logs", filter],
    });
    if let Err(e) = write.send(Message::Text(subscribe.to_string())).await {
        handle.finish(Err(StreamError::Subscription {
            reason: format!("eth_subscribe send failed: {e}"),
        }));
        return;
    }
    if let Err(e) = await_response(&mut read, SUBSCRIBE_ID).await {
        handle.finish(Err(e));
        return;
    }
    debug!("live subscription established");

    while let Some(msg_result) = read.next().await {
        match msg_result {
            Err(e) => {
                warn!("websocket error: {e}");
                handle.finish(Err(StreamError::Subscription {
                    reason: e.to_string(),
                }));
                return;
            }
            Ok(Message::Text(text)) => {
                if let Some(raw) = parse_subscription_log(&text) {
                    if !handle.send(raw).await {
                        return;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("websocket closed by server");
                handle.finish(Err(StreamError::Closed));
                return;
            }
            Ok(Message::Ping(data)) => {
                // Keep the connection alive
                let _ = write.send(Message::Pong(data)).await;
            }
            Ok(_) => {} // binary / pong — ignore
        }
    }

    handle.finish(Err(StreamError::Closed));
}

/// Wait for the JSON-RPC response with the given id, surfacing RPC-level
/// errors as stream errors.
async fn await_response(
    read: &mut (impl StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin),
    id: u64,
) -> Result<Value, StreamError> {
    while let Some(msg_result) = read.next().await {
        let msg = msg_result.map_err(|e| StreamError::Subscription {
            reason: e.to_string(),
        })?;
        let Message::Text(text) = msg else { continue };
        let Ok(v) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        if v.get("id").and_then(Value::as_u64) != Some(id) {
            continue;
        }
        if let Some(err) = v.get("error") {
            return Err(StreamError::Subscription {
                reason: format!(
                    "rpc error {}: {}",
                    err.get("code").and_then(Value::as_i64).unwrap_or(0),
                    err.get("message").and_then(Value::as_str).unwrap_or("?"),
                ),
            });
        }
        return Ok(v.get("result").cloned().unwrap_or(Value::Null));
    }
    Err(StreamError::Closed)
}

/// Build the JSON-RPC filter object shared by `eth_getLogs` and
/// `eth_subscribe("logs", ...)`.
fn build_filter(query: &LogQuery) -> Value {
    let mut filter = serde_json::Map::new();
    filter.insert("fromBlock".into(), json!(format!("0x{:x}", query.from_block)));
    match query.to_block {
        Some(to) => filter.insert("toBlock".into(), json!(format!("0x{to:x}"))),
        None => filter.insert("toBlock".into(), json!("latest")),
    };
    if !query.addresses.is_empty() {
        filter.insert("address".into(), json!(query.addresses));
    }
    if query.event_topic.is_some() || !query.topic_filters.is_empty() {
        let mut topics: Vec<Value> = vec![match &query.event_topic {
            Some(t) => json!(t),
            None => Value::Null,
        }];
        for allowed in &query.topic_filters {
            topics.push(if allowed.is_empty() {
                Value::Null
            } else {
                json!(allowed)
            });
        }
        filter.insert("topics".into(), Value::Array(topics));
    }
    Value::Object(filter)
}

/// Parse an `eth_subscription` notification into a `RawLog`.
/// Returns `None` for confirmations, removed logs and unrelated frames.
fn parse_subscription_log(text: &str) -> Option<RawLog> {
    let v: Value = serde_json::from_str(text).ok()?;
    if v.get("method")?.as_str()? != "eth_subscription" {
        return None;
    }
    parse_log_object(v.get("params")?.get("result")?)
}

/// Parse a single JSON-RPC log object. Returns `None` for removed logs or
/// malformed objects.
fn parse_log_object(value: &Value) -> Option<RawLog> {
    if value
        .get("removed")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return None;
    }

    let address = value.get("address")?.as_str()?.to_string();
    let topics: Vec<String> = value
        .get("topics")?
        .as_array()?
        .iter()
        .filter_map(|t| t.as_str().map(String::from))
        .collect();
    if topics.is_empty() {
        return None;
    }

    let data_hex = value.get("data").and_then(Value::as_str).unwrap_or("0x");
    let data = hex::decode(data_hex.strip_prefix("0x").unwrap_or(data_hex)).unwrap_or_default();

    Some(RawLog {
        address,
        topics,
        data,
        block_number: hex_str_to_u64(value.get("blockNumber").and_then(Value::as_str)),
        block_hash: value
            .get("blockHash")
            .and_then(Value::as_str)
            .unwrap_or("0x0")
            .to_string(),
        tx_hash: value
            .get("transactionHash")
            .and_then(Value::as_str)
            .unwrap_or("0x0")
            .to_string(),
        tx_index: hex_str_to_u64(value.get("transactionIndex").and_then(Value::as_str)) as u32,
        log_index: hex_str_to_u64(value.get("logIndex").and_then(Value::as_str)) as u32,
        removed: false,
    })
}

fn hex_str_to_u64(s: Option<&str>) -> u64 {
    s.and_then(|h| u64::from_str_radix(h.strip_prefix("0x").unwrap_or(h), 16).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_carries_topics_and_range() {
        let query = LogQuery::event(
            "0x30fb915258d844e9dc420b2c3aa97420aea16db7",
            "0x1826f74860bd5ff97bcab2245acae00a635acaa3dbc72e5c68b83ff34b1fac00",
        )
        .with_topic_filter(0, vec!["0x64".into()])
        .with_blocks(16, Some(32));

        let filter = build_filter(&query);
        assert_eq!(filter["fromBlock"], "0x10");
        assert_eq!(filter["toBlock"], "0x20");
        assert_eq!(
            filter["address"][0],
            "0x30fb915258d844e9dc420b2c3aa97420aea16db7"
        );
        assert_eq!(
            filter["topics"][0],
            "0x1826f74860bd5ff97bcab2245acae00a635acaa3dbc72e5c68b83ff34b1fac00"
        );
        assert_eq!(filter["topics"][1][0], "0x64");
    }

    #[test]
    fn open_ended_filter_uses_latest() {
        let filter = build_filter(&LogQuery::default());
        assert_eq!(filter["toBlock"], "latest");
    }

    #[test]
    fn parse_subscription_notification() {
        let msg = r#"{
            "jsonrpc":"2.0","method":"eth_subscription",
            "params":{
                "subscription":"0xabc",
                "result":{
                    "address":"0x30fb915258d844e9dc420b2c3aa97420aea16db7",
                    "topics":["0x1826f74860bd5ff97bcab2245acae00a635acaa3dbc72e5c68b83ff34b1fac00"],
                    "data":"0x00000000000000000000000000000000000000000000000000000000000003e8",
                    "blockNumber":"0x1234","logIndex":"0x0","transactionIndex":"0x2",
                    "transactionHash":"0xdeadbeef","blockHash":"0xfeed",
                    "removed":false
                }
            }
        }"#;
        let raw = parse_subscription_log(msg).unwrap();
        assert_eq!(raw.block_number, 0x1234);
        assert_eq!(raw.tx_index, 2);
        assert_eq!(raw.data.len(), 32);
    }

    #[test]
    fn skip_subscription_confirmation() {
        let msg = r#"{"jsonrpc":"2.0","id":2,"result":"0xsubid"}"#;
        assert!(parse_subscription_log(msg).is_none());
    }

    #[test]
    fn skip_removed_log() {
        let log = serde_json::json!({
            "address":"0x1","topics":["0x1"],"data":"0x","removed":true,
            "blockNumber":"0x1","logIndex":"0x0","transactionHash":"0x1"
        });
        assert!(parse_log_object(&log).is_none());
    }
}
