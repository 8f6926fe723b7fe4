//! End-to-end behavior of the iterator and watch adapters over an
//! in-memory feed.

use chainbind_core::{
    AbiEvent, AbiParam, AbiType, ContractEvent, DecodeError, RawLog, StreamError,
};
use chainbind_evm::decode::decode_event_log;
use chainbind_stream::iter::EventIterator;
use chainbind_stream::query::LogQuery;
use chainbind_stream::source::LogFeed;
use chainbind_stream::static_source::StaticLogSource;
use chainbind_stream::watch::spawn_watch;
use std::time::Duration;
use tokio::sync::mpsc;

const PRICE_TOPIC: &str = "0x1826f74860bd5ff97bcab2245acae00a635acaa3dbc72e5c68b83ff34b1fac00";
const ORACLE: &str = "0x30fb915258d844e9dc420b2c3aa97420aea16db7";

#[derive(Debug, Clone, PartialEq)]
struct PriceUpdated {
    price: u128,
    timestamp: u128,
    raw: RawLog,
}

fn price_event_abi() -> AbiEvent {
    AbiEvent::new(
        "GGPPriceUpdated",
        vec![
            AbiParam::indexed("price", AbiType::Uint(256)),
            AbiParam::new("timestamp", AbiType::Uint(256)),
        ],
    )
}

impl ContractEvent for PriceUpdated {
    const NAME: &'static str = "GGPPriceUpdated";
    const SIGNATURE: &'static str = "GGPPriceUpdated(uint256,uint256)";
    const SIGNATURE_TOPIC: &'static str = PRICE_TOPIC;

    fn decode(raw: &RawLog) -> Result<Self, DecodeError> {
        let fields = decode_event_log(&price_event_abi(), raw)?;
        let price = fields[0].1.as_u128().ok_or(DecodeError::MissingField {
            field: "price".into(),
        })?;
        let timestamp = fields[1].1.as_u128().ok_or(DecodeError::MissingField {
            field: "timestamp".into(),
        })?;
        Ok(Self {
            price,
            timestamp,
            raw: raw.clone(),
        })
    }

    fn raw(&self) -> &RawLog {
        &self.raw
    }
}

fn uint_word(v: u64) -> Vec<u8> {
    let mut word = vec![0u8; 32];
    word[24..].copy_from_slice(&v.to_be_bytes());
    word
}

fn price_log(price: u64, timestamp: u64, block: u64) -> RawLog {
    RawLog {
        address: ORACLE.into(),
        topics: vec![
            PRICE_TOPIC.into(),
            format!("0x{}", hex::encode(uint_word(price))),
        ],
        data: uint_word(timestamp),
        block_number: block,
        block_hash: "0x01".into(),
        tx_hash: format!("0xtx{block}"),
        tx_index: 0,
        log_index: 0,
        removed: false,
    }
}

fn malformed_log(block: u64) -> RawLog {
    let mut log = price_log(0, 0, block);
    log.data.truncate(5); // not a whole 32-byte word
    log
}

// ─── Iterator ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn iterator_serves_records_in_order_then_exhausts() {
    let source = StaticLogSource::new(vec![
        price_log(100, 1000, 10),
        price_log(105, 1050, 11),
    ]);
    let query = LogQuery::event(ORACLE, PRICE_TOPIC);
    let mut it = EventIterator::<PriceUpdated>::open(&source, query)
        .await
        .unwrap();

    assert!(it.advance().await);
    let first = it.current().unwrap();
    assert_eq!((first.price, first.timestamp), (100, 1000));

    assert!(it.advance().await);
    let second = it.current().unwrap();
    assert_eq!((second.price, second.timestamp), (105, 1050));

    assert!(!it.advance().await);
    assert!(it.error().is_none());
    assert!(it.is_exhausted());

    // Exhaustion is terminal
    assert!(!it.advance().await);
}

#[tokio::test]
async fn iterator_decode_failure_is_sticky() {
    let (handle, feed) = LogFeed::channel(8);
    handle.send(price_log(100, 1000, 1)).await;
    handle.send(malformed_log(2)).await;
    handle.send(price_log(105, 1050, 3)).await;

    let mut it = EventIterator::<PriceUpdated>::from_feed(feed);
    assert!(it.advance().await);

    assert!(!it.advance().await);
    assert!(matches!(it.error(), Some(StreamError::Decode(_))));

    // Later calls never succeed again, even though a good record is still
    // buffered, and the stored error is unchanged.
    assert!(!it.advance().await);
    assert!(!it.advance().await);
    assert!(matches!(it.error(), Some(StreamError::Decode(_))));
    assert!(!it.is_exhausted());

    drop(handle);
}

#[tokio::test]
async fn iterator_reports_error_after_backlog_consumed() {
    let (handle, feed) = LogFeed::channel(8);
    handle.send(price_log(100, 1000, 1)).await;

    let mut it = EventIterator::<PriceUpdated>::from_feed(feed);
    assert!(it.advance().await);

    handle.finish(Err(StreamError::Subscription {
        reason: "backend gone".into(),
    }));

    assert!(!it.advance().await);
    assert!(matches!(
        it.error(),
        Some(StreamError::Subscription { .. })
    ));
    assert!(!it.advance().await);
}

#[tokio::test]
async fn iterator_drains_backlog_after_clean_completion() {
    let (handle, feed) = LogFeed::channel(8);
    handle.send(price_log(100, 1000, 1)).await;
    handle.send(price_log(105, 1050, 2)).await;
    handle.finish(Ok(()));

    let mut it = EventIterator::<PriceUpdated>::from_feed(feed);
    assert!(it.advance().await);
    assert!(it.advance().await);
    assert_eq!(it.current().unwrap().price, 105);
    assert!(!it.advance().await);
    assert!(it.error().is_none());
    assert!(it.is_exhausted());
}

#[tokio::test]
async fn iterator_close_releases_feed_and_serves_buffered() {
    let (handle, feed) = LogFeed::channel(8);
    handle.send(price_log(100, 1000, 1)).await;

    let mut it = EventIterator::<PriceUpdated>::from_feed(feed);
    it.close();
    it.close(); // idempotent

    // Producer observes the release
    assert!(!handle.send(price_log(105, 1050, 2)).await);

    // Whatever was already buffered is still served, then exhaustion
    assert!(it.advance().await);
    assert!(!it.advance().await);
    assert!(it.error().is_none());
}

#[tokio::test]
async fn iterator_filters_by_indexed_value() {
    let source = StaticLogSource::new(vec![
        price_log(100, 1000, 1),
        price_log(105, 1050, 2),
        price_log(100, 1100, 3),
    ]);
    let query = LogQuery::event(ORACLE, PRICE_TOPIC)
        .with_topic_filter(0, vec![format!("0x{}", hex::encode(uint_word(100)))]);
    let mut it = EventIterator::<PriceUpdated>::open(&source, query)
        .await
        .unwrap();

    let mut timestamps = Vec::new();
    while it.advance().await {
        timestamps.push(it.current().unwrap().timestamp);
    }
    assert_eq!(timestamps, vec![1000, 1100]);
    assert!(it.error().is_none());
}

// ─── Watch ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn watch_cancel_before_any_record() {
    let (handle, feed) = LogFeed::channel(8);
    let (sink, mut rx) = mpsc::channel::<PriceUpdated>(8);

    let mut watch = spawn_watch(feed, sink);
    watch.cancel();
    assert!(watch.join().await.is_ok());

    // Nothing was delivered
    assert!(rx.recv().await.is_none());
    drop(handle);
}

#[tokio::test]
async fn watch_forwards_until_clean_completion() {
    let (handle, feed) = LogFeed::channel(8);
    handle.send(price_log(100, 1000, 1)).await;
    handle.send(price_log(105, 1050, 2)).await;
    handle.finish(Ok(()));

    let (sink, mut rx) = mpsc::channel::<PriceUpdated>(8);
    let watch = spawn_watch(feed, sink);

    assert_eq!(rx.recv().await.unwrap().price, 100);
    assert_eq!(rx.recv().await.unwrap().price, 105);
    assert!(rx.recv().await.is_none());
    assert!(watch.join().await.is_ok());
}

#[tokio::test]
async fn watch_decode_error_stops_task() {
    let (handle, feed) = LogFeed::channel(8);
    handle.send(malformed_log(1)).await;

    let (sink, mut rx) = mpsc::channel::<PriceUpdated>(8);
    let watch = spawn_watch(feed, sink);

    let outcome = watch.join().await;
    assert!(matches!(outcome, Err(StreamError::Decode(_))));
    assert!(rx.recv().await.is_none());
    drop(handle);
}

#[tokio::test]
async fn watch_blocked_sink_abandons_delivery_on_error() {
    let (handle, feed) = LogFeed::channel(8);
    handle.send(price_log(100, 1000, 1)).await;
    handle.send(price_log(105, 1050, 2)).await;

    // Capacity-1 sink that is never read: the first event fills it, the
    // second delivery blocks.
    let (sink, mut rx) = mpsc::channel::<PriceUpdated>(1);
    let watch = spawn_watch(feed, sink);
    tokio::time::sleep(Duration::from_millis(50)).await;

    handle.finish(Err(StreamError::Subscription {
        reason: "backend gone".into(),
    }));

    let outcome = watch.join().await;
    assert!(matches!(outcome, Err(StreamError::Subscription { .. })));

    // Exactly the first event was delivered; the blocked one was abandoned
    assert_eq!(rx.recv().await.unwrap().price, 100);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn watch_blocked_sink_abandons_delivery_on_cancel() {
    let (handle, feed) = LogFeed::channel(8);
    handle.send(price_log(100, 1000, 1)).await;
    handle.send(price_log(105, 1050, 2)).await;

    let (sink, mut rx) = mpsc::channel::<PriceUpdated>(1);
    let mut watch = spawn_watch(feed, sink);
    tokio::time::sleep(Duration::from_millis(50)).await;

    watch.cancel();
    assert!(watch.join().await.is_ok());

    assert_eq!(rx.recv().await.unwrap().price, 100);
    assert!(rx.recv().await.is_none());
    drop(handle);
}

#[tokio::test]
async fn watch_through_source_applies_query() {
    let source = StaticLogSource::new(vec![
        price_log(100, 1000, 5),
        price_log(105, 1050, 50),
    ]);
    let query = LogQuery::event(ORACLE, PRICE_TOPIC).with_blocks(0, Some(10));
    let (sink, mut rx) = mpsc::channel::<PriceUpdated>(8);

    let watch = chainbind_stream::watch::watch(&source, query, sink)
        .await
        .unwrap();

    assert_eq!(rx.recv().await.unwrap().timestamp, 1000);
    assert!(rx.recv().await.is_none());
    assert!(watch.join().await.is_ok());
}
