//! Tests for the async feed driver and the channel resync sink.

use std::sync::Arc;
use std::time::Duration;

use market_depth::depth::DepthManager;
use market_depth::feed::{spawn_feed, ChannelResync};
use market_depth::types::{Discipline, FeedEnvelope, InitPaintMsg, Side, TableRow, UpdateMsg};
use market_depth::Config;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn paint(topic: &str) -> FeedEnvelope {
    let msg = InitPaintMsg::new(Discipline::ByLevel)
        .with_window_size(5)
        .with_bids(vec![
            TableRow::new("ADD", 1).with_price(99.0).with_size(10),
            TableRow::new("ADD", 2).with_price(98.0).with_size(20),
        ]);
    FeedEnvelope::new(topic, msg)
}

fn bid(topic: &str, command: &str, position: u32, seq: u64) -> FeedEnvelope {
    let row = TableRow::new(command, position).with_price(99.5).with_size(5);
    FeedEnvelope::new(topic, UpdateMsg::new(Side::Bid, row).with_sequence(seq))
}

#[tokio::test]
async fn test_spawned_feed_applies_in_order() {
    let manager = Arc::new(DepthManager::new(Config::new()));
    let (tx, rx) = mpsc::channel(16);
    let handle = spawn_feed(rx, Arc::clone(&manager));

    tx.send(paint("IBM US Equity")).await.unwrap();
    tx.send(bid("IBM US Equity", "ADD", 1, 1)).await.unwrap();
    tx.send(bid("IBM US Equity", "DEL", 3, 2)).await.unwrap();
    tx.send(bid("MSFT US Equity", "ADD", 1, 1)).await.unwrap();
    drop(tx);

    let processed = timeout(Duration::from_secs(5), handle)
        .await
        .expect("feed task timed out")
        .unwrap();
    assert_eq!(processed, 3);

    let bids = manager.snapshot("IBM US Equity", Side::Bid).unwrap();
    let prices: Vec<f64> = bids.entries.iter().map(|e| e.price()).collect();
    assert_eq!(prices, vec![99.5, 99.0]);
    assert!(!manager.contains("MSFT US Equity"));
}

#[tokio::test]
async fn test_gap_reaches_resync_channel() {
    let (resync, mut requests) = ChannelResync::new();
    let manager = Arc::new(DepthManager::new(Config::new()).with_resync(Arc::new(resync)));
    let (tx, rx) = mpsc::channel(16);
    let handle = spawn_feed(rx, Arc::clone(&manager));

    tx.send(paint("IBM US Equity")).await.unwrap();
    for seq in [1, 2, 6, 7, 11] {
        tx.send(bid("IBM US Equity", "MOD", 1, seq)).await.unwrap();
    }

    let request = timeout(Duration::from_secs(5), requests.recv())
        .await
        .expect("no resync request")
        .unwrap();
    assert_eq!(request.topic, "IBM US Equity");
    assert_eq!(request.side, Side::Bid);

    drop(tx);
    handle.await.unwrap();

    // Latched: one request for the whole gap episode
    assert!(requests.try_recv().is_err());
    assert_eq!(manager.topics_needing_resync(), vec!["IBM US Equity".to_string()]);
    assert_eq!(manager.stats("IBM US Equity").unwrap().gaps, 2);
}

#[tokio::test]
async fn test_readers_alongside_feed() {
    let manager = Arc::new(DepthManager::new(Config::new()));
    manager.process(&paint("IBM US Equity"));
    let bids = manager.book("IBM US Equity", Side::Bid).unwrap();

    let (tx, rx) = mpsc::channel(64);
    let handle = spawn_feed(rx, Arc::clone(&manager));

    let reader = tokio::spawn(async move {
        for _ in 0..200 {
            let snapshot = bids.snapshot();
            assert!(snapshot.len() <= snapshot.window_size);
            tokio::task::yield_now().await;
        }
    });

    for seq in 1..=200u64 {
        let command = if seq % 2 == 0 { "DEL" } else { "ADD" };
        tx.send(bid("IBM US Equity", command, 1, seq)).await.unwrap();
    }
    drop(tx);

    reader.await.unwrap();
    assert_eq!(handle.await.unwrap(), 200);
    assert_eq!(manager.stats("IBM US Equity").unwrap().stale, 0);
}
