//! Replay a recorded market-depth feed and print the resulting books
//!
//! Usage:
//!   cargo run --example depth_replay [path/to/feed.jsonl]
//!
//! With no path the bundled `demos/sample_feed.jsonl` is replayed.
//!
//! Optional:
//!   MARKET_DEPTH_WINDOW_SIZE=20  # Depth before the first initial paint
//!   RUST_LOG=market_depth=debug  # More processor output

use std::sync::Arc;

use market_depth::depth::{BookSnapshot, DepthManager};
use market_depth::feed::{decode_lines, spawn_feed, ChannelResync};
use market_depth::types::Side;
use market_depth::Config;
use tokio::sync::mpsc;

const SAMPLE_FEED: &str = include_str!("sample_feed.jsonl");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("market_depth=info".parse()?),
        )
        .init();

    let feed = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE_FEED.to_string(),
    };

    let config = Config::from_env()?;
    let (resync, mut resync_requests) = ChannelResync::new();
    let manager = Arc::new(DepthManager::new(config).with_resync(Arc::new(resync)));

    // Stand-in for the session layer: just report what it would resubscribe
    let resync_task = tokio::spawn(async move {
        while let Some(request) = resync_requests.recv().await {
            println!("-> resubscribe {} ({} side gap)", request.topic, request.side);
        }
    });

    let (tx, rx) = mpsc::channel(256);
    let feed_task = spawn_feed(rx, Arc::clone(&manager));
    for envelope in decode_lines(&feed) {
        tx.send(envelope).await?;
    }
    drop(tx);

    let processed = feed_task.await?;
    println!("Replayed {processed} messages\n");

    let mut topics = manager.topics();
    topics.sort();
    for topic in &topics {
        let (Some(bids), Some(asks)) = (
            manager.snapshot(topic, Side::Bid),
            manager.snapshot(topic, Side::Ask),
        ) else {
            println!("{topic}: no book");
            continue;
        };
        print_book(topic, &bids, &asks);
        if let Some(stats) = manager.stats(topic) {
            println!("{stats:?}\n");
        }
    }

    // Dropping the manager drops the last resync sender
    drop(manager);
    resync_task.await?;
    Ok(())
}

fn print_book(topic: &str, bids: &BookSnapshot, asks: &BookSnapshot) {
    println!("{topic} [{}] window {}", bids.book_type, bids.window_size);
    println!(
        "{:>4}  {:>12} {:>8} {:>6}  |  {:<6} {:>8} {:>12}",
        "pos", "bid time", "size", "price", "price", "size", "ask time"
    );

    let rows = bids.len().max(asks.len());
    for pos in 0..rows {
        let bid = bids
            .get(pos)
            .map(|e| format!("{:>12} {:>8} {:>6.2}", e.time(), e.size(), e.price()))
            .unwrap_or_else(|| format!("{:>28}", "-"));
        let ask = asks
            .get(pos)
            .map(|e| format!("{:>6.2} {:>8} {:>12}", e.price(), e.size(), e.time()))
            .unwrap_or_else(|| format!("{:<28}", "-"));
        println!("{:>4}  {bid}  |  {ask}", pos + 1);
    }
}
