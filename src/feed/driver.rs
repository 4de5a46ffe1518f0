//! Feed consumer task.
//!
//! The depth cache expects a single writer applying messages in arrival
//! order. [`run_feed`] is that writer for any `Stream` of envelopes;
//! [`spawn_feed`] runs it on tokio, fed from an mpsc channel by whatever
//! session layer decodes the vendor feed.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::depth::DepthManager;
use crate::error::Error;
use crate::types::FeedEnvelope;

/// Decode one JSON feed envelope
///
/// # Errors
///
/// Returns [`Error::Json`] if the text is not a valid envelope.
pub fn parse_envelope(line: &str) -> Result<FeedEnvelope, Error> {
    Ok(serde_json::from_str(line)?)
}

/// Decode newline-delimited JSON envelopes, skipping blank lines, `#`
/// comments and undecodable lines (logged)
pub fn decode_lines(text: &str) -> impl Iterator<Item = FeedEnvelope> + '_ {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .filter_map(|(index, line)| match parse_envelope(line) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping undecodable feed line");
                None
            }
        })
}

/// Apply every envelope from `stream` to `manager`, in order, until the
/// stream ends
///
/// Returns the number of envelopes that reached a tracked topic.
pub async fn run_feed<S>(stream: S, manager: Arc<DepthManager>) -> usize
where
    S: Stream<Item = FeedEnvelope>,
{
    futures_util::pin_mut!(stream);

    let mut processed = 0;
    while let Some(envelope) = stream.next().await {
        if manager.process(&envelope) {
            processed += 1;
        }
    }

    info!(processed, topics = manager.len(), "Feed ended");
    processed
}

/// Spawn [`run_feed`] on the current tokio runtime, reading from `rx`
///
/// The task ends when every sender is dropped.
pub fn spawn_feed(rx: mpsc::Receiver<FeedEnvelope>, manager: Arc<DepthManager>) -> JoinHandle<usize> {
    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|envelope| (envelope, rx))
    });
    tokio::spawn(run_feed(stream, manager))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeedMessage, Side};

    #[test]
    fn test_parse_envelope() {
        let line = r#"{"topic": "T", "message": {"kind": "update", "side": "bid", "command": "DEL", "position": 1}}"#;
        let envelope = parse_envelope(line).unwrap();
        assert_eq!(envelope.topic, "T");
        match envelope.message {
            FeedMessage::Update(update) => assert_eq!(update.side, Side::Bid),
            _ => panic!("Expected Update"),
        }
    }

    #[test]
    fn test_parse_envelope_error() {
        assert!(matches!(parse_envelope("{\"topic\": 3}"), Err(Error::Json(_))));
    }

    #[test]
    fn test_decode_lines_skips_noise() {
        let text = r#"
# comment
{"topic": "T", "message": {"kind": "init_paint", "discipline": "MBL"}}
not json

{"topic": "T", "message": {"kind": "update", "side": "ask", "command": "CLEARALL"}}
"#;
        let envelopes: Vec<_> = decode_lines(text).collect();
        assert_eq!(envelopes.len(), 2);
    }

    #[test]
    fn test_run_feed() {
        let text = r#"
{"topic": "T", "message": {"kind": "init_paint", "discipline": "MBL", "window_size": 3}}
{"topic": "T", "message": {"kind": "update", "side": "ask", "command": "ADD", "position": 1, "price": 5.5}}
{"topic": "U", "message": {"kind": "update", "side": "ask", "command": "ADD", "position": 1, "price": 5.5}}
"#;
        let manager = Arc::new(DepthManager::default());
        let stream = futures_util::stream::iter(decode_lines(text).collect::<Vec<_>>());

        let processed = tokio_test::block_on(run_feed(stream, Arc::clone(&manager)));
        assert_eq!(processed, 2);
        assert_eq!(manager.book("T", Side::Ask).map(|b| b.len()), Some(1));
    }
}
