//! Resubscription sinks.
//!
//! The processor never re-establishes a feed itself. On an unrecoverable
//! sequence gap it hands a [`ResyncRequest`] to a [`ResyncHandler`]; the
//! session layer behind the handler resubscribes, and the fresh initial
//! paint repairs the book.

use std::fmt;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::Error;
use crate::types::Side;

/// Request to resubscribe a topic
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResyncRequest {
    /// Subscription topic
    pub topic: String,
    /// Side whose sequence broke
    pub side: Side,
}

/// Receiver of resync requests
///
/// [`DepthManager`](crate::depth::DepthManager) calls the handler after
/// releasing its locks, so an implementation may call back into the manager.
/// A standalone processor calls it at the end of
/// [`process`](crate::depth::BookUpdateProcessor::process).
pub trait ResyncHandler: Send + Sync + fmt::Debug {
    /// Ask the session layer to resubscribe `topic`
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be delivered.
    fn request_resync(&self, topic: &str, side: Side) -> Result<(), Error>;
}

/// Handler that drops every request
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResync;

impl ResyncHandler for NoopResync {
    fn request_resync(&self, _topic: &str, _side: Side) -> Result<(), Error> {
        Ok(())
    }
}

/// Handler that forwards requests over a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelResync {
    tx: mpsc::UnboundedSender<ResyncRequest>,
}

impl ChannelResync {
    /// Create a handler and the receiver the session layer should drain
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ResyncRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ResyncHandler for ChannelResync {
    fn request_resync(&self, topic: &str, side: Side) -> Result<(), Error> {
        self.tx
            .send(ResyncRequest {
                topic: topic.to_string(),
                side,
            })
            .map_err(|_| Error::ResyncClosed {
                topic: topic.to_string(),
                side,
            })
    }
}

/// Handler that records requests in memory (replays and tests)
#[derive(Debug, Default)]
pub struct RecordingResync {
    requests: Mutex<Vec<ResyncRequest>>,
}

impl RecordingResync {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests recorded so far
    pub fn requests(&self) -> Vec<ResyncRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests recorded so far
    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }
}

impl ResyncHandler for RecordingResync {
    fn request_resync(&self, topic: &str, side: Side) -> Result<(), Error> {
        self.requests.lock().push(ResyncRequest {
            topic: topic.to_string(),
            side,
        });
        Ok(())
    }
}
