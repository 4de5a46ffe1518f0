//! Depth manager for handling multiple subscriptions.
//!
//! This module provides [`DepthManager`], a thread-safe container of
//! [`BookUpdateProcessor`]s keyed by subscription topic.
//!
//! # Design
//!
//! The manager uses `parking_lot::RwLock` around the topic map and around
//! each processor. Processing a message takes the processor's write lock;
//! readers normally go straight to the `Arc<DepthBook>` handles, whose own
//! locks keep each read consistent.
//!
//! # Resync Tracking
//!
//! A topic needs a resync until its first initial paint completes, and again
//! whenever a side of its active discipline reports a sequence gap. Resync
//! requests raised while processing are sent to the handler after every
//! manager lock is released.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::Config;
use crate::feed::resync::{NoopResync, ResyncHandler};
use crate::types::{FeedEnvelope, FeedMessage, Side};

use super::book::{BookSnapshot, DepthBook};
use super::processor::{send_resync, BookUpdateProcessor, ProcessorStats};

/// Manager for multiple depth subscriptions.
///
/// # Thread Safety
///
/// The manager is safe to share across threads via `Arc<DepthManager>`.
///
/// # Example
///
/// ```rust
/// use market_depth::depth::DepthManager;
/// use market_depth::types::{Discipline, FeedEnvelope, InitPaintMsg, Side, TableRow};
/// use market_depth::Config;
///
/// let manager = DepthManager::new(Config::new());
///
/// let paint = InitPaintMsg::new(Discipline::ByLevel)
///     .with_window_size(5)
///     .with_bids(vec![TableRow::new("ADD", 1).with_price(99.5).with_size(10)]);
/// manager.process(&FeedEnvelope::new("IBM US Equity", paint));
///
/// let bids = manager.book("IBM US Equity", Side::Bid).unwrap();
/// assert_eq!(bids.get(0).map(|e| e.price()), Some(99.5));
/// ```
#[derive(Debug)]
pub struct DepthManager {
    config: Config,
    resync: Arc<dyn ResyncHandler>,
    /// Processors by topic
    processors: RwLock<FxHashMap<String, RwLock<BookUpdateProcessor>>>,
}

impl DepthManager {
    /// Create a manager that discards resync requests
    pub fn new(config: Config) -> Self {
        Self {
            config,
            resync: Arc::new(NoopResync),
            processors: RwLock::new(FxHashMap::default()),
        }
    }

    /// Route every processor's resync requests to `handler`
    ///
    /// Applies to topics added after this call.
    #[must_use]
    pub fn with_resync(mut self, handler: Arc<dyn ResyncHandler>) -> Self {
        self.resync = handler;
        self
    }

    /// Add a topic to track
    ///
    /// Creates an unpainted processor; a no-op if the topic is tracked.
    pub fn add_topic(&self, topic: impl Into<String>) {
        let topic = topic.into();
        let mut processors = self.processors.write();
        processors.entry(topic.clone()).or_insert_with(|| {
            debug!(topic = %topic, "Tracking depth topic");
            RwLock::new(
                BookUpdateProcessor::new(topic, self.config.clone()).with_resync(Arc::clone(&self.resync)),
            )
        });
    }

    /// Stop tracking a topic
    pub fn remove_topic(&self, topic: &str) {
        self.processors.write().remove(topic);
    }

    /// Whether a topic is tracked
    pub fn contains(&self, topic: &str) -> bool {
        self.processors.read().contains_key(topic)
    }

    /// Process a feed envelope
    ///
    /// Initial paints for untracked topics register the topic first.
    /// Returns `false` if the topic is not tracked and the message was an
    /// update.
    pub fn process(&self, envelope: &FeedEnvelope) -> bool {
        if !self.contains(&envelope.topic) {
            match envelope.message {
                FeedMessage::InitPaint(_) => self.add_topic(envelope.topic.as_str()),
                FeedMessage::Update(_) => {
                    debug!(topic = %envelope.topic, "Update for untracked topic ignored");
                    return false;
                }
            }
        }

        let requests = {
            let processors = self.processors.read();
            match processors.get(&envelope.topic) {
                Some(processor) => {
                    let mut processor = processor.write();
                    processor.apply(&envelope.message);
                    processor.take_resync_requests()
                }
                // Removed between the check and the lookup
                None => return false,
            }
        };

        // Locks released: the handler may call back into the manager
        for side in requests {
            send_resync(self.resync.as_ref(), &envelope.topic, side);
        }
        true
    }

    /// Active book for a topic and side
    pub fn book(&self, topic: &str, side: Side) -> Option<Arc<DepthBook>> {
        let processors = self.processors.read();
        processors.get(topic).and_then(|p| p.read().active_book(side))
    }

    /// Run `f` with shared access to a topic's processor
    pub fn with_processor<R>(&self, topic: &str, f: impl FnOnce(&BookUpdateProcessor) -> R) -> Option<R> {
        let processors = self.processors.read();
        processors.get(topic).map(|p| f(&p.read()))
    }

    /// Snapshot of a topic's active book for a side
    pub fn snapshot(&self, topic: &str, side: Side) -> Option<BookSnapshot> {
        self.book(topic, side).map(|book| book.snapshot())
    }

    /// Counters for a topic
    pub fn stats(&self, topic: &str) -> Option<ProcessorStats> {
        let processors = self.processors.read();
        processors.get(topic).map(|p| p.read().stats())
    }

    /// Get all topics that need a resync
    pub fn topics_needing_resync(&self) -> Vec<String> {
        let processors = self.processors.read();
        processors
            .iter()
            .filter(|(_, processor)| processor.read().needs_resync())
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    /// Stop tracking every topic
    pub fn clear(&self) {
        self.processors.write().clear();
    }

    /// Get number of tracked topics
    pub fn len(&self) -> usize {
        self.processors.read().len()
    }

    /// Check if the manager tracks no topics
    pub fn is_empty(&self) -> bool {
        self.processors.read().is_empty()
    }

    /// Get all tracked topics
    pub fn topics(&self) -> Vec<String> {
        self.processors.read().keys().cloned().collect()
    }
}

impl Default for DepthManager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::resync::RecordingResync;
    use crate::types::{Discipline, InitPaintMsg, TableRow, UpdateMsg};

    fn paint(topic: &str) -> FeedEnvelope {
        let msg = InitPaintMsg::new(Discipline::ByLevel)
            .with_window_size(5)
            .with_asks(vec![TableRow::new("ADD", 1).with_price(101.0).with_size(10)])
            .with_bids(vec![TableRow::new("ADD", 1).with_price(100.0).with_size(20)]);
        FeedEnvelope::new(topic, msg)
    }

    fn update(topic: &str, seq: u64) -> FeedEnvelope {
        let msg = UpdateMsg::new(Side::Bid, TableRow::new("ADD", 1).with_price(100.5).with_size(5))
            .with_sequence(seq);
        FeedEnvelope::new(topic, msg)
    }

    #[test]
    fn test_add_topic() {
        let manager = DepthManager::default();
        manager.add_topic("TEST");
        manager.add_topic("TEST");

        assert_eq!(manager.len(), 1);
        assert!(manager.contains("TEST"));
        // No discipline yet
        assert!(manager.book("TEST", Side::Bid).is_none());
    }

    #[test]
    fn test_paint_registers_topic() {
        let manager = DepthManager::default();
        assert!(manager.process(&paint("TEST")));

        assert_eq!(manager.topics(), vec!["TEST".to_string()]);
        let snapshot = manager.snapshot("TEST", Side::Ask).unwrap();
        assert_eq!(snapshot.get(0).map(|e| e.price()), Some(101.0));
        assert_eq!(manager.stats("TEST").unwrap().init_paints, 1);
    }

    #[test]
    fn test_with_processor() {
        let manager = DepthManager::default();
        manager.process(&paint("TEST"));

        let painted = manager.with_processor("TEST", |p| (p.discipline(), p.is_painted()));
        assert_eq!(painted, Some((Some(Discipline::ByLevel), true)));
        assert_eq!(manager.with_processor("OTHER", |p| p.is_painted()), None);
    }

    #[test]
    fn test_update_for_untracked_topic() {
        let manager = DepthManager::default();
        assert!(!manager.process(&update("TEST", 1)));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_updates_after_paint() {
        let manager = DepthManager::default();
        manager.process(&paint("TEST"));
        assert!(manager.process(&update("TEST", 1)));

        let bids = manager.book("TEST", Side::Bid).unwrap();
        assert_eq!(bids.len(), 2);
        assert_eq!(bids.get(0).map(|e| e.price()), Some(100.5));
    }

    #[test]
    fn test_topics_needing_resync() {
        let recorder = Arc::new(RecordingResync::new());
        let manager = DepthManager::default().with_resync(recorder.clone());
        manager.add_topic("TEST1");
        manager.process(&paint("TEST2"));

        let needing = manager.topics_needing_resync();
        assert_eq!(needing, vec!["TEST1".to_string()]);

        for seq in [1, 2, 5] {
            manager.process(&update("TEST2", seq));
        }
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.requests()[0].topic, "TEST2");

        let mut needing = manager.topics_needing_resync();
        needing.sort();
        assert_eq!(needing, vec!["TEST1".to_string(), "TEST2".to_string()]);

        // Repaint repairs it
        manager.process(&paint("TEST2"));
        assert_eq!(manager.topics_needing_resync(), vec!["TEST1".to_string()]);
    }

    /// Resync handler that registers a recovery topic on the manager
    #[derive(Debug, Default)]
    struct ReentrantResync {
        manager: parking_lot::Mutex<Option<Arc<DepthManager>>>,
    }

    impl ResyncHandler for ReentrantResync {
        fn request_resync(&self, topic: &str, _side: Side) -> Result<(), crate::Error> {
            if let Some(manager) = self.manager.lock().as_ref() {
                manager.add_topic(format!("{topic} RESYNC"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_resync_handler_can_call_back_into_manager() {
        let handler = Arc::new(ReentrantResync::default());
        let manager = Arc::new(DepthManager::default().with_resync(handler.clone()));
        *handler.manager.lock() = Some(Arc::clone(&manager));

        manager.process(&paint("TEST"));
        for seq in [1, 2, 5] {
            assert!(manager.process(&update("TEST", seq)));
        }

        assert!(manager.contains("TEST RESYNC"));
        assert_eq!(manager.stats("TEST").unwrap().resync_requests, 1);

        // Break the cycle
        handler.manager.lock().take();
    }

    #[test]
    fn test_remove_and_clear() {
        let manager = DepthManager::default();
        manager.process(&paint("TEST1"));
        manager.process(&paint("TEST2"));

        manager.remove_topic("TEST1");
        assert!(!manager.contains("TEST1"));
        assert_eq!(manager.len(), 1);

        manager.clear();
        assert!(manager.is_empty());
    }
}
