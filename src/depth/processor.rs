//! Book update processor: feed messages in, book mutations out.
//!
//! One [`BookUpdateProcessor`] serves one subscription. It owns the four
//! books (by-level and by-order, bid and ask), latches the discipline the
//! feed announces, checks per-side sequence continuity and dispatches each
//! table command to the right book.
//!
//! Nothing here returns an error to the caller. Rejected mutations, stale
//! updates, unknown commands and gaps are logged and counted, and the
//! processor stays ready for the next message.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::config::{Config, DEFAULT_WINDOW_SIZE};
use crate::feed::resync::{NoopResync, ResyncHandler};
use crate::types::{Discipline, FeedMessage, InitPaintMsg, Side, TableCommand, TableRow, UpdateMsg};

use super::book::DepthBook;
use super::sequence::{SequenceCheck, SequenceTracker};

/// Counters kept by a processor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    /// Table commands applied to a book
    pub applied: u64,
    /// Mutations the book rejected (position gap, missing position, ...)
    pub rejected: u64,
    /// Commands with an unrecognized name
    pub unknown_commands: u64,
    /// Updates dropped as stale or duplicate
    pub stale: u64,
    /// Forward sequence gaps seen
    pub gaps: u64,
    /// Resync requests issued
    pub resync_requests: u64,
    /// Messages dropped for lack of (or conflicting) discipline
    pub dropped: u64,
    /// Initial paints completed
    pub init_paints: u64,
}

/// Books and sequence trackers of one discipline
#[derive(Debug)]
struct DisciplineState {
    books: [Arc<DepthBook>; 2],
    trackers: [SequenceTracker; 2],
}

impl DisciplineState {
    fn new(discipline: Discipline, window_size: usize) -> Self {
        Self {
            books: Side::ALL.map(|side| Arc::new(DepthBook::new(discipline, side, window_size))),
            trackers: [SequenceTracker::new(), SequenceTracker::new()],
        }
    }
}

/// Feed-driven writer for one subscription's books.
///
/// Both disciplines' books are allocated up front; only the one the feed
/// announces is ever populated. Readers obtain `Arc<DepthBook>` handles via
/// [`book`](Self::book) and read them concurrently with processing.
///
/// # Example
///
/// ```rust
/// use market_depth::depth::BookUpdateProcessor;
/// use market_depth::types::{Discipline, FeedMessage, Side, TableRow, UpdateMsg};
/// use market_depth::Config;
///
/// let mut processor = BookUpdateProcessor::new("IBM US Equity", Config::new());
///
/// let update = UpdateMsg::new(Side::Bid, TableRow::new("ADD", 1).with_price(101.5).with_size(200))
///     .with_discipline(Discipline::ByLevel)
///     .with_sequence(1);
/// processor.process(&FeedMessage::Update(update));
///
/// let bids = processor.book(Discipline::ByLevel, Side::Bid);
/// assert_eq!(bids.get(0).map(|e| e.size()), Some(200));
/// ```
#[derive(Debug)]
pub struct BookUpdateProcessor {
    topic: String,
    config: Config,
    discipline: Option<Discipline>,
    states: [DisciplineState; 2],
    painting: bool,
    painted: bool,
    stats: ProcessorStats,
    resync: Arc<dyn ResyncHandler>,
    /// Sides with a resync requested but not yet sent to the handler
    pending_resync: Vec<Side>,
}

impl BookUpdateProcessor {
    /// Create a processor that discards resync requests
    ///
    /// An invalid configuration falls back to the default window size.
    pub fn new(topic: impl Into<String>, config: Config) -> Self {
        let topic = topic.into();
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(topic = %topic, error = %e, "Invalid config, using default window size");
                config.with_window_size(DEFAULT_WINDOW_SIZE)
            }
        };
        let window_size = config.window_size();
        Self {
            topic,
            discipline: config.discipline(),
            config,
            states: Discipline::ALL.map(|d| DisciplineState::new(d, window_size)),
            painting: false,
            painted: false,
            stats: ProcessorStats::default(),
            resync: Arc::new(NoopResync),
            pending_resync: Vec::new(),
        }
    }

    /// Route resync requests to `handler`
    #[must_use]
    pub fn with_resync(mut self, handler: Arc<dyn ResyncHandler>) -> Self {
        self.resync = handler;
        self
    }

    /// Subscription topic
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Active discipline, once known
    pub fn discipline(&self) -> Option<Discipline> {
        self.discipline
    }

    /// Book for a discipline and side
    pub fn book(&self, discipline: Discipline, side: Side) -> Arc<DepthBook> {
        Arc::clone(&self.states[discipline.index()].books[side.index()])
    }

    /// Book of the active discipline for a side
    pub fn active_book(&self, side: Side) -> Option<Arc<DepthBook>> {
        self.discipline.map(|d| self.book(d, side))
    }

    /// Sequence tracker for a discipline and side
    pub fn tracker(&self, discipline: Discipline, side: Side) -> &SequenceTracker {
        &self.states[discipline.index()].trackers[side.index()]
    }

    /// Counters
    pub fn stats(&self) -> ProcessorStats {
        self.stats
    }

    /// Whether an initial paint has completed
    pub fn is_painted(&self) -> bool {
        self.painted
    }

    /// Whether the books should be repainted: never painted, or a side of
    /// the active discipline has an open gap
    pub fn needs_resync(&self) -> bool {
        if !self.painted {
            return true;
        }
        match self.discipline {
            Some(d) => self.states[d.index()]
                .trackers
                .iter()
                .any(|t| t.gap_detected() || t.resubscribed()),
            None => true,
        }
    }

    /// Apply one feed message, then send any resync it raised
    pub fn process(&mut self, message: &FeedMessage) {
        self.apply(message);
        for side in self.take_resync_requests() {
            send_resync(self.resync.as_ref(), &self.topic, side);
        }
    }

    /// Apply one feed message, queueing resync requests instead of sending
    /// them
    pub(crate) fn apply(&mut self, message: &FeedMessage) {
        match message {
            FeedMessage::Update(update) => self.process_update(update),
            FeedMessage::InitPaint(paint) => self.process_init_paint(paint),
        }
    }

    /// Drain the queued resync requests
    pub(crate) fn take_resync_requests(&mut self) -> Vec<Side> {
        std::mem::take(&mut self.pending_resync)
    }

    /// Latch or validate the discipline a message announces
    fn resolve_discipline(&mut self, announced: Option<Discipline>) -> Option<Discipline> {
        match (self.discipline, announced) {
            (Some(active), Some(announced)) if active != announced => {
                warn!(
                    topic = %self.topic,
                    %active,
                    %announced,
                    "Dropping message for inactive discipline"
                );
                None
            }
            (Some(active), _) => Some(active),
            (None, Some(announced)) => {
                info!(topic = %self.topic, discipline = %announced, "Book discipline latched");
                self.discipline = Some(announced);
                Some(announced)
            }
            (None, None) => {
                warn!(topic = %self.topic, "Dropping message received before book discipline is known");
                None
            }
        }
    }

    fn process_update(&mut self, update: &UpdateMsg) {
        let Some(discipline) = self.resolve_discipline(update.discipline) else {
            self.stats.dropped += 1;
            return;
        };
        let side = update.side;
        let tracker = &mut self.states[discipline.index()].trackers[side.index()];

        match tracker.observe(update) {
            SequenceCheck::InOrder => {}
            SequenceCheck::Retransmitted { last } => {
                if last {
                    debug!(topic = %self.topic, %side, "Retransmission complete");
                } else {
                    trace!(topic = %self.topic, %side, "Retransmitted update");
                }
            }
            SequenceCheck::Stale { last, got } => {
                warn!(
                    topic = %self.topic,
                    %side,
                    last,
                    got,
                    "Out-of-order update dropped"
                );
                self.stats.stale += 1;
                return;
            }
            SequenceCheck::Gap {
                expected,
                got,
                suppressed,
            } => {
                self.stats.gaps += 1;
                if suppressed {
                    debug!(topic = %self.topic, %side, expected, got, "Sequence gap already reported");
                } else {
                    warn!(topic = %self.topic, %side, expected, got, "Sequence gap detected");
                    if self.config.resubscribe_on_gap() {
                        tracker.mark_resubscribed();
                        self.request_resync(side);
                    }
                }
            }
        }

        self.apply_row(discipline, side, &update.row);
    }

    fn request_resync(&mut self, side: Side) {
        self.stats.resync_requests += 1;
        self.pending_resync.push(side);
    }

    fn process_init_paint(&mut self, paint: &InitPaintMsg) {
        let Some(discipline) = self.resolve_discipline(Some(paint.discipline)) else {
            self.stats.dropped += 1;
            return;
        };
        let state = &self.states[discipline.index()];

        if paint.fragment.is_first() {
            if self.painting {
                debug!(topic = %self.topic, "Initial paint restarted before previous one ended");
            }
            let window_size = match paint.window_size {
                Some(0) => {
                    warn!(topic = %self.topic, "Ignoring zero window size in initial paint");
                    None
                }
                other => other,
            };
            let book_type = paint
                .book_type
                .clone()
                .unwrap_or_else(|| discipline.as_str().to_string());

            for book in &state.books {
                if let Some(window_size) = window_size {
                    book.set_window_size(window_size);
                }
                book.set_book_type(book_type.as_str());
                book.clear_all();
            }
            self.painting = true;
            debug!(
                topic = %self.topic,
                %discipline,
                window_size = ?window_size,
                book_type = %book_type,
                "Initial paint started"
            );
        } else if !self.painting {
            warn!(
                topic = %self.topic,
                fragment = ?paint.fragment,
                "Initial paint fragment without a start fragment"
            );
        }
        let in_paint = self.painting;

        for side in [Side::Ask, Side::Bid] {
            for row in paint.table(side) {
                self.apply_row(discipline, side, row);
            }
        }

        if paint.fragment.is_last() && !in_paint {
            debug!(topic = %self.topic, "Stray end fragment; books still need a full paint");
        } else if paint.fragment.is_last() {
            for tracker in &mut self.states[discipline.index()].trackers {
                tracker.reset();
            }
            self.painting = false;
            self.painted = true;
            self.stats.init_paints += 1;
            info!(
                topic = %self.topic,
                %discipline,
                bids = self.book(discipline, Side::Bid).len(),
                asks = self.book(discipline, Side::Ask).len(),
                "Initial paint complete"
            );
        }
    }

    fn apply_row(&mut self, discipline: Discipline, side: Side, row: &TableRow) {
        let book = &self.states[discipline.index()].books[side.index()];
        let pos = row.book_position();

        let result = match &row.command {
            TableCommand::ClearAll => {
                book.clear_all();
                Ok(())
            }
            TableCommand::DeleteAll => {
                book.delete_all();
                Ok(())
            }
            TableCommand::DeleteSide => {
                book.delete_side();
                Ok(())
            }
            TableCommand::Delete => {
                book.delete(pos);
                Ok(())
            }
            TableCommand::DeleteBetterOrEqual => {
                book.delete_better_or_equal(pos);
                Ok(())
            }
            TableCommand::ReplaceClear => book.replace_clear(pos),
            TableCommand::Add => book.add(pos, row.to_entry()),
            TableCommand::Modify => book.modify(pos, row.to_entry()),
            TableCommand::Replace => book.replace(pos, row.to_entry()),
            TableCommand::ReplaceByBroker => book.replace_by_broker(pos, row.to_entry()),
            TableCommand::Execute => book.execute(pos, row.to_entry()),
            TableCommand::Unknown(name) => {
                warn!(topic = %self.topic, %side, command = %name, "Unknown table command ignored");
                self.stats.unknown_commands += 1;
                return;
            }
        };

        match result {
            Ok(()) => {
                trace!(topic = %self.topic, %side, command = %row.command, pos, "Applied");
                self.stats.applied += 1;
            }
            Err(e) => {
                warn!(
                    topic = %self.topic,
                    %side,
                    command = %row.command,
                    pos,
                    error = %e,
                    "Book mutation rejected"
                );
                self.stats.rejected += 1;
            }
        }
    }
}

/// Hand one resync request to `handler`, logging the outcome
pub(crate) fn send_resync(handler: &dyn ResyncHandler, topic: &str, side: Side) {
    match handler.request_resync(topic, side) {
        Ok(()) => info!(topic, %side, "Resync requested"),
        Err(e) => warn!(topic, %side, error = %e, "Resync request failed"),
    }
}
