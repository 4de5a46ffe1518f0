//! Feed message records.
//!
//! These mirror what a market-depth subscription delivers once the vendor
//! session has decoded it: incremental table updates per side, and
//! (possibly fragmented) initial-paint snapshots carrying full ask and bid
//! tables. The JSON shape is what the replay tooling and tests use.

use serde::{Deserialize, Serialize};

use super::command::TableCommand;
use super::entry::{BookEntry, FeedTime};
use super::{Discipline, Price, Sequence, Side, Size};

/// Feed message tagged with the subscription topic it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEnvelope {
    /// Subscription topic (security)
    pub topic: String,
    /// Message payload
    pub message: FeedMessage,
}

impl FeedEnvelope {
    /// Wrap a message for a topic
    pub fn new(topic: impl Into<String>, message: impl Into<FeedMessage>) -> Self {
        Self {
            topic: topic.into(),
            message: message.into(),
        }
    }
}

/// Message received from a market-depth subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedMessage {
    /// Incremental update for one side
    Update(UpdateMsg),
    /// Initial paint (full book), possibly one fragment of several
    InitPaint(InitPaintMsg),
}

impl From<UpdateMsg> for FeedMessage {
    fn from(msg: UpdateMsg) -> Self {
        FeedMessage::Update(msg)
    }
}

impl From<InitPaintMsg> for FeedMessage {
    fn from(msg: InitPaintMsg) -> Self {
        FeedMessage::InitPaint(msg)
    }
}

/// Whether an update is live or part of a retransmission batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// Live update
    #[default]
    Normal,
    /// Replay of recent updates sent by the feed to repair a gap
    #[serde(alias = "retran")]
    Retransmission,
}

/// Message fragment position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fragment {
    /// Unfragmented message
    #[default]
    None,
    /// First of several fragments
    Start,
    /// Neither first nor last
    Intermediate,
    /// Last of several fragments
    End,
}

impl Fragment {
    /// Whether this fragment opens a message
    pub fn is_first(self) -> bool {
        matches!(self, Fragment::None | Fragment::Start)
    }

    /// Whether this fragment closes a message
    pub fn is_last(self) -> bool {
        matches!(self, Fragment::None | Fragment::End)
    }
}

/// One table row: a command, a 1-based position and the entry fields.
///
/// Every field but the command is optional on the wire. Missing quantities
/// default to zero, a missing broker or time to an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Table command
    #[serde(alias = "cmd")]
    pub command: TableCommand,
    /// 1-based position
    #[serde(default)]
    pub position: Option<u32>,
    /// Price
    #[serde(default)]
    pub price: Option<Price>,
    /// Size
    #[serde(default)]
    pub size: Option<Size>,
    /// Broker code (by-order books)
    #[serde(default)]
    pub broker: Option<String>,
    /// Order count (by-level books)
    #[serde(default)]
    pub number_of_orders: Option<i32>,
    /// Update time
    #[serde(default)]
    pub time: Option<FeedTime>,
}

impl TableRow {
    /// Create a row with only a command and a 1-based position
    pub fn new(command: impl Into<TableCommand>, position: u32) -> Self {
        Self {
            command: command.into(),
            position: Some(position),
            price: None,
            size: None,
            broker: None,
            number_of_orders: None,
            time: None,
        }
    }

    /// Set the price
    #[must_use]
    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the size
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the broker code
    #[must_use]
    pub fn with_broker(mut self, broker: impl Into<String>) -> Self {
        self.broker = Some(broker.into());
        self
    }

    /// Set the order count
    #[must_use]
    pub fn with_orders(mut self, number_of_orders: i32) -> Self {
        self.number_of_orders = Some(number_of_orders);
        self
    }

    /// Set the update time
    #[must_use]
    pub fn with_time(mut self, time: FeedTime) -> Self {
        self.time = Some(time);
        self
    }

    /// 0-based book position
    pub fn book_position(&self) -> usize {
        match self.position {
            Some(pos) if pos > 0 => (pos - 1) as usize,
            Some(pos) => pos as usize,
            None => 0,
        }
    }

    /// Build a book entry from the row's fields
    pub fn to_entry(&self) -> BookEntry {
        BookEntry::new(
            self.broker.clone().unwrap_or_default(),
            self.price.unwrap_or(0.0),
            self.time.as_ref().map(FeedTime::format).unwrap_or_default(),
            self.number_of_orders.unwrap_or(0),
            self.size.unwrap_or(0),
        )
    }
}

/// Incremental update for one side of the book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMsg {
    /// Book discipline, if the message announces it
    #[serde(default)]
    pub discipline: Option<Discipline>,
    /// Book side
    pub side: Side,
    /// Live or retransmitted
    #[serde(default)]
    pub update_kind: UpdateKind,
    /// Command, position and entry fields
    #[serde(flatten)]
    pub row: TableRow,
    /// Per-side sequence number
    #[serde(default)]
    pub sequence: Option<Sequence>,
    /// Set by the feed when it has itself detected a gap
    #[serde(default)]
    pub gap_detected: bool,
    /// Remaining updates in a multi-tick batch; zero marks the last one
    #[serde(default)]
    pub multi_tick_remaining: Option<u32>,
}

impl UpdateMsg {
    /// Create a live update for a side
    pub fn new(side: Side, row: TableRow) -> Self {
        Self {
            discipline: None,
            side,
            update_kind: UpdateKind::Normal,
            row,
            sequence: None,
            gap_detected: false,
            multi_tick_remaining: None,
        }
    }

    /// Announce the discipline
    #[must_use]
    pub fn with_discipline(mut self, discipline: Discipline) -> Self {
        self.discipline = Some(discipline);
        self
    }

    /// Set the sequence number
    #[must_use]
    pub fn with_sequence(mut self, sequence: Sequence) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Mark as part of a retransmission batch with `remaining` updates left
    #[must_use]
    pub fn retransmission(mut self, remaining: u32) -> Self {
        self.update_kind = UpdateKind::Retransmission;
        self.multi_tick_remaining = Some(remaining);
        self
    }

    /// Flag a feed-detected gap
    #[must_use]
    pub fn with_gap_detected(mut self) -> Self {
        self.gap_detected = true;
        self
    }
}

/// Initial paint of the whole book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitPaintMsg {
    /// Book discipline
    pub discipline: Discipline,
    /// Book type label echoed to readers
    #[serde(default)]
    pub book_type: Option<String>,
    /// Depth retained per side
    #[serde(default)]
    pub window_size: Option<usize>,
    /// Fragment position
    #[serde(default)]
    pub fragment: Fragment,
    /// Ask table rows, best first
    #[serde(default)]
    pub ask_table: Vec<TableRow>,
    /// Bid table rows, best first
    #[serde(default)]
    pub bid_table: Vec<TableRow>,
}

impl InitPaintMsg {
    /// Create an unfragmented, empty initial paint
    pub fn new(discipline: Discipline) -> Self {
        Self {
            discipline,
            book_type: None,
            window_size: None,
            fragment: Fragment::None,
            ask_table: Vec::new(),
            bid_table: Vec::new(),
        }
    }

    /// Set the window size
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = Some(window_size);
        self
    }

    /// Set the book type label
    #[must_use]
    pub fn with_book_type(mut self, book_type: impl Into<String>) -> Self {
        self.book_type = Some(book_type.into());
        self
    }

    /// Set the fragment position
    #[must_use]
    pub fn with_fragment(mut self, fragment: Fragment) -> Self {
        self.fragment = fragment;
        self
    }

    /// Set the ask table
    #[must_use]
    pub fn with_asks(mut self, rows: Vec<TableRow>) -> Self {
        self.ask_table = rows;
        self
    }

    /// Set the bid table
    #[must_use]
    pub fn with_bids(mut self, rows: Vec<TableRow>) -> Self {
        self.bid_table = rows;
        self
    }

    /// Rows of one side's table
    pub fn table(&self, side: Side) -> &[TableRow] {
        match side {
            Side::Bid => &self.bid_table,
            Side::Ask => &self.ask_table,
        }
    }
}
