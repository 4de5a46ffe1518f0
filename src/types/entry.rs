//! Book entry value type.

use serde::{Deserialize, Serialize};

use super::{Price, Size};

/// One row of a depth book: a price level or a single resting order.
///
/// Entries are never mutated after construction; the book replaces them
/// wholesale. A default entry is an invalid placeholder that readers treat
/// as "no entry".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookEntry {
    /// Broker code (empty for a by-level book)
    broker: String,
    /// Price of the level or order
    price: Price,
    /// Time of the last update, `HH:MM:SS.mmm`
    time: String,
    /// Number of orders at the level (0 for a by-order book)
    number_of_orders: i32,
    /// Size of the level or order
    size: Size,
    /// False for placeholders
    is_valid: bool,
}

impl BookEntry {
    /// Create a valid entry from feed data
    #[must_use]
    pub fn new(
        broker: impl Into<String>,
        price: Price,
        time: impl Into<String>,
        number_of_orders: i32,
        size: Size,
    ) -> Self {
        Self {
            broker: broker.into(),
            price,
            time: time.into(),
            number_of_orders,
            size,
            is_valid: true,
        }
    }

    /// Create a valid by-level entry
    #[must_use]
    pub fn level(price: Price, size: Size, number_of_orders: i32, time: impl Into<String>) -> Self {
        Self::new("", price, time, number_of_orders, size)
    }

    /// Create a valid by-order entry
    #[must_use]
    pub fn order(broker: impl Into<String>, price: Price, size: Size, time: impl Into<String>) -> Self {
        Self::new(broker, price, time, 0, size)
    }

    /// Broker code
    #[must_use]
    pub fn broker(&self) -> &str {
        &self.broker
    }

    /// Price
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Time of the last update
    #[must_use]
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Number of orders at the level
    #[must_use]
    pub const fn number_of_orders(&self) -> i32 {
        self.number_of_orders
    }

    /// Size
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Whether the entry carries feed data
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }
}

/// Timestamp as delivered by the feed.
///
/// Some feeds send a preformatted time of day, others send milliseconds
/// since midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedTime {
    /// Milliseconds since midnight
    MillisOfDay(u64),
    /// Already formatted time of day
    Text(String),
}

impl FeedTime {
    /// Render as `HH:MM:SS.mmm`
    #[must_use]
    pub fn format(&self) -> String {
        match self {
            FeedTime::Text(text) => text.clone(),
            FeedTime::MillisOfDay(ms) => format_millis_of_day(*ms),
        }
    }
}

/// Format milliseconds since midnight as `HH:MM:SS.mmm`.
///
/// Hours wrap at 24.
#[must_use]
pub fn format_millis_of_day(ms: u64) -> String {
    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = (total_secs / 3600) % 24;
    format!("{hours:02}:{mins:02}:{secs:02}.{millis:03}")
}
