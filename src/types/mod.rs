//! Domain types for the market-depth feed and the book cache.
//!
//! - [`entry`] - [`BookEntry`], one row of a book
//! - [`command`] - [`TableCommand`], the table mutation named by a feed message
//! - [`messages`] - Feed message records consumed by the processor

pub mod command;
pub mod entry;
pub mod messages;

use serde::{Deserialize, Serialize};

pub use command::TableCommand;
pub use entry::{BookEntry, FeedTime};
pub use messages::{FeedEnvelope, FeedMessage, Fragment, InitPaintMsg, TableRow, UpdateKind, UpdateMsg};

/// Price of a level or an order
pub type Price = f64;

/// Size (quantity) of a level or an order
pub type Size = i32;

/// Feed sequence number
pub type Sequence = u64;

/// Book side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bid (buy) side
    #[serde(alias = "BID")]
    Bid,
    /// Ask (offer) side
    #[serde(alias = "ASK", alias = "offer")]
    Ask,
}

impl Side {
    /// Both sides, bid first
    pub const ALL: [Side; 2] = [Side::Bid, Side::Ask];

    pub(crate) const fn index(self) -> usize {
        match self {
            Side::Bid => 0,
            Side::Ask => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Bid => f.write_str("bid"),
            Side::Ask => f.write_str("ask"),
        }
    }
}

/// Book discipline
///
/// A by-level book aggregates one row per price level with an order count;
/// a by-order book carries one row per resting order with its broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Discipline {
    /// Market by level (`MBL`)
    #[serde(rename = "MBL", alias = "MARKET_BY_LEVEL", alias = "by_level")]
    ByLevel,
    /// Market by order (`MBO`)
    #[serde(rename = "MBO", alias = "MARKET_BY_ORDER", alias = "by_order")]
    ByOrder,
}

impl Discipline {
    /// Both disciplines, by-level first
    pub const ALL: [Discipline; 2] = [Discipline::ByLevel, Discipline::ByOrder];

    /// Short wire label
    pub fn as_str(self) -> &'static str {
        match self {
            Discipline::ByLevel => "MBL",
            Discipline::ByOrder => "MBO",
        }
    }

    /// Parse a wire label, accepting the short and long forms
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "MBL" | "MARKET_BY_LEVEL" | "BY_LEVEL" => Some(Discipline::ByLevel),
            "MBO" | "MARKET_BY_ORDER" | "BY_ORDER" => Some(Discipline::ByOrder),
            _ => None,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Discipline::ByLevel => 0,
            Discipline::ByOrder => 1,
        }
    }
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
