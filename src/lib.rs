//! # market-depth
//!
//! A bounded-depth order-book cache for market-depth subscriptions.
//!
//! ## Features
//!
//! - **By-level and by-order books** - Position-indexed rows per side, bounded
//!   by a window size
//! - **Table commands** - ADD, DEL, MOD, REPLACE, EXEC, DELBETTER and the rest,
//!   applied exactly as the feed addresses them
//! - **Sequence tracking** - Per-side gap, stale-update and retransmission
//!   handling, with resubscription on unrecoverable gaps
//! - **Concurrent reads** - One writer per subscription, any number of readers
//!   with consistent snapshots
//!
//! ## Quick Start
//!
//! ```rust
//! use market_depth::depth::DepthManager;
//! use market_depth::types::{Discipline, FeedEnvelope, InitPaintMsg, Side, TableRow, UpdateMsg};
//! use market_depth::Config;
//!
//! let manager = DepthManager::new(Config::new());
//!
//! // Initial paint: full book
//! let paint = InitPaintMsg::new(Discipline::ByLevel)
//!     .with_window_size(10)
//!     .with_bids(vec![TableRow::new("ADD", 1).with_price(99.5).with_size(300).with_orders(3)])
//!     .with_asks(vec![TableRow::new("ADD", 1).with_price(100.0).with_size(200).with_orders(2)]);
//! manager.process(&FeedEnvelope::new("IBM US Equity", paint));
//!
//! // Incremental update: a better bid arrives at the top
//! let update = UpdateMsg::new(Side::Bid, TableRow::new("ADD", 1).with_price(99.75).with_size(100))
//!     .with_sequence(1);
//! manager.process(&FeedEnvelope::new("IBM US Equity", update));
//!
//! let bids = manager.book("IBM US Equity", Side::Bid).unwrap();
//! assert_eq!(bids.get(0).map(|e| e.price()), Some(99.75));
//! assert_eq!(bids.get(1).map(|e| e.price()), Some(99.5));
//! ```
//!
//! ## Positions
//!
//! The feed addresses rows by 1-based position, best first. Internally
//! positions are 0-based: wire position 1 is book position 0.
//!
//! ## Architecture
//!
//! - [`types`] - Book entries, table commands and feed message records
//! - [`depth`] - Depth books, sequence tracking, the update processor and manager
//! - [`feed`] - Async feed driver and resubscription sinks
//! - [`config`] - Processing configuration
//! - [`error`] - Error types for the crate

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod depth;
pub mod error;
pub mod feed;
pub mod types;

// Re-export main types at crate root for convenience
pub use config::Config;
pub use error::{BookError, Error};

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
