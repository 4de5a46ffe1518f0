//! Market-depth book cache.
//!
//! This module provides the positional depth books and the state machine
//! that keeps them in step with a market-depth feed:
//!
//! - [`DepthBook`] - bounded, position-indexed rows for one side
//! - [`SequenceTracker`] - per-side gap and retransmission tracking
//! - [`BookUpdateProcessor`] - applies feed messages to one subscription's books
//! - [`DepthManager`] - processors for many subscriptions
//!
//! # Example
//!
//! ```rust
//! use market_depth::depth::DepthBook;
//! use market_depth::types::{BookEntry, Discipline, Side};
//!
//! let book = DepthBook::new(Discipline::ByLevel, Side::Ask, 5);
//! book.add(0, BookEntry::level(101.0, 300, 2, "10:00:00.000")).unwrap();
//! book.add(0, BookEntry::level(100.5, 100, 1, "10:00:00.010")).unwrap();
//!
//! assert_eq!(book.best().map(|e| e.price()), Some(100.5));
//! assert_eq!(book.len(), 2);
//! ```

pub mod book;
pub mod manager;
pub mod processor;
pub mod sequence;

pub use book::{BookSnapshot, DepthBook};
pub use manager::DepthManager;
pub use processor::{BookUpdateProcessor, ProcessorStats};
pub use sequence::{SequenceCheck, SequenceState, SequenceTracker};
