//! Error types for the market-depth crate.
//!
//! Book mutations report a [`BookError`] when a precondition fails; the
//! update processor logs and absorbs those, so they never reach feed
//! consumers. The crate-level [`Error`] covers the surfaces that do return
//! errors: decoding feed records, configuration and the resync channel.

use thiserror::Error as ThisError;

use crate::types::Side;

/// The main error type for this crate
#[derive(Debug, ThisError)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The receiving end of the resync channel is gone
    #[error("Resync channel closed (topic {topic}, side {side})")]
    ResyncClosed {
        /// Topic whose resync could not be requested
        topic: String,
        /// Side that needed the resync
        side: Side,
    },
}

/// Rejected book mutation
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum BookError {
    /// Insert requested beyond one past the end of the book
    #[error("Position gap: cannot add at {pos}, book holds {len}")]
    PositionGap {
        /// Requested 0-based position
        pos: usize,
        /// Book length at the time of the request
        len: usize,
    },

    /// In-place mutation of a position the book does not hold
    #[error("Missing position: {pos} not in book of {len}")]
    MissingPosition {
        /// Requested 0-based position
        pos: usize,
        /// Book length at the time of the request
        len: usize,
    },

    /// Extending write at or past the window size
    #[error("Position {pos} is outside a window of {window_size}")]
    BeyondWindow {
        /// Requested 0-based position
        pos: usize,
        /// Window size of the book
        window_size: usize,
    },

    /// Operation only defined for the other book discipline
    #[error("{operation} is not supported on a {discipline} book")]
    WrongDiscipline {
        /// Operation name
        operation: &'static str,
        /// Discipline of the book
        discipline: crate::types::Discipline,
    },
}
