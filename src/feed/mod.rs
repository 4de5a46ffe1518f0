//! Feed plumbing around the depth cache.
//!
//! - [`driver`] - async task applying a stream of feed envelopes in order
//! - [`resync`] - sinks for resubscription requests

pub mod driver;
pub mod resync;

pub use driver::{decode_lines, parse_envelope, run_feed, spawn_feed};
pub use resync::{ChannelResync, NoopResync, RecordingResync, ResyncHandler, ResyncRequest};
