//! ECG-Simulation: replay of pre-recorded ECG traces
//!
//! Loads the bundled trace table and replays it on a timer to subscribers,
//! standing in for a live sensor in charting demos.

pub mod bundled;
pub mod feed_config;
pub mod publisher;
pub mod replay_cursor;
pub mod replay_feed;

pub use bundled::*;
pub use feed_config::*;
pub use publisher::*;
pub use replay_cursor::*;
pub use replay_feed::*;
