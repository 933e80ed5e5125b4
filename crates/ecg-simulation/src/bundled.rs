//! Pre-recorded ECG traces shipped with the crate

use crate::feed_config::FeedConfig;
use crate::replay_feed::ReplayFeed;
use ecg_core::{EcgResult, SampleTable};

/// Location of the trace file relative to the crate root
pub const BUNDLED_TRACES_PATH: &str = "data/EcgTraces.csv";

/// Contents of [`BUNDLED_TRACES_PATH`], embedded at compile time
pub const BUNDLED_TRACES: &str = include_str!("../data/EcgTraces.csv");

/// Parse the bundled traces
pub fn bundled_table() -> EcgResult<SampleTable> {
    SampleTable::from_csv_str(BUNDLED_TRACES)
}

/// Feed replaying the bundled traces
pub fn bundled_feed(config: FeedConfig) -> EcgResult<ReplayFeed> {
    ReplayFeed::new(bundled_table()?, config)
}
