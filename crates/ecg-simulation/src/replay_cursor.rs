//! Cursor over the sample table that produces one record per step

use crate::feed_config::FeedConfig;
use ecg_core::{EcgError, EcgRecord, EcgResult, SampleTable, TraceLabel};
use std::sync::Arc;

/// Replay position within a sample table
///
/// `current_index` wraps to the start of the table at the top of a step,
/// `total_index` counts every emission and never wraps. The trace label
/// flips each time `total_index` reaches a multiple of the trace period.
#[derive(Debug, Clone)]
pub struct ReplayCursor {
    table: Arc<SampleTable>,
    current_index: usize,
    total_index: u64,
    trace: TraceLabel,
    sample_rate: f64,
    trace_period: u64,
    time_window: f64,
}

impl ReplayCursor {
    /// Create a cursor at the first row; an empty table is rejected
    pub fn new(table: Arc<SampleTable>, config: &FeedConfig) -> EcgResult<Self> {
        config.validate()?;
        if table.is_empty() {
            return Err(EcgError::EmptyTable);
        }

        Ok(ReplayCursor {
            table,
            current_index: 0,
            total_index: 0,
            trace: TraceLabel::A,
            sample_rate: config.sample_rate,
            trace_period: config.trace_period,
            time_window: config.time_window,
        })
    }

    /// Emit the record under the cursor and advance
    pub fn step(&mut self) -> EcgRecord {
        if self.current_index >= self.table.len() {
            self.current_index = 0;
        }

        let time = (self.total_index as f64 / self.sample_rate) % self.time_window;
        let sample = self.table.sample(self.current_index);
        let record = EcgRecord::from_sample(&sample, time, self.trace);

        self.current_index += 1;
        self.total_index += 1;

        if self.total_index % self.trace_period == 0 {
            self.trace = self.trace.flipped();
        }

        record
    }

    /// Raw row counter; equals the table length right after the last row
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Row the next step will emit
    pub fn next_index(&self) -> usize {
        if self.current_index >= self.table.len() {
            0
        } else {
            self.current_index
        }
    }

    /// Total number of steps taken
    pub fn total_index(&self) -> u64 {
        self.total_index
    }

    /// Label the next record will carry
    pub fn trace(&self) -> TraceLabel {
        self.trace
    }

    pub fn table(&self) -> &SampleTable {
        &self.table
    }
}
