//! Sweep buffers for the two replayed traces

use ecg_core::{EcgRecord, TraceLabel};
use std::collections::VecDeque;

/// Default points kept per trace: one 10 second sweep at 800Hz
pub const DEFAULT_MAX_POINTS: usize = 8000;

/// Rolling chart data, one series per trace label
pub struct PlotData {
    trace_a: VecDeque<EcgRecord>,
    trace_b: VecDeque<EcgRecord>,
    max_points: usize,
}

impl Default for PlotData {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POINTS)
    }
}

impl PlotData {
    pub fn new(max_points: usize) -> Self {
        Self {
            trace_a: VecDeque::with_capacity(max_points.min(DEFAULT_MAX_POINTS)),
            trace_b: VecDeque::with_capacity(max_points.min(DEFAULT_MAX_POINTS)),
            max_points: max_points.max(1),
        }
    }

    /// Append a record to its trace's series, evicting the oldest point
    /// once the series is full
    pub fn push(&mut self, record: EcgRecord) {
        let max_points = self.max_points;
        let series = self.series_mut(record.trace);
        series.push_back(record);
        while series.len() > max_points {
            series.pop_front();
        }
    }

    pub fn series(&self, trace: TraceLabel) -> &VecDeque<EcgRecord> {
        match trace {
            TraceLabel::A => &self.trace_a,
            TraceLabel::B => &self.trace_b,
        }
    }

    fn series_mut(&mut self, trace: TraceLabel) -> &mut VecDeque<EcgRecord> {
        match trace {
            TraceLabel::A => &mut self.trace_a,
            TraceLabel::B => &mut self.trace_b,
        }
    }

    pub fn len(&self) -> usize {
        self.trace_a.len() + self.trace_b.len()
    }
}

/// Per-interval statistics logged by the monitor
#[derive(Debug, Clone, Default)]
pub struct WindowSummary {
    pub records: usize,
    pub trace: Option<TraceLabel>,
    pub last_time: f64,
    heart_rate_min: f64,
    heart_rate_max: f64,
}

impl WindowSummary {
    pub fn record(&mut self, record: &EcgRecord) {
        if self.records == 0 {
            self.heart_rate_min = record.heart_rate;
            self.heart_rate_max = record.heart_rate;
        } else {
            self.heart_rate_min = self.heart_rate_min.min(record.heart_rate);
            self.heart_rate_max = self.heart_rate_max.max(record.heart_rate);
        }
        self.records += 1;
        self.trace = Some(record.trace);
        self.last_time = record.time;
    }

    /// Heart rate range seen in the window, `None` if nothing arrived
    pub fn heart_rate_range(&self) -> Option<(f64, f64)> {
        (self.records > 0).then_some((self.heart_rate_min, self.heart_rate_max))
    }

    /// Return the current window and start a new one
    pub fn take(&mut self) -> WindowSummary {
        std::mem::take(self)
    }
}
