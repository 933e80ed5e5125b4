//! ECG record types shared between the feed and its consumers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two replayed traces a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TraceLabel {
    #[default]
    A,
    B,
}

impl TraceLabel {
    /// The other label
    pub fn flipped(self) -> Self {
        match self {
            TraceLabel::A => TraceLabel::B,
            TraceLabel::B => TraceLabel::A,
        }
    }
}

impl fmt::Display for TraceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceLabel::A => write!(f, "trace A"),
            TraceLabel::B => write!(f, "trace B"),
        }
    }
}

/// One row of the sample table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcgSample {
    /// Time index as recorded in the resource
    pub time: f64,
    /// Heart rate or pulse rate (ECG HR)
    pub heart_rate: f64,
    /// Non-invasive blood pressure (NI BP)
    pub blood_pressure: f64,
    /// Stroke volume in ml (SV)
    pub blood_volume: f64,
    /// Blood oxygenation (SpO2)
    pub oxygenation: f64,
}

/// A record published by the feed on every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcgRecord {
    /// Replay time in seconds, wrapped into the display window
    pub time: f64,
    /// Heart rate or pulse rate (ECG HR)
    pub heart_rate: f64,
    /// Non-invasive blood pressure (NI BP)
    pub blood_pressure: f64,
    /// Stroke volume in ml (SV)
    pub blood_volume: f64,
    /// Blood oxygenation (SpO2)
    pub oxygenation: f64,
    /// Trace the record was replayed under
    pub trace: TraceLabel,
}

impl EcgRecord {
    /// Build a record from a table row, stamped with replay time and trace
    pub fn from_sample(sample: &EcgSample, time: f64, trace: TraceLabel) -> Self {
        EcgRecord {
            time,
            heart_rate: sample.heart_rate,
            blood_pressure: sample.blood_pressure,
            blood_volume: sample.blood_volume,
            oxygenation: sample.oxygenation,
            trace,
        }
    }

    /// Channel values without time and trace
    pub fn channels(&self) -> [f64; 4] {
        [
            self.heart_rate,
            self.blood_pressure,
            self.blood_volume,
            self.oxygenation,
        ]
    }
}
