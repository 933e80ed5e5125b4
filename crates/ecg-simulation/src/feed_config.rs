//! Replay feed configuration

use ecg_core::{config_error, EcgResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Nominal sample rate the replay time is computed against
pub const DEFAULT_SAMPLE_RATE: f64 = 800.0;
/// Number of emissions between trace label flips
pub const DEFAULT_TRACE_PERIOD: u64 = 8000;
/// Width of the replay time window in seconds
pub const DEFAULT_TIME_WINDOW: f64 = 10.0;
/// Timer period in microseconds
pub const DEFAULT_TICK_INTERVAL_US: u64 = 1000;

/// Configuration for the replay feed timing
///
/// The sample source is always the bundled trace file or a caller-supplied
/// reader; only timing is configurable here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Timer period between emissions, in microseconds
    pub tick_interval_us: u64,
    /// Nominal sample rate in Hz used to compute replay time
    pub sample_rate: f64,
    /// Emissions between trace label flips
    pub trace_period: u64,
    /// Replay time wraps into `[0, time_window)` seconds
    pub time_window: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_us: DEFAULT_TICK_INTERVAL_US,
            sample_rate: DEFAULT_SAMPLE_RATE,
            trace_period: DEFAULT_TRACE_PERIOD,
            time_window: DEFAULT_TIME_WINDOW,
        }
    }
}

impl FeedConfig {
    /// Parse and validate a JSON configuration; missing keys take defaults
    pub fn from_json_str(json: &str) -> EcgResult<Self> {
        let config: FeedConfig =
            serde_json::from_str(json).map_err(|e| config_error!("{}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> EcgResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that every timing parameter is usable
    pub fn validate(&self) -> EcgResult<()> {
        if self.tick_interval_us == 0 {
            return Err(config_error!("tick interval must be non-zero"));
        }
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(config_error!(
                "sample rate must be positive, got {}",
                self.sample_rate
            ));
        }
        if self.trace_period == 0 {
            return Err(config_error!("trace period must be non-zero"));
        }
        if !self.time_window.is_finite() || self.time_window <= 0.0 {
            return Err(config_error!(
                "time window must be positive, got {}",
                self.time_window
            ));
        }
        Ok(())
    }

    /// Timer period as a duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(self.tick_interval_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecg_core::EcgError;

    #[test]
    fn test_default_config_is_valid() {
        let config = FeedConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_micros(1000));
        assert_eq!(config.sample_rate, 800.0);
        assert_eq!(config.trace_period, 8000);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = FeedConfig::from_json_str(r#"{ "tick_interval_us": 2500 }"#).unwrap();
        assert_eq!(config.tick_interval_us, 2500);
        assert_eq!(config.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(config.time_window, DEFAULT_TIME_WINDOW);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad = [
            r#"{ "tick_interval_us": 0 }"#,
            r#"{ "sample_rate": -800.0 }"#,
            r#"{ "trace_period": 0 }"#,
            r#"{ "time_window": 0.0 }"#,
            r#"{ "sample_rate": "fast" }"#,
        ];

        for json in bad {
            let err = FeedConfig::from_json_str(json).unwrap_err();
            assert!(
                matches!(err, EcgError::InvalidConfig { .. }),
                "{} should be rejected, got {:?}",
                json,
                err
            );
        }
    }

    #[test]
    fn test_missing_config_file() {
        let err = FeedConfig::from_json_file("/nonexistent/ecg-feed.json").unwrap_err();
        assert!(matches!(err, EcgError::Io { .. }));
    }
}
