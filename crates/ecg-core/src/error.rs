//! Error handling for the ECG replay feed
//!
//! Every fallible operation in the workspace reports through [`EcgError`],
//! so callers can decide whether to continue with partial data or abort.

use thiserror::Error;

/// Result type alias for ECG feed operations
pub type EcgResult<T> = Result<T, EcgError>;

/// Error type for all ECG feed operations
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EcgError {
    /// The sample resource could not be read
    #[error("Failed to read sample resource: {reason}")]
    Io {
        /// Underlying I/O error description
        reason: String,
    },

    /// A row did not have the expected shape
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow {
        /// 1-based line number in the resource
        line: usize,
        /// Description of the problem
        reason: String,
    },

    /// A field could not be parsed as a decimal number
    #[error("Invalid number at line {line}, field {field}: {value:?}")]
    InvalidNumber {
        /// 1-based line number in the resource
        line: usize,
        /// 0-based field index within the row
        field: usize,
        /// Raw field text
        value: String,
    },

    /// A feed was constructed over a table with no rows
    #[error("Sample table is empty, nothing to replay")]
    EmptyTable,

    /// The feed has already been stopped and cannot emit again
    #[error("Feed has completed and cannot be restarted")]
    FeedCompleted,

    /// Invalid feed configuration
    #[error("Invalid feed configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error
        reason: String,
    },

    /// The control channel to a running feed task is closed
    #[error("Feed control channel closed")]
    ControlChannelClosed,
}

impl From<std::io::Error> for EcgError {
    fn from(err: std::io::Error) -> Self {
        EcgError::Io {
            reason: err.to_string(),
        }
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::error::EcgError::InvalidConfig {
            reason: format!($($arg)*),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = EcgError::InvalidNumber {
            line: 12,
            field: 3,
            value: "abc".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("line 12"));
        assert!(display.contains("field 3"));
        assert!(display.contains("abc"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing asset");
        let error: EcgError = io.into();
        assert!(matches!(error, EcgError::Io { ref reason } if reason.contains("missing asset")));
    }

    #[test]
    fn test_config_error_macro() {
        let error = config_error!("rate must be positive, got {}", -1.0);
        assert_eq!(
            error,
            EcgError::InvalidConfig {
                reason: "rate must be positive, got -1".to_string()
            }
        );
    }
}
