//! ECG-Core: Foundation types for the ECG replay feed
//!
//! Sample table, emitted record types and the shared error type.

pub mod ecg_types;
pub mod error;
pub mod sample_table;

pub use ecg_types::*;
pub use error::{EcgError, EcgResult};
pub use sample_table::*;
