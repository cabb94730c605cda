//! Domain error types.
//!
//! These errors represent validation failures for raw identifiers and
//! schedule values. They are distinct from I/O and parse errors.

use super::{InvalidStopId, TimeError};

/// Domain-level errors for validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A stop identifier failed validation
    #[error(transparent)]
    StopId(#[from] InvalidStopId),

    /// A schedule time failed validation
    #[error(transparent)]
    Time(#[from] TimeError),

    /// A schedule runs backwards in time
    #[error("arrival {arrival} is before departure {departure}")]
    NegativeTravelTime { departure: String, arrival: String },
}
