//! Graph construction and persistence errors.

use std::path::PathBuf;

use crate::domain::{DomainError, StopId};

/// Error returned when an edge cost cannot be used by the search.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("edge cost must be finite and non-negative, got {cost}")]
pub struct InvalidCost {
    pub cost: f64,
}

/// Errors that can occur while building, loading or saving a graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The node-link document could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A GTFS table could not be parsed
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },

    /// A raw value failed validation
    #[error("{context}: {source}")]
    Domain {
        context: String,
        #[source]
        source: DomainError,
    },

    /// An edge cost is negative, NaN or infinite
    #[error("edge {from} -> {to}: {source}")]
    InvalidCost {
        from: StopId,
        to: StopId,
        #[source]
        source: InvalidCost,
    },

    /// A stop coordinate is NaN or infinite
    #[error("stop {stop} has non-finite position ({lat}, {lon})")]
    InvalidPosition { stop: StopId, lat: f64, lon: f64 },

    /// An edge refers to a stop with no node entry
    #[error("edge refers to unknown stop {0}")]
    UnknownStop(StopId),
}

impl GraphError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GraphError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn domain(context: impl Into<String>, source: impl Into<DomainError>) -> Self {
        GraphError::Domain {
            context: context.into(),
            source: source.into(),
        }
    }
}
