// Library-boundary errors. Internal pure computations never produce these.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum MetricsError {
    /// A metrics API was called before `initialize()` (or after `destroy()`).
    #[error("{operation}: monitor not initialized")]
    NotInitialized { operation: &'static str },

    #[error("aggregation failed in {operation}: {source}")]
    Aggregation {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("{family} collector failed: {source}")]
    Collector {
        family: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("health score {0} outside [0, 100]")]
    InvalidScore(f64),
}

impl MetricsError {
    pub fn aggregation(operation: &'static str, source: impl Into<BoxError>) -> Self {
        MetricsError::Aggregation {
            operation,
            source: source.into(),
        }
    }

    pub fn collector(family: &'static str, source: impl Into<BoxError>) -> Self {
        MetricsError::Collector {
            family,
            source: source.into(),
        }
    }
}
