//! Error types for zone partitioning.
//!
//! Failing to find a cut is not an error: CutLine, FindPartitions and
//! TargetedPartition report infeasibility as values, and the heuristic turns
//! it into a [`Termination`](crate::zoning::Termination). `ZoningError` is
//! reserved for bad inputs and for broken zone invariants.

use flexzone_core::{FlexError, LineId, NodeId, Period};
use thiserror::Error;

/// Result type for zoning operations.
pub type Result<T> = std::result::Result<T, ZoningError>;

#[derive(Debug, Error)]
pub enum ZoningError {
    /// A flexible line has an endpoint that is not a flexible node.
    #[error("flexible line {} connects nodes {} and {}, which are not both flexible", line.value(), from.value(), to.value())]
    DanglingLine {
        line: LineId,
        from: NodeId,
        to: NodeId,
    },

    /// The flow input has no value for a flexible line.
    #[error("no flow for line {} in period {}", line.value(), period.value())]
    MissingFlow { line: LineId, period: Period },

    /// Configuration values out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Active zones overlap or fail to cover the flexible area.
    #[error("zone invariant violated in period {} after iteration {iteration}: {detail}", period.value())]
    InvariantViolation {
        period: Period,
        iteration: usize,
        detail: String,
    },

    /// Worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ZoningError {
    fn from(e: toml::de::Error) -> Self {
        ZoningError::Serialization(e.to_string())
    }
}

impl From<toml::ser::Error> for ZoningError {
    fn from(e: toml::ser::Error) -> Self {
        ZoningError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for ZoningError {
    fn from(e: serde_json::Error) -> Self {
        ZoningError::Serialization(e.to_string())
    }
}

impl From<ZoningError> for FlexError {
    fn from(err: ZoningError) -> Self {
        match err {
            ZoningError::Io(e) => FlexError::Io(e),
            ZoningError::InvalidConfig(msg) => FlexError::Config(msg),
            ZoningError::Serialization(msg) => FlexError::Parse(msg),
            ZoningError::DanglingLine { .. } => FlexError::Network(err.to_string()),
            ZoningError::MissingFlow { .. } => FlexError::Validation(err.to_string()),
            other => FlexError::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ZoningError::MissingFlow {
            line: LineId::new(4),
            period: Period::new(2),
        };
        assert_eq!(err.to_string(), "no flow for line 4 in period 2");
    }

    #[test]
    fn test_conversion_to_flex_error() {
        let err = ZoningError::DanglingLine {
            line: LineId::new(1),
            from: NodeId::new(3),
            to: NodeId::new(9),
        };
        let flex: FlexError = err.into();
        assert!(matches!(flex, FlexError::Network(_)));

        let flex: FlexError = ZoningError::InvalidConfig("n_zones must be at least 1".into()).into();
        assert!(matches!(flex, FlexError::Config(_)));
    }
}
