//! Error types for the reliability engine

use thiserror::Error;

use crate::nr_interface::NodeId;

/// Why an edge was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRejection {
    SelfLoop,
    Duplicate,
    UnknownNode,
    Missing,
    NonPositiveCapacity,
}

impl std::fmt::Display for EdgeRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            EdgeRejection::SelfLoop => "self-loop",
            EdgeRejection::Duplicate => "duplicate edge",
            EdgeRejection::UnknownNode => "unknown node",
            EdgeRejection::Missing => "no such edge",
            EdgeRejection::NonPositiveCapacity => "capacity must be positive and finite",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// No path exists between an ordered node pair
    #[error("graph is disconnected: no path from {from} to {to}")]
    DisconnectedGraph { from: NodeId, to: NodeId },

    /// Edge operation on a self-loop, duplicate, missing edge or bad capacity
    #[error("invalid edge {u}-{v}: {reason}")]
    InvalidEdge {
        u: NodeId,
        v: NodeId,
        reason: EdgeRejection,
    },

    /// Matrix or snapshot size does not match the node/edge count
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Summed demand or edge load no longer fits in a `Demand`
    #[error("demand overflow: accumulated traffic exceeds {}", u64::MAX)]
    DemandOverflow,

    /// Rejected before any trial runs
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl NetworkError {
    pub(crate) fn invalid_edge(u: NodeId, v: NodeId, reason: EdgeRejection) -> Self {
        NetworkError::InvalidEdge { u, v, reason }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = NetworkError::DisconnectedGraph { from: 1, to: 4 };
        assert_eq!(err.to_string(), "graph is disconnected: no path from 1 to 4");

        let err = NetworkError::invalid_edge(2, 2, EdgeRejection::SelfLoop);
        assert_eq!(err.to_string(), "invalid edge 2-2: self-loop");

        let err = NetworkError::DimensionMismatch { expected: 20, found: 4 };
        assert_eq!(err.to_string(), "dimension mismatch: expected 20, found 4");

        assert!(NetworkError::DemandOverflow.to_string().starts_with("demand overflow"));
    }
}
