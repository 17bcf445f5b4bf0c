//! Spatial-subsystem error type.

use thiserror::Error;

use ps_core::{EdgeId, NodeId};

/// Errors produced by `ps-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("duplicate node id {0:?}")]
    DuplicateNode(String),

    #[error("duplicate edge id {0:?}")]
    DuplicateEdge(String),

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("edge {0} not found in network")]
    EdgeNotFound(EdgeId),

    #[error("edge {edge:?} has invalid length {length}")]
    InvalidLength { edge: String, length: f64 },

    #[error("edges {0} and {1} do not connect the same nodes in reverse")]
    NotOpposite(EdgeId, EdgeId),

    #[error("edge weight for {edge} must be finite and non-negative, got {weight}")]
    InvalidWeight { edge: EdgeId, weight: f64 },

    #[error("weight matrix cell ({from}, {to}) must be finite and non-negative, got {weight}")]
    InvalidCell { from: usize, to: usize, weight: f64 },

    #[error("weight matrix row {row} has {len} cells, expected {expected}")]
    MatrixShape { row: usize, len: usize, expected: usize },

    #[error("no route from {from} to {to}")]
    Unreachable { from: NodeId, to: NodeId },

    #[error("nodes {from} and {to} are consecutive in a path but not adjacent")]
    NotAdjacent { from: NodeId, to: NodeId },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
