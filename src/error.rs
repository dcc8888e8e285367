//! Error types for graph construction and connection bookkeeping.
//!
//! Interaction outcomes (a drop on empty canvas, a drop on an incompatible
//! port) are not errors; they are reported through
//! [`DragOutcome`](crate::controller::DragOutcome). Errors here signal a
//! broken caller contract: stale ids, binding two ports of the same
//! direction, or reusing a discarded connection.

use crate::graph::{NodeId, PipeId, PortId};
use crate::validation::ValidationError;
use thiserror::Error;

/// Error type for [`NodeGraph`](crate::graph::NodeGraph) operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A pipe was asked to bind two ports sharing one direction
    #[error("cannot bind {in_port} and {out_port}: both ports have the same direction")]
    InvalidBinding { in_port: PortId, out_port: PortId },

    /// A pipe was asked to bind two ports of one node
    #[error("cannot bind {0} and {1}: ports belong to the same node")]
    SameNode(PortId, PortId),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown port {0}")]
    UnknownPort(PortId),

    #[error("unknown pipe {0}")]
    UnknownPipe(PipeId),

    /// The connection was already committed or discarded
    #[error("connection for {0} is no longer provisional")]
    ConnectionInert(PipeId),

    /// Connection limits are positive; zero is rejected at construction
    #[error("connection limit must be positive, got {0}")]
    InvalidConnectionLimit(usize),

    /// A programmatic connect failed drop validation
    #[error("connection rejected: {0}")]
    Rejected(ValidationError),
}

pub type Result<T> = std::result::Result<T, GraphError>;
