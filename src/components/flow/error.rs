use thiserror::Error;

use super::types::NodeId;

/// Rejections raised by the store when strict validation is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
	#[error("node id already in use: {0}")]
	DuplicateNode(NodeId),
	#[error("edge {role} references unknown node: {id}")]
	UnknownNode { role: &'static str, id: NodeId },
	#[error("self-loop on node {0}")]
	SelfLoop(NodeId),
	#[error("edge {from} -> {to} already exists")]
	DuplicateEdge { from: NodeId, to: NodeId },
}

/// Result type for store mutations.
pub type FlowResult<T> = Result<T, FlowError>;
