//! Change deltas reported by the canvas and the reducers that apply them.

use super::types::{Edge, EdgeId, Node, NodeId, Position};

#[derive(Clone, Debug, PartialEq)]
pub enum NodeChange {
	Position {
		id: NodeId,
		position: Position,
		dragging: bool,
	},
	Select {
		id: NodeId,
		selected: bool,
	},
}

impl NodeChange {
	pub fn id(&self) -> &NodeId {
		match self {
			NodeChange::Position { id, .. } | NodeChange::Select { id, .. } => id,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum EdgeChange {
	Select { id: EdgeId, selected: bool },
}

/// Apply node deltas in order. Deltas for unknown ids are dropped.
pub fn apply_node_changes(changes: &[NodeChange], nodes: &mut [Node]) {
	for change in changes {
		let Some(node) = nodes.iter_mut().find(|n| &n.id == change.id()) else {
			continue;
		};
		match change {
			NodeChange::Position { position, .. } => node.position = *position,
			NodeChange::Select { selected, .. } => node.selected = *selected,
		}
	}
}

/// Apply edge deltas in order. Deltas for unknown ids are dropped.
pub fn apply_edge_changes(changes: &[EdgeChange], edges: &mut [Edge]) {
	for change in changes {
		match change {
			EdgeChange::Select { id, selected } => {
				if let Some(edge) = edges.iter_mut().find(|e| &e.id == id) {
					edge.selected = *selected;
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow::types::NodeKind;

	fn nodes() -> Vec<Node> {
		vec![
			Node::new("1", NodeKind::Input, Position::new(0.0, 0.0), "A"),
			Node::new("2", NodeKind::Output, Position::new(10.0, 10.0), "B"),
		]
	}

	#[test]
	fn position_and_select_apply_in_order() {
		let mut nodes = nodes();
		apply_node_changes(
			&[
				NodeChange::Position {
					id: NodeId::new("2"),
					position: Position::new(5.0, 6.0),
					dragging: true,
				},
				NodeChange::Select {
					id: NodeId::new("2"),
					selected: true,
				},
				NodeChange::Position {
					id: NodeId::new("2"),
					position: Position::new(7.0, 8.0),
					dragging: false,
				},
			],
			&mut nodes,
		);
		assert_eq!(nodes[1].position, Position::new(7.0, 8.0));
		assert!(nodes[1].selected);
		assert_eq!(nodes[0].position, Position::new(0.0, 0.0));
		assert!(!nodes[0].selected);
	}

	#[test]
	fn unknown_ids_are_ignored() {
		let mut nodes = nodes();
		let before = nodes.clone();
		apply_node_changes(
			&[NodeChange::Select {
				id: NodeId::new("missing"),
				selected: true,
			}],
			&mut nodes,
		);
		assert_eq!(nodes, before);

		let mut edges = vec![Edge::new("e1-2", "1", "2")];
		apply_edge_changes(
			&[
				EdgeChange::Select {
					id: EdgeId::new("nope"),
					selected: true,
				},
				EdgeChange::Select {
					id: EdgeId::new("e1-2"),
					selected: true,
				},
			],
			&mut edges,
		);
		assert!(edges[0].selected);
	}
}
