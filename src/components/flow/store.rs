use std::collections::HashSet;

use log::{debug, warn};

use super::changes::{EdgeChange, NodeChange, apply_edge_changes, apply_node_changes};
use super::config::Validation;
use super::error::{FlowError, FlowResult};
use super::types::{Connection, Edge, EdgeId, Node, NodeId};

/// Return `edges` plus one edge for `connection`, with a freshly generated id.
///
/// No duplicate or self-loop checks happen here.
pub fn add_edge(connection: &Connection, edges: &[Edge]) -> Vec<Edge> {
	let id = edge_id_for(connection, edges);
	let mut next = Vec::with_capacity(edges.len() + 1);
	next.extend_from_slice(edges);
	next.push(Edge {
		id,
		source: connection.source.clone(),
		target: connection.target.clone(),
		selected: false,
	});
	next
}

/// `e<source>-<target>`, suffixed with `-2`, `-3`, ... when already taken.
fn edge_id_for(connection: &Connection, edges: &[Edge]) -> EdgeId {
	let base = format!("e{}-{}", connection.source, connection.target);
	let taken: HashSet<&str> = edges.iter().map(|e| e.id.as_str()).collect();
	if !taken.contains(base.as_str()) {
		return EdgeId(base);
	}
	let mut n = 2;
	loop {
		let candidate = format!("{base}-{n}");
		if !taken.contains(candidate.as_str()) {
			return EdgeId(candidate);
		}
		n += 1;
	}
}

/// Ordered node and edge collections for one editor session.
///
/// Collections only grow; positional and selection updates come in as
/// change deltas from the canvas.
#[derive(Clone, Debug, Default)]
pub struct DiagramStore {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	next_id: u64,
	validation: Validation,
}

impl DiagramStore {
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, validation: Validation) -> Self {
		let highest_numeric = nodes
			.iter()
			.filter_map(|n| n.id.as_str().parse::<u64>().ok())
			.max()
			.unwrap_or(0);
		let next_id = (nodes.len() as u64).max(highest_numeric) + 1;
		Self {
			nodes,
			edges,
			next_id,
			validation,
		}
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn contains_node(&self, id: &NodeId) -> bool {
		self.nodes.iter().any(|n| &n.id == id)
	}

	/// Hand out the next node id. Monotonic, and never one already present.
	pub fn next_node_id(&mut self) -> NodeId {
		loop {
			let candidate = NodeId(self.next_id.to_string());
			self.next_id += 1;
			if !self.contains_node(&candidate) {
				return candidate;
			}
		}
	}

	/// Append a node.
	pub fn add_node(&mut self, node: Node) -> FlowResult<NodeId> {
		if self.validation == Validation::Strict && self.contains_node(&node.id) {
			warn!("rejecting node {}: id already in use", node.id);
			return Err(FlowError::DuplicateNode(node.id));
		}
		let id = node.id.clone();
		debug!("add node {} ({}) at ({}, {})", id, node.kind.as_str(), node.position.x, node.position.y);
		self.nodes.push(node);
		Ok(id)
	}

	/// Append an edge for `connection`.
	pub fn add_edge(&mut self, connection: &Connection) -> FlowResult<EdgeId> {
		if self.validation == Validation::Strict {
			if let Err(e) = self.check_connection(connection) {
				warn!("rejecting edge {} -> {}: {e}", connection.source, connection.target);
				return Err(e);
			}
		}
		self.edges = add_edge(connection, &self.edges);
		let id = self.edges.last().map(|e| e.id.clone()).unwrap_or_else(|| EdgeId::new(""));
		debug!("add edge {id}");
		Ok(id)
	}

	fn check_connection(&self, connection: &Connection) -> FlowResult<()> {
		for (role, id) in [("source", &connection.source), ("target", &connection.target)] {
			if !self.contains_node(id) {
				return Err(FlowError::UnknownNode { role, id: id.clone() });
			}
		}
		if connection.source == connection.target {
			return Err(FlowError::SelfLoop(connection.source.clone()));
		}
		if self
			.edges
			.iter()
			.any(|e| e.source == connection.source && e.target == connection.target)
		{
			return Err(FlowError::DuplicateEdge {
				from: connection.source.clone(),
				to: connection.target.clone(),
			});
		}
		Ok(())
	}

	pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
		apply_node_changes(changes, &mut self.nodes);
	}

	pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
		apply_edge_changes(changes, &mut self.edges);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow::types::{NodeKind, Position};

	fn seeded(validation: Validation) -> DiagramStore {
		DiagramStore::new(
			vec![
				Node::new("1", NodeKind::Input, Position::new(250.0, 25.0), "Start"),
				Node::new("2", NodeKind::Default, Position::new(250.0, 125.0), "Process"),
				Node::new("3", NodeKind::Output, Position::new(250.0, 225.0), "End"),
			],
			vec![Edge::new("e1-2", "1", "2"), Edge::new("e2-3", "2", "3")],
			validation,
		)
	}

	#[test]
	fn add_node_grows_and_preserves_order() {
		let mut store = seeded(Validation::Permissive);
		for i in 0..5 {
			let id = store.next_node_id();
			store
				.add_node(Node::new(id.as_str(), NodeKind::Default, Position::default(), format!("n{i}")))
				.unwrap();
		}
		assert_eq!(store.nodes().len(), 8);
		let labels: Vec<_> = store.nodes()[3..].iter().map(|n| n.data.label.as_str()).collect();
		assert_eq!(labels, ["n0", "n1", "n2", "n3", "n4"]);
	}

	#[test]
	fn permissive_store_accepts_duplicates() {
		let mut store = seeded(Validation::Permissive);
		store
			.add_node(Node::new("1", NodeKind::Default, Position::default(), ""))
			.unwrap();
		assert_eq!(store.nodes().len(), 4);
		store.add_edge(&Connection::new("2", "2")).unwrap();
		store.add_edge(&Connection::new("9", "1")).unwrap();
		assert_eq!(store.edges().len(), 4);
	}

	#[test]
	fn connect_appends_edge_with_generated_id() {
		let mut store = seeded(Validation::Permissive);
		let id = store.add_edge(&Connection::new("1", "3")).unwrap();
		assert_eq!(store.edges().len(), 3);
		let last = store.edges().last().unwrap();
		assert_eq!(last.source, NodeId::new("1"));
		assert_eq!(last.target, NodeId::new("3"));
		assert!(!last.id.as_str().is_empty());
		assert_eq!(id, EdgeId::new("e1-3"));
	}

	#[test]
	fn repeated_connection_gets_distinct_id() {
		let edges = add_edge(&Connection::new("1", "2"), &[Edge::new("e1-2", "1", "2")]);
		assert_eq!(edges.len(), 2);
		assert_eq!(edges[1].id, EdgeId::new("e1-2-2"));
		let edges = add_edge(&Connection::new("1", "2"), &edges);
		assert_eq!(edges[2].id, EdgeId::new("e1-2-3"));
	}

	#[test]
	fn node_ids_are_monotonic_and_unique() {
		let mut store = seeded(Validation::Permissive);
		assert_eq!(store.next_node_id(), NodeId::new("4"));
		store
			.add_node(Node::new("5", NodeKind::Default, Position::default(), "taken"))
			.unwrap();
		assert_eq!(store.next_node_id(), NodeId::new("6"));
		assert_eq!(store.next_node_id(), NodeId::new("7"));
	}

	#[test]
	fn next_id_starts_past_sparse_seed_ids() {
		let mut store = DiagramStore::new(
			vec![Node::new("10", NodeKind::Default, Position::default(), "")],
			Vec::new(),
			Validation::Permissive,
		);
		assert_eq!(store.next_node_id(), NodeId::new("11"));
	}

	#[test]
	fn strict_store_rejects_bad_structure() {
		let mut store = seeded(Validation::Strict);
		assert_eq!(
			store.add_node(Node::new("2", NodeKind::Default, Position::default(), "")),
			Err(FlowError::DuplicateNode(NodeId::new("2")))
		);
		assert_eq!(
			store.add_edge(&Connection::new("1", "9")),
			Err(FlowError::UnknownNode {
				role: "target",
				id: NodeId::new("9")
			})
		);
		assert_eq!(
			store.add_edge(&Connection::new("2", "2")),
			Err(FlowError::SelfLoop(NodeId::new("2")))
		);
		assert!(matches!(
			store.add_edge(&Connection::new("1", "2")),
			Err(FlowError::DuplicateEdge { .. })
		));
		assert_eq!(store.nodes().len(), 3);
		assert_eq!(store.edges().len(), 2);
		assert!(store.add_edge(&Connection::new("1", "3")).is_ok());
	}

	#[test]
	fn store_applies_changes() {
		let mut store = seeded(Validation::Permissive);
		store.apply_node_changes(&[NodeChange::Position {
			id: NodeId::new("1"),
			position: Position::new(1.0, 2.0),
			dragging: false,
		}]);
		store.apply_edge_changes(&[EdgeChange::Select {
			id: EdgeId::new("e2-3"),
			selected: true,
		}]);
		assert_eq!(store.nodes()[0].position, Position::new(1.0, 2.0));
		assert!(store.edges()[1].selected);
	}
}
