//! Turns sidebar drags and canvas connect gestures into store mutations.
//!
//! Every failure here is quiet: a gesture that cannot complete is logged and
//! dropped, never surfaced to the user.

use log::{debug, info, warn};

use super::store::DiagramStore;
use super::types::{Bounds, Connection, EdgeId, Node, NodeData, NodeId, NodeKind, Position};

/// Data-transfer format for sidebar drags. Not a text type, so inputs and
/// other applications ignore the drop.
pub const TRANSFER_FORMAT: &str = "application/reactflow";

/// The drop-effect hint handed back to the browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropEffect {
	Move,
}

impl DropEffect {
	pub fn as_str(self) -> &'static str {
		match self {
			DropEffect::Move => "move",
		}
	}
}

/// What a sidebar drag carries to the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragPayload {
	pub kind: NodeKind,
}

impl DragPayload {
	/// Format and value written to the browser's data transfer. Never read back.
	pub fn transfer_entry(&self) -> (&'static str, &'static str) {
		(TRANSFER_FORMAT, self.kind.as_str())
	}
}

/// A drop on the canvas, reduced to what node placement needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropEvent {
	/// Pointer position in client coordinates.
	pub client: Position,
	/// Canvas rectangle, when it could be resolved.
	pub bounds: Option<Bounds>,
}

#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	session: Option<DragPayload>,
	pending_name: String,
}

impl InteractionController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn pending_name(&self) -> &str {
		&self.pending_name
	}

	pub fn set_pending_name(&mut self, name: impl Into<String>) {
		self.pending_name = name.into();
	}

	/// Begin dragging a template out of the sidebar.
	pub fn on_drag_start(&mut self, kind: NodeKind) -> (DragPayload, DropEffect) {
		debug!("drag start: {}", kind.as_str());
		let payload = DragPayload { kind };
		self.session = Some(payload);
		(payload, DropEffect::Move)
	}

	/// Keeps the canvas a valid drop target.
	pub fn on_drag_over(&self) -> DropEffect {
		DropEffect::Move
	}

	/// The drag finished without reaching the canvas.
	pub fn on_drag_end(&mut self) {
		if let Some(payload) = self.session.take() {
			debug!("drag abandoned: {}", payload.kind.as_str());
		}
	}

	/// Place a node for the current drag session, if any.
	pub fn on_drop(&mut self, store: &mut DiagramStore, event: DropEvent) -> Option<NodeId> {
		let Some(payload) = self.session.take() else {
			debug!("drop without drag payload, ignoring");
			return None;
		};
		let Some(bounds) = event.bounds else {
			debug!("drop with unresolved canvas bounds, ignoring");
			return None;
		};

		let position = Position::new(event.client.x - bounds.left, event.client.y - bounds.top);
		let label = if self.pending_name.is_empty() {
			payload.kind.default_label()
		} else {
			self.pending_name.clone()
		};

		let node = Node {
			id: store.next_node_id(),
			kind: payload.kind,
			position,
			data: NodeData { label },
			selected: false,
		};
		match store.add_node(node) {
			Ok(id) => {
				info!("dropped {} node {id}", payload.kind.as_str());
				self.pending_name.clear();
				Some(id)
			}
			Err(e) => {
				warn!("drop rejected: {e}");
				None
			}
		}
	}

	/// Append an edge for a connection reported by the canvas.
	pub fn on_connect(&self, store: &mut DiagramStore, connection: &Connection) -> Option<EdgeId> {
		match store.add_edge(connection) {
			Ok(id) => {
				info!("connected {} -> {}", connection.source, connection.target);
				Some(id)
			}
			Err(e) => {
				warn!("connection rejected: {e}");
				None
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow::config::{FlowConfig, Validation};
	use crate::components::flow::state::{FlowViewState, ViewTransform};
	use crate::pages::home::{initial_edges, initial_nodes};

	fn store() -> DiagramStore {
		DiagramStore::new(initial_nodes(), initial_edges(), Validation::Permissive)
	}

	fn drop_at(client: (f64, f64), bounds: Option<(f64, f64)>) -> DropEvent {
		DropEvent {
			client: Position::new(client.0, client.1),
			bounds: bounds.map(|(left, top)| Bounds { left, top }),
		}
	}

	#[test]
	fn drop_places_node_relative_to_canvas() {
		let mut store = store();
		let mut ctl = InteractionController::new();
		let (payload, effect) = ctl.on_drag_start(NodeKind::Default);
		assert_eq!(effect, DropEffect::Move);
		assert_eq!(payload.transfer_entry(), ("application/reactflow", "default"));
		assert_eq!(ctl.on_drag_over(), DropEffect::Move);

		let id = ctl.on_drop(&mut store, drop_at((300.0, 200.0), Some((100.0, 50.0))));
		assert_eq!(id, Some(NodeId::new("4")));
		let node = store.nodes().last().unwrap();
		assert_eq!(node.kind, NodeKind::Default);
		assert_eq!(node.position, Position::new(200.0, 150.0));
		assert_eq!(node.data.label, "Default Node");
		// the session is consumed by the drop
		assert_eq!(ctl.on_drop(&mut store, drop_at((300.0, 200.0), Some((100.0, 50.0)))), None);
		assert_eq!(store.nodes().len(), 4);
	}

	#[test]
	fn drop_without_payload_is_a_no_op() {
		let mut store = store();
		let mut ctl = InteractionController::new();
		assert_eq!(ctl.on_drop(&mut store, drop_at((300.0, 200.0), Some((0.0, 0.0)))), None);
		assert_eq!(store.nodes().len(), 3);
	}

	#[test]
	fn drop_without_bounds_is_a_no_op() {
		let mut store = store();
		let mut ctl = InteractionController::new();
		ctl.set_pending_name("kept");
		ctl.on_drag_start(NodeKind::Input);
		assert_eq!(ctl.on_drop(&mut store, drop_at((10.0, 10.0), None)), None);
		assert_eq!(store.nodes().len(), 3);
		assert_eq!(ctl.pending_name(), "kept");
	}

	#[test]
	fn custom_name_wins_and_is_cleared() {
		let mut store = store();
		let mut ctl = InteractionController::new();
		ctl.set_pending_name("My Step");
		ctl.on_drag_start(NodeKind::Output);
		ctl.on_drop(&mut store, drop_at((0.0, 0.0), Some((0.0, 0.0))));
		let node = store.nodes().last().unwrap();
		assert_eq!(node.data.label, "My Step");
		assert_eq!(node.kind, NodeKind::Output);
		assert_eq!(ctl.pending_name(), "");
	}

	#[test]
	fn drop_ignores_pan_and_zoom_of_the_canvas() {
		let mut store = store();
		let view = FlowViewState::new(initial_nodes(), initial_edges(), 800.0, 600.0, &FlowConfig::default());
		assert_ne!(view.transform, ViewTransform::default());
		let mut ctl = InteractionController::new();
		ctl.on_drag_start(NodeKind::Default);
		ctl.on_drop(&mut store, drop_at((300.0, 200.0), Some((100.0, 50.0))));
		let node = store.nodes().last().unwrap();
		assert_eq!(node.position, Position::new(200.0, 150.0));
		assert_eq!(node.data.label, "Default Node");
	}

	#[test]
	fn whitespace_name_is_used_verbatim() {
		let mut store = store();
		let mut ctl = InteractionController::new();
		ctl.set_pending_name("  ");
		ctl.on_drag_start(NodeKind::Input);
		ctl.on_drop(&mut store, drop_at((0.0, 0.0), Some((0.0, 0.0))));
		assert_eq!(store.nodes().last().unwrap().data.label, "  ");
	}

	#[test]
	fn transfer_format_is_not_text() {
		let payload = DragPayload { kind: NodeKind::Output };
		let (format, value) = payload.transfer_entry();
		assert_eq!(format, "application/reactflow");
		assert!(!format.starts_with("text/"));
		assert_eq!(value, "output");
	}

	#[test]
	fn abandoned_drag_leaves_nothing_to_drop() {
		let mut store = store();
		let mut ctl = InteractionController::new();
		ctl.on_drag_start(NodeKind::Input);
		ctl.on_drag_end();
		assert_eq!(ctl.on_drop(&mut store, drop_at((1.0, 1.0), Some((0.0, 0.0)))), None);
		assert_eq!(store.nodes().len(), 3);
	}

	#[test]
	fn consecutive_drops_get_fresh_ids() {
		let mut store = store();
		let mut ctl = InteractionController::new();
		for expected in ["4", "5", "6"] {
			ctl.on_drag_start(NodeKind::Default);
			let id = ctl.on_drop(&mut store, drop_at((0.0, 0.0), Some((0.0, 0.0))));
			assert_eq!(id, Some(NodeId::new(expected)));
		}
	}

	#[test]
	fn connect_appends_edge() {
		let mut store = store();
		let ctl = InteractionController::new();
		let id = ctl.on_connect(&mut store, &Connection::new("1", "3"));
		assert!(id.is_some());
		assert_eq!(store.edges().len(), 3);
		let last = store.edges().last().unwrap();
		assert_eq!((last.source.as_str(), last.target.as_str()), ("1", "3"));
	}

	#[test]
	fn strict_connect_rejection_is_quiet() {
		let mut store = DiagramStore::new(initial_nodes(), initial_edges(), Validation::Strict);
		let ctl = InteractionController::new();
		assert_eq!(ctl.on_connect(&mut store, &Connection::new("1", "1")), None);
		assert_eq!(store.edges().len(), 2);
	}
}
