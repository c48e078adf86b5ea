use super::changes::{EdgeChange, NodeChange, apply_edge_changes, apply_node_changes};
use super::config::FlowConfig;
use super::types::{Connection, Edge, EdgeId, Node, NodeId, Position};

pub const NODE_WIDTH: f64 = 150.0;
pub const NODE_HEIGHT: f64 = 40.0;
pub const HANDLE_RADIUS: f64 = 4.0;
/// Screen pixels.
pub const HANDLE_HIT_RADIUS: f64 = 10.0;
/// Screen pixels.
pub const EDGE_HIT_TOLERANCE: f64 = 6.0;
pub const MINIMAP_WIDTH: f64 = 200.0;
pub const MINIMAP_HEIGHT: f64 = 150.0;
pub const MINIMAP_MARGIN: f64 = 15.0;

const ZOOM_STEP: f64 = 1.2;
const EDGE_SAMPLES: usize = 24;

/// Screen = flow * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	pub fn screen_to_flow(&self, p: Position) -> Position {
		Position::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	pub fn flow_to_screen(&self, p: Position) -> Position {
		Position::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
	pub min: Position,
	pub max: Position,
}

impl Rect {
	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}

	pub fn center(&self) -> Position {
		Position::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
	}

	pub fn contains(&self, p: Position) -> bool {
		p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
	}

	pub fn union(&self, other: &Rect) -> Rect {
		Rect {
			min: Position::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
			max: Position::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
		}
	}
}

pub fn node_rect(node: &Node) -> Rect {
	Rect {
		min: node.position,
		max: Position::new(node.position.x + NODE_WIDTH, node.position.y + NODE_HEIGHT),
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleKind {
	Source,
	Target,
}

/// Source handles sit bottom-centre, target handles top-centre.
pub fn handle_position(node: &Node, kind: HandleKind) -> Position {
	let x = node.position.x + NODE_WIDTH / 2.0;
	match kind {
		HandleKind::Source => Position::new(x, node.position.y + NODE_HEIGHT),
		HandleKind::Target => Position::new(x, node.position.y),
	}
}

fn node_handles(node: &Node) -> impl Iterator<Item = HandleKind> {
	[
		node.kind.has_source_handle().then_some(HandleKind::Source),
		node.kind.has_target_handle().then_some(HandleKind::Target),
	]
	.into_iter()
	.flatten()
}

/// Cubic bezier control points: start, control 1, control 2, end.
pub type Curve = [Position; 4];

pub fn bezier_point(c: &Curve, t: f64) -> Position {
	let u = 1.0 - t;
	let (a, b, cc, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
	Position::new(
		a * c[0].x + b * c[1].x + cc * c[2].x + d * c[3].x,
		a * c[0].y + b * c[1].y + cc * c[2].y + d * c[3].y,
	)
}

fn segment_distance(p: Position, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	if len2 < f64::EPSILON {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
	p.distance(Position::new(a.x + t * dx, a.y + t * dy))
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeId>,
	pub start: Position,
	pub node_start: Position,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start: Position,
	pub transform_start: Position,
}

#[derive(Clone, Debug, Default)]
pub struct ConnectState {
	pub origin: Option<(NodeId, HandleKind)>,
	/// Last pointer position, in screen coordinates.
	pub pointer: Position,
}

/// What the canvas hit under the pointer.
#[derive(Clone, Debug, PartialEq)]
pub enum Hit {
	Handle(NodeId, HandleKind),
	Node(NodeId),
	Edge(EdgeId),
}

/// Events produced by one pointer interaction, to be forwarded to the owner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Emitted {
	pub node_changes: Vec<NodeChange>,
	pub edge_changes: Vec<EdgeChange>,
	pub connection: Option<Connection>,
}

/// Placement of the minimap overlay in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapLayout {
	pub frame: Rect,
	pub scale: f64,
	pub offset: Position,
	/// Visible part of the flow, in minimap coordinates.
	pub viewport: Rect,
}

impl MinimapLayout {
	pub fn project(&self, p: Position) -> Position {
		Position::new(self.offset.x + p.x * self.scale, self.offset.y + p.y * self.scale)
	}
}

pub struct FlowViewState {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub connect: ConnectState,
	pub hover: Option<NodeId>,
	pub width: f64,
	pub height: f64,
	/// Nodes can be selected, dragged and connected.
	pub interactive: bool,
	pub dirty: bool,
	pub show_minimap: bool,
	min_zoom: f64,
	max_zoom: f64,
}

impl FlowViewState {
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, width: f64, height: f64, config: &FlowConfig) -> Self {
		let mut state = Self {
			nodes,
			edges,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			connect: ConnectState::default(),
			hover: None,
			width,
			height,
			interactive: true,
			dirty: true,
			show_minimap: config.show_minimap,
			min_zoom: config.min_zoom,
			max_zoom: config.max_zoom,
		};
		if config.fit_view {
			state.fit_view(config.fit_view_padding);
		}
		state
	}

	/// Replace the rendered collections with the owner's latest copy.
	pub fn sync(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
		self.nodes = nodes;
		self.edges = edges;
		if let Some(id) = &self.drag.node {
			if !self.nodes.iter().any(|n| &n.id == id) {
				self.drag = DragState::default();
			}
		}
		self.dirty = true;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.dirty = true;
	}

	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	pub fn edge_curve(&self, edge: &Edge) -> Option<Curve> {
		let source = handle_position(self.node(&edge.source)?, HandleKind::Source);
		let target = handle_position(self.node(&edge.target)?, HandleKind::Target);
		Some(curve_between(source, target))
	}

	pub fn nodes_bounds(&self) -> Option<Rect> {
		self.nodes
			.iter()
			.map(node_rect)
			.reduce(|acc, r| acc.union(&r))
	}

	/// The part of the flow currently on screen.
	pub fn visible_rect(&self) -> Rect {
		Rect {
			min: self.transform.screen_to_flow(Position::new(0.0, 0.0)),
			max: self.transform.screen_to_flow(Position::new(self.width, self.height)),
		}
	}

	fn handle_at(&self, p: Position, want: Option<HandleKind>) -> Option<(NodeId, HandleKind)> {
		let radius = HANDLE_HIT_RADIUS / self.transform.k;
		self.nodes.iter().rev().find_map(|node| {
			node_handles(node)
				.filter(|kind| want.is_none_or(|w| w == *kind))
				.find(|kind| handle_position(node, *kind).distance(p) <= radius)
				.map(|kind| (node.id.clone(), kind))
		})
	}

	fn edge_at(&self, p: Position) -> Option<EdgeId> {
		let tolerance = EDGE_HIT_TOLERANCE / self.transform.k;
		self.edges.iter().rev().find_map(|edge| {
			let curve = self.edge_curve(edge)?;
			let mut prev = curve[0];
			for i in 1..=EDGE_SAMPLES {
				let next = bezier_point(&curve, i as f64 / EDGE_SAMPLES as f64);
				if segment_distance(p, prev, next) <= tolerance {
					return Some(edge.id.clone());
				}
				prev = next;
			}
			None
		})
	}

	pub fn hit_test(&self, sx: f64, sy: f64) -> Option<Hit> {
		let p = self.transform.screen_to_flow(Position::new(sx, sy));
		if let Some((id, kind)) = self.handle_at(p, None) {
			return Some(Hit::Handle(id, kind));
		}
		if let Some(node) = self.nodes.iter().rev().find(|n| node_rect(n).contains(p)) {
			return Some(Hit::Node(node.id.clone()));
		}
		self.edge_at(p).map(Hit::Edge)
	}

	fn over_minimap(&self, sx: f64, sy: f64) -> bool {
		self.show_minimap && self.minimap().frame.contains(Position::new(sx, sy))
	}

	/// Select exactly `node` and/or `edge`, deselecting everything else.
	fn select_only(&self, node: Option<&NodeId>, edge: Option<&EdgeId>) -> Emitted {
		let node_changes = self
			.nodes
			.iter()
			.filter_map(|n| {
				let want = Some(&n.id) == node;
				(n.selected != want).then(|| NodeChange::Select {
					id: n.id.clone(),
					selected: want,
				})
			})
			.collect();
		let edge_changes = self
			.edges
			.iter()
			.filter_map(|e| {
				let want = Some(&e.id) == edge;
				(e.selected != want).then(|| EdgeChange::Select {
					id: e.id.clone(),
					selected: want,
				})
			})
			.collect();
		Emitted {
			node_changes,
			edge_changes,
			connection: None,
		}
	}

	fn apply(&mut self, emitted: &Emitted) {
		apply_node_changes(&emitted.node_changes, &mut self.nodes);
		apply_edge_changes(&emitted.edge_changes, &mut self.edges);
		self.dirty = true;
	}

	fn start_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start: Position::new(sx, sy),
			transform_start: Position::new(self.transform.x, self.transform.y),
		};
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> Emitted {
		if self.over_minimap(sx, sy) {
			return Emitted::default();
		}
		let hit = if self.interactive {
			self.hit_test(sx, sy)
		} else {
			None
		};
		let emitted = match hit {
			Some(Hit::Handle(id, kind)) => {
				self.connect = ConnectState {
					origin: Some((id, kind)),
					pointer: Position::new(sx, sy),
				};
				Emitted::default()
			}
			Some(Hit::Node(id)) => {
				let emitted = self.select_only(Some(&id), None);
				let node_start = self.node(&id).map(|n| n.position).unwrap_or_default();
				self.drag = DragState {
					node: Some(id),
					start: Position::new(sx, sy),
					node_start,
					moved: false,
				};
				emitted
			}
			Some(Hit::Edge(id)) => self.select_only(None, Some(&id)),
			None => {
				self.start_pan(sx, sy);
				if self.interactive {
					self.select_only(None, None)
				} else {
					Emitted::default()
				}
			}
		};
		self.apply(&emitted);
		emitted
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> Emitted {
		let mut emitted = Emitted::default();
		if let Some(id) = self.drag.node.clone() {
			let k = self.transform.k;
			let position = Position::new(
				self.drag.node_start.x + (sx - self.drag.start.x) / k,
				self.drag.node_start.y + (sy - self.drag.start.y) / k,
			);
			self.drag.moved = true;
			emitted.node_changes.push(NodeChange::Position {
				id,
				position,
				dragging: true,
			});
			self.apply(&emitted);
		} else if self.connect.origin.is_some() {
			self.connect.pointer = Position::new(sx, sy);
			self.dirty = true;
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start.x + (sx - self.pan.start.x);
			self.transform.y = self.pan.transform_start.y + (sy - self.pan.start.y);
			self.dirty = true;
		} else {
			let hovered = match self.hit_test(sx, sy) {
				Some(Hit::Node(id)) | Some(Hit::Handle(id, _)) => Some(id),
				_ => None,
			};
			if hovered != self.hover {
				self.hover = hovered;
				self.dirty = true;
			}
		}
		emitted
	}

	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Emitted {
		let mut emitted = self.finish_drag();
		if let Some((origin, kind)) = self.connect.origin.take() {
			let p = self.transform.screen_to_flow(Position::new(sx, sy));
			let want = match kind {
				HandleKind::Source => HandleKind::Target,
				HandleKind::Target => HandleKind::Source,
			};
			emitted.connection = self.handle_at(p, Some(want)).map(|(other, _)| match kind {
				HandleKind::Source => Connection {
					source: origin,
					target: other,
				},
				HandleKind::Target => Connection {
					source: other,
					target: origin,
				},
			});
			self.dirty = true;
		}
		self.pan.active = false;
		emitted
	}

	/// The pointer left the canvas: end every gesture in flight.
	pub fn pointer_leave(&mut self) -> Emitted {
		let emitted = self.finish_drag();
		if self.connect.origin.take().is_some() {
			self.dirty = true;
		}
		self.pan.active = false;
		if self.hover.take().is_some() {
			self.dirty = true;
		}
		emitted
	}

	fn finish_drag(&mut self) -> Emitted {
		let mut emitted = Emitted::default();
		let drag = std::mem::take(&mut self.drag);
		if let (Some(id), true) = (drag.node, drag.moved) {
			if let Some(position) = self.node(&id).map(|n| n.position) {
				emitted.node_changes.push(NodeChange::Position {
					id,
					position,
					dragging: false,
				});
			}
		}
		emitted
	}

	/// Zoom by `factor`, keeping the screen point under the pointer fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(self.min_zoom, self.max_zoom);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
		self.dirty = true;
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.zoom_at(sx, sy, factor);
	}

	pub fn zoom_in(&mut self) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, ZOOM_STEP);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, 1.0 / ZOOM_STEP);
	}

	/// Frame every node in the viewport, leaving `padding` (a fraction) around them.
	pub fn fit_view(&mut self, padding: f64) {
		let Some(bounds) = self.nodes_bounds() else {
			return;
		};
		let zoom_x = self.width / (bounds.width() * (1.0 + padding));
		let zoom_y = self.height / (bounds.height() * (1.0 + padding));
		let k = zoom_x.min(zoom_y).clamp(self.min_zoom, self.max_zoom);
		let center = bounds.center();
		self.transform = ViewTransform {
			x: self.width / 2.0 - center.x * k,
			y: self.height / 2.0 - center.y * k,
			k,
		};
		self.dirty = true;
	}

	pub fn toggle_interactive(&mut self) -> bool {
		self.interactive = !self.interactive;
		self.drag = DragState::default();
		self.connect = ConnectState::default();
		self.dirty = true;
		self.interactive
	}

	pub fn minimap(&self) -> MinimapLayout {
		let frame = Rect {
			min: Position::new(
				self.width - MINIMAP_WIDTH - MINIMAP_MARGIN,
				self.height - MINIMAP_HEIGHT - MINIMAP_MARGIN,
			),
			max: Position::new(self.width - MINIMAP_MARGIN, self.height - MINIMAP_MARGIN),
		};
		let visible = self.visible_rect();
		let content = self
			.nodes_bounds()
			.map(|b| b.union(&visible))
			.unwrap_or(visible);
		let scale = (MINIMAP_WIDTH / content.width().max(1.0)).min(MINIMAP_HEIGHT / content.height().max(1.0));
		let offset = Position::new(
			frame.min.x + (MINIMAP_WIDTH - content.width() * scale) / 2.0 - content.min.x * scale,
			frame.min.y + (MINIMAP_HEIGHT - content.height() * scale) / 2.0 - content.min.y * scale,
		);
		let mut layout = MinimapLayout {
			frame,
			scale,
			offset,
			viewport: visible,
		};
		layout.viewport = Rect {
			min: layout.project(visible.min),
			max: layout.project(visible.max),
		};
		layout
	}
}

/// Bezier from a bottom source handle down to a top target handle.
pub fn curve_between(source: Position, target: Position) -> Curve {
	let c = ((target.y - source.y).abs() * 0.5).max(25.0);
	[
		source,
		Position::new(source.x, source.y + c),
		Position::new(target.x, target.y - c),
		target,
	]
}
