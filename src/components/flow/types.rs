use std::fmt;

/// Identifier of a node in the diagram.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Identifier of an edge, conventionally `e<source>-<target>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub String);

impl EdgeId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for EdgeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// The three node flavours. They differ only in which handles they expose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// Source handle only.
	Input,
	/// Both handles.
	#[default]
	Default,
	/// Target handle only.
	Output,
}

impl NodeKind {
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Input => "input",
			NodeKind::Default => "default",
			NodeKind::Output => "output",
		}
	}

	/// Title-cased kind followed by " Node", e.g. "Input Node".
	pub fn default_label(self) -> String {
		let name = self.as_str();
		let mut chars = name.chars();
		match chars.next() {
			Some(first) => format!("{}{} Node", first.to_uppercase(), chars.as_str()),
			None => "Node".into(),
		}
	}

	pub fn has_source_handle(self) -> bool {
		!matches!(self, NodeKind::Output)
	}

	pub fn has_target_handle(self) -> bool {
		!matches!(self, NodeKind::Input)
	}
}

/// A point in flow coordinates (or screen coordinates, depending on context).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Position) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeData {
	pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	pub kind: NodeKind,
	/// Top-left corner in flow coordinates.
	pub position: Position,
	pub data: NodeData,
	pub selected: bool,
}

impl Node {
	pub fn new(id: impl Into<String>, kind: NodeKind, position: Position, label: impl Into<String>) -> Self {
		Self {
			id: NodeId::new(id),
			kind,
			position,
			data: NodeData {
				label: label.into(),
			},
			selected: false,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub id: EdgeId,
	pub source: NodeId,
	pub target: NodeId,
	pub selected: bool,
}

impl Edge {
	pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			id: EdgeId::new(id),
			source: NodeId::new(source),
			target: NodeId::new(target),
			selected: false,
		}
	}
}

/// A proposed edge, reported when a handle drag is released on another handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
	pub source: NodeId,
	pub target: NodeId,
}

impl Connection {
	#[cfg(test)]
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: NodeId::new(source),
			target: NodeId::new(target),
		}
	}
}

/// A resolved client rectangle (`getBoundingClientRect`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
	pub left: f64,
	pub top: f64,
}

/// A draggable entry in the sidebar palette.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeTemplate {
	pub kind: NodeKind,
	pub label: &'static str,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_labels_are_title_cased() {
		assert_eq!(NodeKind::Input.default_label(), "Input Node");
		assert_eq!(NodeKind::Default.default_label(), "Default Node");
		assert_eq!(NodeKind::Output.default_label(), "Output Node");
	}

	#[test]
	fn handles_follow_kind() {
		assert!(NodeKind::Input.has_source_handle());
		assert!(!NodeKind::Input.has_target_handle());
		assert!(NodeKind::Default.has_source_handle() && NodeKind::Default.has_target_handle());
		assert!(!NodeKind::Output.has_source_handle());
		assert!(NodeKind::Output.has_target_handle());
	}
}
