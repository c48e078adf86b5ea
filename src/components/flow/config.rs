/// How the store treats structurally questionable mutations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Validation {
	/// Accept everything: duplicate ids, dangling references, self-loops.
	#[default]
	Permissive,
	/// Reject duplicate node ids, unknown endpoints, self-loops and duplicate edges.
	Strict,
}

/// Tunables for the flow canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowConfig {
	/// Spacing of background dots, in flow units.
	pub background_gap: f64,
	/// Size of background dots, in flow units.
	pub background_size: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Frame all nodes once the canvas is mounted.
	pub fit_view: bool,
	/// Fraction of the viewport kept free around the nodes when fitting.
	pub fit_view_padding: f64,
	pub show_minimap: bool,
	pub show_controls: bool,
	pub validation: Validation,
}

impl Default for FlowConfig {
	fn default() -> Self {
		Self {
			background_gap: 12.0,
			background_size: 1.0,
			min_zoom: 0.5,
			max_zoom: 2.0,
			fit_view: true,
			fit_view_padding: 0.1,
			show_minimap: true,
			show_controls: true,
			validation: Validation::Permissive,
		}
	}
}
