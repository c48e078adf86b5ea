use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::config::FlowConfig;
use super::state::{
	FlowViewState, HANDLE_RADIUS, HandleKind, NODE_HEIGHT, NODE_WIDTH, ViewTransform, handle_position,
	node_rect,
};
use super::types::{Node, NodeKind, Position};

const BACKGROUND: &str = "#ffffff";
const DOT_COLOR: &str = "#91919a";
const EDGE_COLOR: &str = "#b1b1b7";
const EDGE_SELECTED: &str = "#555555";
const NODE_RADIUS: f64 = 3.0;

fn border_color(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Input => "#0041d0",
		NodeKind::Default => "#1a192b",
		NodeKind::Output => "#ff0072",
	}
}

pub fn render(state: &FlowViewState, config: &FlowConfig, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_background(state, config, ctx);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();

	draw_connection_line(state, ctx);
	if state.show_minimap {
		draw_minimap(state, ctx);
	}
}

/// Placement of background dots in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotGrid {
	/// First dot on the top-left of the viewport.
	pub origin: Position,
	pub gap: f64,
	pub radius: f64,
}

/// Dots on a grid that pans and scales with the viewport. `None` when too dense to draw.
pub fn dot_grid(transform: &ViewTransform, config: &FlowConfig) -> Option<DotGrid> {
	let gap = config.background_gap * transform.k;
	if gap < 2.0 {
		return None;
	}
	Some(DotGrid {
		origin: Position::new(transform.x.rem_euclid(gap), transform.y.rem_euclid(gap)),
		gap,
		radius: (config.background_size * transform.k).max(0.5),
	})
}

fn draw_background(state: &FlowViewState, config: &FlowConfig, ctx: &CanvasRenderingContext2d) {
	let Some(grid) = dot_grid(&state.transform, config) else {
		return;
	};
	ctx.set_fill_style_str(DOT_COLOR);
	ctx.begin_path();
	let mut y = grid.origin.y;
	while y < state.height {
		let mut x = grid.origin.x;
		while x < state.width {
			ctx.move_to(x + grid.radius, y);
			let _ = ctx.arc(x, y, grid.radius, 0.0, 2.0 * PI);
			x += grid.gap;
		}
		y += grid.gap;
	}
	ctx.fill();
}

fn draw_edges(state: &FlowViewState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	for edge in &state.edges {
		let Some(c) = state.edge_curve(edge) else {
			continue;
		};
		let (color, width) = if edge.selected {
			(EDGE_SELECTED, 2.0)
		} else {
			(EDGE_COLOR, 1.0)
		};
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(width / k.max(0.5));
		ctx.begin_path();
		ctx.move_to(c[0].x, c[0].y);
		ctx.bezier_curve_to(c[1].x, c[1].y, c[2].x, c[2].y, c[3].x, c[3].y);
		ctx.stroke();
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_nodes(state: &FlowViewState, ctx: &CanvasRenderingContext2d) {
	for node in &state.nodes {
		draw_node(state, node, ctx);
	}
}

fn draw_node(state: &FlowViewState, node: &Node, ctx: &CanvasRenderingContext2d) {
	let Position { x, y } = node.position;
	let hovered = state.hover.as_ref() == Some(&node.id);

	if node.selected || hovered {
		ctx.set_shadow_color(if node.selected {
			"rgba(0, 0, 0, 0.25)"
		} else {
			"rgba(0, 0, 0, 0.12)"
		});
		ctx.set_shadow_blur(6.0);
	}
	rounded_rect(ctx, x, y, NODE_WIDTH, NODE_HEIGHT, NODE_RADIUS);
	ctx.set_fill_style_str("#ffffff");
	ctx.fill();
	ctx.set_shadow_blur(0.0);
	ctx.set_shadow_color("transparent");

	ctx.set_stroke_style_str(border_color(node.kind));
	ctx.set_line_width(if node.selected { 1.5 } else { 1.0 });
	ctx.stroke();

	ctx.set_fill_style_str("#222222");
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text_with_max_width(
		&node.data.label,
		x + NODE_WIDTH / 2.0,
		y + NODE_HEIGHT / 2.0,
		NODE_WIDTH - 10.0,
	);

	for kind in [HandleKind::Source, HandleKind::Target] {
		let present = match kind {
			HandleKind::Source => node.kind.has_source_handle(),
			HandleKind::Target => node.kind.has_target_handle(),
		};
		if !present {
			continue;
		}
		let p = handle_position(node, kind);
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, HANDLE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str("#1a192b");
		ctx.fill();
		ctx.set_stroke_style_str("#ffffff");
		ctx.set_line_width(1.0);
		ctx.stroke();
	}
}

/// Dashed line from the handle being dragged to the pointer.
fn draw_connection_line(state: &FlowViewState, ctx: &CanvasRenderingContext2d) {
	let Some((id, kind)) = &state.connect.origin else {
		return;
	};
	let Some(node) = state.node(id) else {
		return;
	};
	let from = state.transform.flow_to_screen(handle_position(node, *kind));
	let to = state.connect.pointer;

	ctx.set_stroke_style_str(EDGE_SELECTED);
	ctx.set_line_width(1.0);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(5.0),
		&JsValue::from_f64(5.0),
	));
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(to.x, to.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_minimap(state: &FlowViewState, ctx: &CanvasRenderingContext2d) {
	let layout = state.minimap();
	let frame = layout.frame;

	ctx.set_fill_style_str("rgba(240, 240, 240, 0.9)");
	ctx.fill_rect(frame.min.x, frame.min.y, frame.width(), frame.height());

	ctx.save();
	ctx.begin_path();
	ctx.rect(frame.min.x, frame.min.y, frame.width(), frame.height());
	ctx.clip();

	ctx.set_fill_style_str("#e2e2e2");
	for node in &state.nodes {
		let r = node_rect(node);
		let (min, max) = (layout.project(r.min), layout.project(r.max));
		ctx.fill_rect(min.x, min.y, max.x - min.x, max.y - min.y);
	}

	let view = layout.viewport;
	ctx.set_stroke_style_str("rgba(80, 80, 80, 0.6)");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(view.min.x, view.min.y, view.width(), view.height());
	ctx.restore();

	ctx.set_stroke_style_str("#d0d0d0");
	ctx.stroke_rect(frame.min.x, frame.min.y, frame.width(), frame.height());
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dots_scale_and_follow_pan() {
		let config = FlowConfig::default();
		let grid = dot_grid(&ViewTransform { x: 30.0, y: -5.0, k: 2.0 }, &config).unwrap();
		assert_eq!(grid.gap, 24.0);
		assert_eq!(grid.radius, 2.0);
		assert_eq!(grid.origin, Position::new(6.0, 19.0));
	}

	#[test]
	fn dots_keep_a_visible_radius_and_vanish_when_dense() {
		let config = FlowConfig::default();
		let grid = dot_grid(&ViewTransform { x: 0.0, y: 0.0, k: 0.25 }, &config).unwrap();
		assert_eq!(grid.radius, 0.5);
		let dense = FlowConfig {
			background_gap: 1.0,
			..FlowConfig::default()
		};
		assert_eq!(dot_grid(&ViewTransform::default(), &dense), None);
	}
}
