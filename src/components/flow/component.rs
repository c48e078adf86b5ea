use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::info;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, DragEvent, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::changes::{EdgeChange, NodeChange};
use super::config::FlowConfig;
use super::controller::{DropEffect, DropEvent};
use super::render;
use super::state::{Emitted, FlowViewState};
use super::types::{Bounds, Connection, Edge, Node, Position};

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((800.0, 600.0))
}

/// Canvas that renders a node/edge graph and reports changes through callbacks.
///
/// The component never owns the collections: every selection, move and
/// connection is handed to the caller, which feeds the result back in through
/// `nodes` and `edges`.
#[component]
pub fn FlowCanvas(
	#[prop(into)] nodes: Signal<Vec<Node>>,
	#[prop(into)] edges: Signal<Vec<Edge>>,
	#[prop(into)] on_nodes_change: Callback<Vec<NodeChange>>,
	#[prop(into)] on_edges_change: Callback<Vec<EdgeChange>>,
	#[prop(into)] on_connect: Callback<Connection>,
	#[prop(into)] on_drop: Callback<DropEvent>,
	#[prop(into)] on_drag_over: Callback<(), DropEffect>,
	#[prop(optional)] config: FlowConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let config = Rc::new(config);
	let state: Rc<RefCell<Option<FlowViewState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init, config_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), config.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Ok(Some(ctx)) = canvas.get_context("2d") else {
			return;
		};
		let Ok(ctx) = ctx.dyn_into::<CanvasRenderingContext2d>() else {
			return;
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		*state_init.borrow_mut() = Some(FlowViewState::new(
			nodes.get_untracked(),
			edges.get_untracked(),
			w,
			h,
			&config_init,
		));
		info!("flow canvas mounted at {w}x{h}");

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, config_anim) =
			(state_init.clone(), animate_init.clone(), config_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.dirty {
					render::render(s, &config_anim, &ctx);
					s.dirty = false;
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_sync = state.clone();
	Effect::new(move |_| {
		let (n, e) = (nodes.get(), edges.get());
		if let Some(ref mut s) = *state_sync.borrow_mut() {
			s.sync(n, e);
		}
	});

	let dispatch = move |emitted: Emitted| {
		if !emitted.node_changes.is_empty() {
			on_nodes_change.run(emitted.node_changes);
		}
		if !emitted.edge_changes.is_empty() {
			on_edges_change.run(emitted.edge_changes);
		}
		if let Some(connection) = emitted.connection {
			on_connect.run(connection);
		}
	};

	let local = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local(&ev) else {
			return;
		};
		let emitted = match state_md.borrow_mut().as_mut() {
			Some(s) => s.pointer_down(x, y),
			None => return,
		};
		dispatch(emitted);
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local(&ev) else {
			return;
		};
		let emitted = match state_mm.borrow_mut().as_mut() {
			Some(s) => s.pointer_move(x, y),
			None => return,
		};
		dispatch(emitted);
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local(&ev) else {
			return;
		};
		let emitted = match state_mu.borrow_mut().as_mut() {
			Some(s) => s.pointer_up(x, y),
			None => return,
		};
		dispatch(emitted);
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let emitted = match state_ml.borrow_mut().as_mut() {
			Some(s) => s.pointer_leave(),
			None => return,
		};
		dispatch(emitted);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	let on_dragover = move |ev: DragEvent| {
		ev.prevent_default();
		let effect = on_drag_over.run(());
		if let Some(transfer) = ev.data_transfer() {
			transfer.set_drop_effect(effect.as_str());
		}
	};

	let on_dropped = move |ev: DragEvent| {
		ev.prevent_default();
		let bounds = canvas_ref.get().map(|canvas| {
			let rect = canvas.get_bounding_client_rect();
			Bounds {
				left: rect.left(),
				top: rect.top(),
			}
		});
		on_drop.run(DropEvent {
			client: Position::new(ev.client_x() as f64, ev.client_y() as f64),
			bounds,
		});
	};

	let controls = config.show_controls.then(|| {
		let (locked, set_locked) = signal(false);
		let (state_zi, state_zo, state_fv, state_lk) =
			(state.clone(), state.clone(), state.clone(), state.clone());
		let padding = config.fit_view_padding;
		view! {
			<div class="flow-controls">
				<button
					title="zoom in"
					on:click=move |_| {
						if let Some(ref mut s) = *state_zi.borrow_mut() {
							s.zoom_in();
						}
					}
				>
					"+"
				</button>
				<button
					title="zoom out"
					on:click=move |_| {
						if let Some(ref mut s) = *state_zo.borrow_mut() {
							s.zoom_out();
						}
					}
				>
					"−"
				</button>
				<button
					title="fit view"
					on:click=move |_| {
						if let Some(ref mut s) = *state_fv.borrow_mut() {
							s.fit_view(padding);
						}
					}
				>
					"⤢"
				</button>
				<button
					title="toggle interactivity"
					on:click=move |_| {
						let interactive = state_lk.borrow_mut().as_mut().map(|s| s.toggle_interactive());
						if let Some(interactive) = interactive {
							set_locked.set(!interactive);
						}
					}
				>
					{move || if locked.get() { "🔒" } else { "🔓" }}
				</button>
			</div>
		}
	});

	view! {
		<div class="flow-canvas">
			<canvas
				node_ref=canvas_ref
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:dragover=on_dragover
				on:drop=on_dropped
				style="display: block; cursor: grab;"
			/>
			{controls}
		</div>
	}
}
