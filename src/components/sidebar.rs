use leptos::prelude::*;
use web_sys::DragEvent;

use crate::components::flow::{InteractionController, NodeTemplate};

/// Palette of draggable node templates plus the pending-name field.
#[component]
pub fn Sidebar(controller: RwSignal<InteractionController>, templates: Vec<NodeTemplate>) -> impl IntoView {
	let cards = templates
		.into_iter()
		.map(|template| {
			let kind = template.kind;
			let on_dragstart = move |ev: DragEvent| {
				let started = controller.try_update(|c| c.on_drag_start(kind));
				if let (Some(transfer), Some((payload, effect))) = (ev.data_transfer(), started) {
					// Firefox refuses to start a drag with an empty data store.
					let (format, value) = payload.transfer_entry();
					let _ = transfer.set_data(format, value);
					transfer.set_effect_allowed(effect.as_str());
				}
			};
			view! {
				<div
					class="sidebar-template"
					draggable="true"
					on:dragstart=on_dragstart
					on:dragend=move |_| controller.update(|c| c.on_drag_end())
				>
					{template.label}
				</div>
			}
		})
		.collect_view();

	view! {
		<aside class="sidebar">
			<h2>"Flow Components"</h2>

			<div class="sidebar-field">
				<label for="node-name">"Node Name:"</label>
				<input
					id="node-name"
					type="text"
					placeholder="Enter node name"
					prop:value=move || controller.with(|c| c.pending_name().to_string())
					on:input=move |ev| {
						let value = event_target_value(&ev);
						controller.update(|c| c.set_pending_name(value));
					}
				/>
			</div>

			<div class="sidebar-templates">
				<p>"Drag to add:"</p>
				{cards}
			</div>

			<div class="sidebar-help">
				<h3>"Instructions:"</h3>
				<ul>
					<li>"Drag nodes from above to add them"</li>
					<li>"Connect nodes by dragging from handles"</li>
					<li>"Use the panel controls to zoom and pan"</li>
				</ul>
			</div>
		</aside>
	}
}
