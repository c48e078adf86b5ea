use leptos::prelude::*;

use crate::components::flow::{
	Connection, DiagramStore, DropEvent, Edge, EdgeChange, FlowCanvas, FlowConfig,
	InteractionController, Node, NodeChange, NodeKind, NodeTemplate, Position,
};
use crate::components::sidebar::Sidebar;

/// A three-step chain: Start -> Process -> End.
pub fn initial_nodes() -> Vec<Node> {
	vec![
		Node::new("1", NodeKind::Input, Position::new(250.0, 25.0), "Start"),
		Node::new("2", NodeKind::Default, Position::new(250.0, 125.0), "Process"),
		Node::new("3", NodeKind::Output, Position::new(250.0, 225.0), "End"),
	]
}

pub fn initial_edges() -> Vec<Edge> {
	vec![Edge::new("e1-2", "1", "2"), Edge::new("e2-3", "2", "3")]
}

/// Entries offered by the sidebar palette.
pub fn node_templates() -> Vec<NodeTemplate> {
	vec![
		NodeTemplate {
			kind: NodeKind::Input,
			label: "Input Node",
		},
		NodeTemplate {
			kind: NodeKind::Default,
			label: "Process Node",
		},
		NodeTemplate {
			kind: NodeKind::Output,
			label: "Output Node",
		},
	]
}

/// Default Home Page: sidebar palette next to the flow canvas.
#[component]
pub fn Home() -> impl IntoView {
	let config = FlowConfig::default();
	let store = RwSignal::new(DiagramStore::new(initial_nodes(), initial_edges(), config.validation));
	let controller = RwSignal::new(InteractionController::new());

	let nodes = Signal::derive(move || store.with(|s| s.nodes().to_vec()));
	let edges = Signal::derive(move || store.with(|s| s.edges().to_vec()));

	let on_nodes_change = Callback::new(move |changes: Vec<NodeChange>| {
		store.update(|s| s.apply_node_changes(&changes));
	});
	let on_edges_change = Callback::new(move |changes: Vec<EdgeChange>| {
		store.update(|s| s.apply_edge_changes(&changes));
	});
	let on_connect = Callback::new(move |connection: Connection| {
		store.update(|s| {
			controller.with_untracked(|c| c.on_connect(s, &connection));
		});
	});
	let on_drop = Callback::new(move |event: DropEvent| {
		controller.update(|c| {
			store.update(|s| {
				c.on_drop(s, event);
			});
		});
	});
	let on_drag_over = Callback::new(move |_: ()| controller.with_untracked(|c| c.on_drag_over()));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="flow-app">
				<Sidebar controller=controller templates=node_templates() />
				<div class="flow-main">
					<FlowCanvas
						nodes=nodes
						edges=edges
						on_nodes_change=on_nodes_change
						on_edges_change=on_edges_change
						on_connect=on_connect
						on_drop=on_drop
						on_drag_over=on_drag_over
						config=config
					/>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn seed_is_a_three_node_chain() {
		let nodes = initial_nodes();
		let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["1", "2", "3"]);
		let kinds: Vec<_> = nodes.iter().map(|n| n.kind).collect();
		assert_eq!(kinds, [NodeKind::Input, NodeKind::Default, NodeKind::Output]);

		let edges = initial_edges();
		assert_eq!(edges.len(), 2);
		assert_eq!(edges[0].id.as_str(), "e1-2");
		assert_eq!(edges[1].id.as_str(), "e2-3");
		assert_eq!((edges[0].source.as_str(), edges[0].target.as_str()), ("1", "2"));
		assert_eq!((edges[1].source.as_str(), edges[1].target.as_str()), ("2", "3"));
	}

	#[test]
	fn templates_cover_every_kind() {
		let labels: Vec<_> = node_templates().iter().map(|t| (t.kind, t.label)).collect();
		assert_eq!(
			labels,
			[
				(NodeKind::Input, "Input Node"),
				(NodeKind::Default, "Process Node"),
				(NodeKind::Output, "Output Node"),
			]
		);
	}
}
