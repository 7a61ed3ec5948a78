use leptos::prelude::*;
use log::info;

use crate::components::orbit_graph::{GraphData, GraphEvent, OrbitConfig, OrbitGraphCanvas, Theme};

const MESH_FIXTURE: &str = include_str!("../../fixtures/mesh.json");

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = OrbitConfig {
		theme: Theme::Dark,
		..OrbitConfig::default()
	};
	let on_event = Callback::new(|event: GraphEvent| match event {
		GraphEvent::SelectionChanged(Some(id)) => info!("selected {id}"),
		GraphEvent::SelectionChanged(None) => info!("selection cleared"),
		GraphEvent::ExpansionOpened(id) => info!("details opened for {id}"),
		GraphEvent::ExpansionClosed(id) => info!("details closed for {id}"),
		GraphEvent::RecenterAcknowledged => info!("view recentered"),
	});

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
			<div class="fullscreen-graph">
				{GraphData::from_json(MESH_FIXTURE)
					.map(|data| {
						view! { <OrbitGraphCanvas data=data config=config.clone() on_event=on_event /> }
					})}
				<div class="graph-overlay">
					<h1>"Mesh Orbit"</h1>
					<p class="subtitle">
						"Drag peers to change their orbit. Click for details. Double-click empty space to recenter."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
