//! Browser entry point for the orbit mesh visualizer.

use orbit_graph_canvas::{App, init_logging};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App);
}
