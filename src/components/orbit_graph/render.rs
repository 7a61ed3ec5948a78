use super::config::Palette;
use super::state::{OrbitNode, SimulationContext};
use super::surface::Surface;
use super::tooltip::{self, LINE_HEIGHT, PADDING};
use super::types::{LinkStatus, NodeStatus, NodeType, TransferDirection};
use crate::util::{Rect, Vec2};

/// Nodes further than this outside the viewport are not drawn.
pub const CULL_PADDING: f64 = 100.0;
const GRID_SPACING: f64 = 40.0;
/// Grid drift in px per millisecond.
const GRID_SPEED: f64 = 0.01;
const FONT: &str = "12px sans-serif";
const TITLE_FONT: &str = "bold 13px sans-serif";
const ACTIVE_DASH: [f64; 2] = [8.0, 4.0];
const IDLE_DASH: [f64; 2] = [3.0, 6.0];
const ERROR_DASH: [f64; 2] = [2.0, 4.0];

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Grid offset in `[0, GRID_SPACING)`, driven by wall-clock time.
pub fn grid_phase(now: f64) -> f64 {
	(now * GRID_SPEED).rem_euclid(GRID_SPACING)
}

/// Indices of nodes inside the viewport grown by [`CULL_PADDING`].
pub fn visible_nodes(nodes: &[OrbitNode], viewport: Rect) -> Vec<usize> {
	let bounds = viewport.expand(CULL_PADDING);
	(0..nodes.len())
		.filter(|&i| bounds.contains(nodes[i].pos))
		.collect()
}

fn segment_visible(a: Vec2, b: Vec2, bounds: Rect) -> bool {
	a.x.max(b.x) >= bounds.x
		&& a.x.min(b.x) <= bounds.right()
		&& a.y.max(b.y) >= bounds.y
		&& a.y.min(b.y) <= bounds.bottom()
}

fn kind_color(kind: NodeType, palette: &Palette) -> &'static str {
	match kind {
		NodeType::SelfNode => palette.self_node,
		NodeType::Peer => palette.peer,
		NodeType::Institution => palette.institution,
		NodeType::Community => palette.community,
	}
}

fn status_color(status: NodeStatus, palette: &Palette) -> &'static str {
	match status {
		NodeStatus::Connected => palette.link_active,
		NodeStatus::Connecting => palette.link_idle,
		NodeStatus::Disconnected => palette.muted_text,
		NodeStatus::Error => palette.link_error,
	}
}

/// Paints one frame. Reads the simulation, never writes it.
pub fn render<S: Surface>(sim: &SimulationContext, surface: &S, now: f64) {
	let palette = sim.config.theme.palette();
	let view = sim.viewport;

	surface.save();
	surface.clear(view.width, view.height, palette.background);
	draw_grid(view, palette, surface, now);
	draw_links(sim, palette, surface, now);
	let visible = visible_nodes(&sim.nodes, view);
	draw_nodes(sim, &visible, palette, surface);
	draw_emphasis(sim, &visible, palette, surface);
	draw_overlay(sim, &visible, palette, surface, now);
	draw_tooltip(sim, palette, surface);
	surface.restore();
}

fn draw_grid<S: Surface>(view: Rect, palette: &Palette, surface: &S, now: f64) {
	let phase = grid_phase(now);
	surface.set_stroke(palette.grid);
	surface.set_line_width(1.0);
	surface.set_line_dash(&[], 0.0);
	surface.begin_path();
	let mut x = phase - GRID_SPACING;
	while x <= view.right() {
		surface.move_to(Vec2::new(x, view.y));
		surface.line_to(Vec2::new(x, view.bottom()));
		x += GRID_SPACING;
	}
	let mut y = phase - GRID_SPACING;
	while y <= view.bottom() {
		surface.move_to(Vec2::new(view.x, y));
		surface.line_to(Vec2::new(view.right(), y));
		y += GRID_SPACING;
	}
	surface.stroke();
}

fn draw_links<S: Surface>(sim: &SimulationContext, palette: &Palette, surface: &S, now: f64) {
	let bounds = sim.viewport.expand(CULL_PADDING);
	for link in &sim.links {
		let Some((a, b)) = link.endpoints() else {
			continue;
		};
		let (na, nb) = (&sim.nodes[a], &sim.nodes[b]);
		if !segment_visible(na.pos, nb.pos, bounds) {
			continue;
		}
		let delta = nb.pos - na.pos;
		let dist = delta.length();
		if dist < 0.001 {
			continue;
		}

		// Uploads and plain traffic flow source -> target, downloads run back.
		let (color, dash, offset) = match link.status {
			LinkStatus::Active => {
				let flow = match link.transfer {
					Some(TransferDirection::Download) => 1.0,
					_ => -1.0,
				};
				(
					palette.link_active,
					&ACTIVE_DASH[..],
					flow * (now * 0.03).rem_euclid(12.0),
				)
			}
			LinkStatus::Idle => (
				palette.link_idle,
				&IDLE_DASH[..],
				-(now * 0.005).rem_euclid(9.0),
			),
			LinkStatus::Error => (palette.link_error, &ERROR_DASH[..], 0.0),
		};

		let unit = delta / dist;
		let from = na.pos + unit * na.radius();
		let to = nb.pos - unit * nb.radius();
		surface.set_alpha(link.strength.max(0.15));
		surface.set_stroke_gradient(
			from,
			to,
			&[
				(0.0, kind_color(na.kind, palette)),
				(0.5, color),
				(1.0, kind_color(nb.kind, palette)),
			],
		);
		surface.set_line_width(1.0 + link.strength * 1.5);
		surface.set_line_dash(dash, offset);
		surface.begin_path();
		surface.move_to(from);
		surface.line_to(to);
		surface.stroke();
	}
	surface.set_alpha(1.0);
	surface.set_line_dash(&[], 0.0);
}

fn draw_nodes<S: Surface>(
	sim: &SimulationContext,
	visible: &[usize],
	palette: &Palette,
	surface: &S,
) {
	for &i in visible {
		let node = &sim.nodes[i];
		let radius = node.radius();
		let color = kind_color(node.kind, palette);
		if node.is_self() {
			surface.set_fill_radial(
				node.pos,
				radius * 0.5,
				radius * 2.6,
				&[(0.0, color), (1.0, "rgba(0, 0, 0, 0)")],
			);
			surface.begin_path();
			surface.circle(node.pos, radius * 2.6);
			surface.fill();
		}
		surface.set_fill(color);
		surface.begin_path();
		surface.circle(node.pos, radius);
		surface.fill();
	}

	// Status rings, one stroke per status.
	surface.set_line_width(2.0);
	for status in [
		NodeStatus::Connected,
		NodeStatus::Connecting,
		NodeStatus::Disconnected,
		NodeStatus::Error,
	] {
		let mut ring = visible
			.iter()
			.map(|&i| &sim.nodes[i])
			.filter(|n| n.status == status)
			.peekable();
		if ring.peek().is_none() {
			continue;
		}
		surface.set_stroke(status_color(status, palette));
		surface.begin_path();
		for node in ring {
			surface.circle(node.pos, node.radius() + 2.0);
		}
		surface.stroke();
	}

	surface.set_font(FONT);
	surface.set_fill(palette.text);
	for &i in visible {
		let node = &sim.nodes[i];
		let width = surface.measure_text(&node.label);
		surface.fill_text(
			&node.label,
			node.pos.x - width / 2.0,
			node.pos.y + node.radius() + 16.0,
		);
	}
}

fn draw_emphasis<S: Surface>(
	sim: &SimulationContext,
	visible: &[usize],
	palette: &Palette,
	surface: &S,
) {
	let gesture = &sim.gesture;
	let find = |id: Option<&str>| {
		let idx = sim.index_of(id?)?;
		visible.contains(&idx).then(|| &sim.nodes[idx])
	};

	if !gesture.is_dragging() {
		if let Some(node) = find(gesture.hovered.as_deref()) {
			let radius = node.radius();
			surface.set_fill_radial(
				node.pos,
				radius * 0.6,
				radius * 2.2,
				&[
					(0.0, "rgba(255, 255, 255, 0.35)"),
					(0.6, "rgba(200, 220, 255, 0.1)"),
					(1.0, "rgba(255, 255, 255, 0)"),
				],
			);
			surface.begin_path();
			surface.circle(node.pos, radius * 2.2);
			surface.fill();
		}
	}

	if let Some(node) = find(gesture.selected.as_deref()) {
		surface.set_stroke(palette.selection);
		surface.set_line_width(2.0);
		surface.begin_path();
		surface.circle(node.pos, node.radius() + 6.0);
		surface.stroke();
	}

	if let Some(node) = find(gesture.drag.dragged_node.as_deref()).filter(|n| n.is_being_dragged) {
		surface.set_stroke(palette.selection);
		surface.set_line_width(1.5);
		surface.set_line_dash(&[4.0, 4.0], 0.0);
		surface.begin_path();
		surface.circle(node.pos, node.radius() + 10.0);
		surface.stroke();
		surface.set_line_dash(&[], 0.0);
	}
}

/// Background box, border and text rows at `origin`. First row uses the
/// title font.
fn draw_panel<S: Surface>(
	lines: &[String],
	origin: Vec2,
	size: (f64, f64),
	palette: &Palette,
	surface: &S,
) {
	surface.set_fill(palette.panel);
	surface.begin_path();
	surface.rect(origin.x, origin.y, size.0, size.1);
	surface.fill();
	surface.set_stroke(palette.panel_border);
	surface.set_line_width(1.0);
	surface.stroke();

	for (row, line) in lines.iter().enumerate() {
		let (font, color) = if row == 0 {
			(TITLE_FONT, palette.text)
		} else {
			(FONT, palette.muted_text)
		};
		surface.set_font(font);
		surface.set_fill(color);
		surface.fill_text(
			line,
			origin.x + PADDING,
			origin.y + PADDING + LINE_HEIGHT * (row as f64 + 0.8),
		);
	}
}

fn draw_overlay<S: Surface>(
	sim: &SimulationContext,
	visible: &[usize],
	palette: &Palette,
	surface: &S,
	now: f64,
) {
	let expansion = &sim.gesture.expansion;
	let progress = expansion.progress(now);
	if progress <= 0.0 {
		return;
	}
	let Some(idx) = expansion.expanded_node().and_then(|id| sim.index_of(id)) else {
		return;
	};
	if !visible.contains(&idx) {
		return;
	}
	let node = &sim.nodes[idx];
	let t = ease_out_cubic(progress);

	let lines = tooltip::overlay_lines(node);
	surface.set_font(FONT);
	let (w, h) = tooltip::measure_box(&lines, |s| surface.measure_text(s));
	// Closing only fades; opening also grows into place.
	let scale = if expansion.is_expanding() || expansion.is_expanded() {
		0.85 + 0.15 * t
	} else {
		1.0
	};
	let size = (w * scale, h * scale);
	let origin = tooltip::place_tooltip(node.pos, size, sim.viewport);

	surface.set_alpha(t);
	surface.set_stroke(palette.panel_border);
	surface.set_line_width(1.0);
	surface.begin_path();
	surface.move_to(node.pos);
	surface.line_to(Vec2::new(
		node.pos.x.clamp(origin.x, origin.x + size.0),
		origin.y + size.1 / 2.0,
	));
	surface.stroke();
	draw_panel(&lines, origin, size, palette, surface);
	surface.set_alpha(1.0);
}

fn draw_tooltip<S: Surface>(sim: &SimulationContext, palette: &Palette, surface: &S) {
	let gesture = &sim.gesture;
	if gesture.is_dragging() {
		return;
	}
	let (Some(id), Some(pointer)) = (gesture.hovered.as_deref(), gesture.pointer) else {
		return;
	};
	let Some(node) = sim.node(id) else {
		return;
	};

	let lines = tooltip::tooltip_lines(node);
	surface.set_font(FONT);
	let size = tooltip::measure_box(&lines, |s| surface.measure_text(s));
	let origin = tooltip::place_tooltip(pointer, size, sim.viewport);
	draw_panel(&lines, origin, size, palette, surface);
}
