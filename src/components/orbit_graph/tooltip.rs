use super::state::OrbitNode;
use super::types::{NodeStatus, NodeType, TransferDirection};
use crate::util::{Rect, Vec2};

/// Gap between the pointer and the tooltip box.
pub const POINTER_MARGIN: f64 = 15.0;
/// Minimum distance kept from the viewport edge.
pub const EDGE_INSET: f64 = 8.0;
pub const PADDING: f64 = 10.0;
pub const LINE_HEIGHT: f64 = 16.0;
const MAX_TRANSFER_LINES: usize = 4;

pub fn kind_label(kind: NodeType) -> &'static str {
	match kind {
		NodeType::SelfNode => "You",
		NodeType::Peer => "Peer",
		NodeType::Institution => "Institution",
		NodeType::Community => "Community",
	}
}

pub fn status_label(status: NodeStatus) -> &'static str {
	match status {
		NodeStatus::Connected => "connected",
		NodeStatus::Connecting => "connecting",
		NodeStatus::Disconnected => "disconnected",
		NodeStatus::Error => "error",
	}
}

/// Text rows for a hovered node. The first row is the title.
pub fn tooltip_lines(node: &OrbitNode) -> Vec<String> {
	let d = &node.display;
	let mut lines = vec![
		node.label.clone(),
		format!("{} · {}", kind_label(node.kind), status_label(node.status)),
		format!(
			"{} connections · {:.0} ms · {:.0}% reliable",
			node.connections,
			d.latency,
			d.reliability * 100.0
		),
		format!("Bandwidth {:.1} MB/s", d.bandwidth),
	];
	if let Some(context) = &d.cultural_context {
		lines.push(context.clone());
	}

	let transfers = d.extras.as_ref().map(|e| e.transfers.as_slice()).unwrap_or(&[]);
	if !transfers.is_empty() {
		lines.push(format!("Active transfers ({})", transfers.len()));
		for t in transfers.iter().take(MAX_TRANSFER_LINES) {
			let arrow = match t.direction {
				TransferDirection::Upload => "↑",
				TransferDirection::Download => "↓",
			};
			lines.push(format!(
				"  {arrow} {} {:.0}%",
				t.name,
				t.progress.clamp(0.0, 1.0) * 100.0
			));
		}
		if transfers.len() > MAX_TRANSFER_LINES {
			lines.push(format!("  +{} more", transfers.len() - MAX_TRANSFER_LINES));
		}
	}
	lines
}

/// Rows for the expansion overlay: capabilities, peer stats and every
/// transfer, uncapped.
pub fn overlay_lines(node: &OrbitNode) -> Vec<String> {
	let d = &node.display;
	let mut lines = vec![
		node.label.clone(),
		format!("{} · {}", kind_label(node.kind), status_label(node.status)),
		format!(
			"Latency {:.0} ms · Bandwidth {:.1} MB/s",
			d.latency, d.bandwidth
		),
	];
	let Some(extras) = &d.extras else {
		lines.push("No capabilities advertised".to_string());
		return lines;
	};

	if extras.capabilities.is_empty() {
		lines.push("No capabilities advertised".to_string());
	} else {
		lines.push(format!("Capabilities: {}", extras.capabilities.join(", ")));
	}
	if let Some(stats) = &extras.stats {
		lines.push(format!(
			"{} documents shared · up {:.1} h",
			stats.documents_shared, stats.uptime_hours
		));
	}
	for t in &extras.transfers {
		let verb = match t.direction {
			TransferDirection::Upload => "Sending",
			TransferDirection::Download => "Receiving",
		};
		lines.push(format!(
			"{verb} {} · {:.0}% · {:.0} KB/s",
			t.name,
			t.progress.clamp(0.0, 1.0) * 100.0,
			t.rate
		));
	}
	lines
}

/// Box size for the given rows, measured with `measure`.
pub fn measure_box(lines: &[String], measure: impl Fn(&str) -> f64) -> (f64, f64) {
	let widest = lines.iter().map(|l| measure(l)).fold(0.0, f64::max);
	(
		widest + PADDING * 2.0,
		lines.len() as f64 * LINE_HEIGHT + PADDING * 2.0,
	)
}

/// Top-left corner for a box of `size` next to `pointer`.
///
/// Order matters: default above-right, flip left on right overflow, flip
/// below on top overflow, then clamp both axes into the inset viewport.
pub fn place_tooltip(pointer: Vec2, size: (f64, f64), viewport: Rect) -> Vec2 {
	let (w, h) = size;
	let mut x = pointer.x + POINTER_MARGIN;
	let mut y = pointer.y - h - POINTER_MARGIN;

	if x + w > viewport.right() {
		x = pointer.x - w - POINTER_MARGIN;
	}
	if y < viewport.y {
		y = pointer.y + POINTER_MARGIN;
	}

	let max_x = (viewport.right() - w - EDGE_INSET).max(viewport.x + EDGE_INSET);
	let max_y = (viewport.bottom() - h - EDGE_INSET).max(viewport.y + EDGE_INSET);
	Vec2::new(
		x.clamp(viewport.x + EDGE_INSET, max_x),
		y.clamp(viewport.y + EDGE_INSET, max_y),
	)
}
