//! Pointer gestures: hover, press-drag-release, click to expand.
//!
//! Handlers only mutate gesture fields here plus `is_being_dragged` on the
//! node. Positions are left to physics, which reads [`GestureState::drag_target`]
//! on the next tick.

use log::debug;

use super::expansion::Expansion;
use super::state::OrbitNode;
use crate::util::{Throttle, Vec2};

/// Extra slack around a node's drawn radius for hover and click.
pub const HIT_PADDING: f64 = 4.0;
/// Pointer travel before a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 15.0;
/// Window after a drag release during which the trailing click is swallowed.
pub const CLICK_COOLDOWN_MS: f64 = 250.0;
pub const HOVER_INTERVAL_MS: f64 = 16.0;

/// Notifications for the surrounding UI.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	SelectionChanged(Option<String>),
	ExpansionOpened(String),
	ExpansionClosed(String),
	RecenterAcknowledged,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorHint {
	#[default]
	Default,
	Pointer,
	Grabbing,
}

impl CursorHint {
	pub fn css(self) -> &'static str {
		match self {
			CursorHint::Default => "default",
			CursorHint::Pointer => "pointer",
			CursorHint::Grabbing => "grabbing",
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub is_dragging: bool,
	/// Looked up by id each tick, never held as an index.
	pub dragged_node: Option<String>,
	/// Pointer minus node origin at press time.
	pub drag_offset: Vec2,
	pub drag_start_position: Vec2,
	/// Sticky once the threshold is crossed, cleared when the cooldown ends
	/// or the next press starts.
	pub has_dragged_distance: bool,
}

impl DragState {
	fn is_armed(&self) -> bool {
		self.dragged_node.is_some()
	}
}

/// First node in array order whose padded radius contains `pos`.
pub fn hit_test(nodes: &[OrbitNode], pos: Vec2) -> Option<usize> {
	nodes
		.iter()
		.position(|n| n.pos.distance(pos) < n.radius() + HIT_PADDING)
}

#[derive(Clone, Debug)]
pub struct GestureState {
	pub drag: DragState,
	pub hovered: Option<String>,
	pub selected: Option<String>,
	pub expansion: Expansion,
	pub pointer: Option<Vec2>,
	pub cursor: CursorHint,
	hover_throttle: Throttle,
	suppress_click_until: Option<f64>,
}

impl Default for GestureState {
	fn default() -> Self {
		Self {
			drag: DragState::default(),
			hovered: None,
			selected: None,
			expansion: Expansion::default(),
			pointer: None,
			cursor: CursorHint::Default,
			hover_throttle: Throttle::new(HOVER_INTERVAL_MS),
			suppress_click_until: None,
		}
	}
}

impl GestureState {
	pub fn pointer_down(&mut self, nodes: &[OrbitNode], pos: Vec2) {
		self.pointer = Some(pos);
		// Any trailing click from an earlier drag has been delivered by now.
		self.suppress_click_until = None;
		self.drag = DragState::default();

		if let Some(idx) = hit_test(nodes, pos) {
			let node = &nodes[idx];
			self.drag.dragged_node = Some(node.id.clone());
			self.drag.drag_offset = pos - node.pos;
			self.drag.drag_start_position = pos;
		}
	}

	pub fn pointer_move(&mut self, nodes: &mut [OrbitNode], pos: Vec2, now: f64) -> CursorHint {
		self.pointer = Some(pos);

		if self.drag.is_armed() {
			if !self.drag.is_dragging && self.drag.drag_start_position.distance(pos) > DRAG_THRESHOLD
			{
				self.drag.is_dragging = true;
				self.drag.has_dragged_distance = true;
				self.hovered = None;
				if let Some(node) = self.dragged_mut(nodes) {
					node.is_being_dragged = true;
					debug!("drag committed on {}", node.id);
				}
			}
			if self.drag.is_dragging {
				self.cursor = CursorHint::Grabbing;
			}
			return self.cursor;
		}

		if self.hover_throttle.ready(now) {
			self.hovered = hit_test(nodes, pos).map(|i| nodes[i].id.clone());
			self.cursor = if self.hovered.is_some() {
				CursorHint::Pointer
			} else {
				CursorHint::Default
			};
		}
		self.cursor
	}

	pub fn pointer_up(&mut self, nodes: &mut [OrbitNode], now: f64) {
		if self.drag.has_dragged_distance {
			self.suppress_click_until = Some(now + CLICK_COOLDOWN_MS);
		}
		if let Some(node) = self.dragged_mut(nodes) {
			node.is_being_dragged = false;
		}
		self.drag.is_dragging = false;
		self.drag.dragged_node = None;
		if self.cursor == CursorHint::Grabbing {
			self.cursor = CursorHint::Pointer;
		}
	}

	pub fn pointer_leave(&mut self, nodes: &mut [OrbitNode], now: f64) {
		self.pointer_up(nodes, now);
		self.pointer = None;
		self.hovered = None;
		self.cursor = CursorHint::Default;
	}

	/// Capture-phase check. Returns true when the click must be cancelled;
	/// a swallowed click consumes the suppression.
	pub fn intercept_click(&mut self, now: f64) -> bool {
		match self.suppress_click_until {
			Some(until) if now <= until => {
				self.suppress_click_until = None;
				self.drag.has_dragged_distance = false;
				true
			}
			_ => false,
		}
	}

	/// Bubble-phase click handler. Runs the suppression check again in case
	/// the capture listener never saw the event.
	pub fn click(&mut self, nodes: &[OrbitNode], pos: Vec2, now: f64) -> Vec<GraphEvent> {
		if self.intercept_click(now) {
			return Vec::new();
		}

		let mut events = Vec::new();
		match hit_test(nodes, pos).map(|i| nodes[i].id.clone()) {
			Some(id) if self.expansion.is_open_for(&id) => {
				self.expansion.request_close(now);
			}
			Some(id) => {
				events.extend(self.expansion.request_open(&id, now));
				self.set_selected(Some(id), &mut events);
			}
			None => {
				self.expansion.request_close(now);
				self.set_selected(None, &mut events);
			}
		}
		events
	}

	fn set_selected(&mut self, id: Option<String>, events: &mut Vec<GraphEvent>) {
		if self.selected != id {
			self.selected = id.clone();
			events.push(GraphEvent::SelectionChanged(id));
		}
	}

	/// Timer-driven transitions: expansion phases and the click cooldown.
	pub fn advance(&mut self, now: f64) -> Vec<GraphEvent> {
		if self.suppress_click_until.is_some_and(|until| now > until) {
			self.suppress_click_until = None;
			self.drag.has_dragged_distance = false;
		}
		self.expansion.advance(now)
	}

	/// Dragged node id and where its origin should be.
	pub fn drag_target(&self) -> Option<(&str, Vec2)> {
		if !self.drag.is_dragging {
			return None;
		}
		let id = self.drag.dragged_node.as_deref()?;
		let pointer = self.pointer?;
		Some((id, pointer - self.drag.drag_offset))
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_dragging
	}

	fn dragged_mut<'a>(&self, nodes: &'a mut [OrbitNode]) -> Option<&'a mut OrbitNode> {
		let id = self.drag.dragged_node.as_deref()?;
		nodes.iter_mut().find(|n| n.id == id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::orbit_graph::config::OrbitConfig;
	use crate::components::orbit_graph::state::SimulationContext;
	use crate::components::orbit_graph::state::tests::{SMALL_MESH, fixture};

	fn ctx() -> SimulationContext {
		SimulationContext::new(&fixture(SMALL_MESH), OrbitConfig::default(), 800.0, 600.0)
	}

	fn pos_of(ctx: &SimulationContext, id: &str) -> Vec2 {
		ctx.node(id).unwrap().pos
	}

	#[test]
	fn hit_test_uses_connection_scaled_radius_and_array_order() {
		let ctx = ctx();
		let me = pos_of(&ctx, "me");
		let me_radius = ctx.node("me").unwrap().radius() + HIT_PADDING;
		assert_eq!(hit_test(&ctx.nodes, me + Vec2::new(me_radius - 0.5, 0.0)), Some(0));
		assert_eq!(hit_test(&ctx.nodes, me + Vec2::new(me_radius + 0.5, 0.0)), None);

		let mut overlapping = ctx.nodes.clone();
		overlapping[1].pos = me;
		assert_eq!(hit_test(&overlapping, me), Some(0));
	}

	#[test]
	fn hover_updates_are_throttled() {
		let mut ctx = ctx();
		let a = pos_of(&ctx, "a");
		let g = &mut ctx.gesture;
		assert_eq!(g.pointer_move(&mut ctx.nodes, a, 0.0), CursorHint::Pointer);
		assert_eq!(g.hovered.as_deref(), Some("a"));
		// Too soon, the old hover sticks.
		g.pointer_move(&mut ctx.nodes, Vec2::new(-500.0, -500.0), 5.0);
		assert_eq!(g.hovered.as_deref(), Some("a"));
		assert_eq!(
			g.pointer_move(&mut ctx.nodes, Vec2::new(-500.0, -500.0), 20.0),
			CursorHint::Default
		);
		assert_eq!(g.hovered, None);
	}

	#[test]
	fn stationary_press_never_suppresses_its_click() {
		let mut ctx = ctx();
		let a = pos_of(&ctx, "a");
		ctx.gesture.pointer_down(&ctx.nodes, a);
		ctx.gesture.pointer_up(&mut ctx.nodes, 10.0);
		assert!(!ctx.gesture.drag.has_dragged_distance);
		assert!(!ctx.gesture.intercept_click(11.0));

		let events = ctx.gesture.click(&ctx.nodes, a, 11.0);
		assert!(events.contains(&GraphEvent::ExpansionOpened("a".into())));
		assert!(events.contains(&GraphEvent::SelectionChanged(Some("a".into()))));
	}

	#[test]
	fn small_jitter_stays_below_drag_threshold() {
		let mut ctx = ctx();
		let a = pos_of(&ctx, "a");
		ctx.gesture.pointer_down(&ctx.nodes, a);
		ctx.gesture
			.pointer_move(&mut ctx.nodes, a + Vec2::new(10.0, 10.0), 5.0);
		assert!(!ctx.gesture.is_dragging());
		assert!(ctx.gesture.drag_target().is_none());
	}

	#[test]
	fn drag_is_sticky_and_swallows_trailing_click() {
		let mut ctx = ctx();
		let a = pos_of(&ctx, "a");
		let g = &mut ctx.gesture;
		g.pointer_down(&ctx.nodes, a + Vec2::new(2.0, 0.0));
		g.pointer_move(&mut ctx.nodes, a + Vec2::new(40.0, 0.0), 10.0);
		assert!(g.is_dragging());
		assert!(ctx.nodes[1].is_being_dragged);

		// Returning near the start keeps the flag.
		g.pointer_move(&mut ctx.nodes, a + Vec2::new(3.0, 0.0), 20.0);
		assert!(g.drag.has_dragged_distance);
		let (id, target) = g.drag_target().unwrap();
		assert_eq!(id, "a");
		assert!(target.distance(a + Vec2::new(1.0, 0.0)) < 1e-9);

		g.pointer_up(&mut ctx.nodes, 30.0);
		assert!(!ctx.nodes[1].is_being_dragged);
		assert!(g.drag_target().is_none());

		// Capture phase swallows it and ends the drag gesture.
		assert!(g.intercept_click(35.0));
		assert!(!g.drag.has_dragged_distance);
		// A second click goes through.
		assert!(!g.intercept_click(36.0));
	}

	#[test]
	fn fallback_handler_suppresses_when_capture_missed() {
		let mut ctx = ctx();
		let a = pos_of(&ctx, "a");
		ctx.gesture.pointer_down(&ctx.nodes, a);
		ctx.gesture
			.pointer_move(&mut ctx.nodes, a + Vec2::new(0.0, 30.0), 10.0);
		ctx.gesture.pointer_up(&mut ctx.nodes, 20.0);

		let events = ctx.gesture.click(&ctx.nodes, a, 25.0);
		assert!(events.is_empty());
		assert_eq!(ctx.gesture.expansion.expanded_node(), None);
		assert_eq!(ctx.gesture.selected, None);
	}

	#[test]
	fn click_after_cooldown_is_processed() {
		let mut ctx = ctx();
		let a = pos_of(&ctx, "a");
		ctx.gesture.pointer_down(&ctx.nodes, a);
		ctx.gesture
			.pointer_move(&mut ctx.nodes, a + Vec2::new(0.0, 30.0), 10.0);
		ctx.gesture.pointer_up(&mut ctx.nodes, 20.0);

		let later = 20.0 + CLICK_COOLDOWN_MS + 1.0;
		ctx.gesture.advance(later);
		assert!(!ctx.gesture.drag.has_dragged_distance);
		let events = ctx.gesture.click(&ctx.nodes, a, later);
		assert!(events.contains(&GraphEvent::ExpansionOpened("a".into())));
	}

	#[test]
	fn clicking_expanded_node_closes_and_empty_click_clears_selection() {
		let mut ctx = ctx();
		let a = pos_of(&ctx, "a");
		ctx.gesture.click(&ctx.nodes, a, 0.0);
		ctx.gesture.advance(100.0);
		assert!(ctx.gesture.expansion.is_expanded());

		ctx.gesture.click(&ctx.nodes, a, 200.0);
		let events = ctx.gesture.advance(400.0);
		assert_eq!(events, vec![GraphEvent::ExpansionClosed("a".into())]);
		assert_eq!(ctx.gesture.selected.as_deref(), Some("a"));

		let events = ctx.gesture.click(&ctx.nodes, Vec2::new(-900.0, -900.0), 500.0);
		assert_eq!(events, vec![GraphEvent::SelectionChanged(None)]);
	}

	#[test]
	fn pointer_leave_ends_drag_and_hover() {
		let mut ctx = ctx();
		let a = pos_of(&ctx, "a");
		ctx.gesture.pointer_down(&ctx.nodes, a);
		ctx.gesture
			.pointer_move(&mut ctx.nodes, a + Vec2::new(50.0, 0.0), 10.0);
		ctx.gesture.pointer_leave(&mut ctx.nodes, 20.0);
		assert!(!ctx.gesture.is_dragging());
		assert_eq!(ctx.gesture.pointer, None);
		assert_eq!(ctx.gesture.cursor, CursorHint::Default);
	}

	#[test]
	fn tick_moves_dragged_node_under_pointer() {
		let mut ctx = ctx();
		let a = pos_of(&ctx, "a");
		ctx.gesture.pointer_down(&ctx.nodes, a + Vec2::new(3.0, 4.0));
		let to = Vec2::new(100.0, 80.0);
		ctx.gesture.pointer_move(&mut ctx.nodes, to, 10.0);
		ctx.tick(16.0);
		assert!(pos_of(&ctx, "a").distance(to - Vec2::new(3.0, 4.0)) < 1e-9);

		// Resizing mid-drag leaves the node-relative offset intact.
		ctx.resize(400.0, 300.0);
		ctx.gesture.pointer_move(&mut ctx.nodes, to + Vec2::new(10.0, 0.0), 20.0);
		ctx.tick(32.0);
		assert!(pos_of(&ctx, "a").distance(Vec2::new(107.0, 76.0)) < 1e-9);
	}
}
