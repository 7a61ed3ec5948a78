use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::f64::consts::TAU;
use std::hash::{Hash, Hasher};

use log::{info, warn};

use super::config::OrbitConfig;
use super::interaction::{self, CursorHint, GestureState, GraphEvent};
use super::physics::{self, DragTarget, PhysicsScratch};
use super::types::{
	GraphData, LinkStatus, NodeExtras, NodeStatus, NodeType, TransferDirection,
};
use crate::util::{Rect, Vec2};

pub const BASE_NODE_SIZE: f64 = 12.0;
pub const SIZE_PER_CONNECTION: f64 = 1.5;

/// Display-only fields of a node.
#[derive(Clone, Debug, Default)]
pub struct NodeDisplay {
	pub bandwidth: f64,
	pub latency: f64,
	pub reliability: f64,
	pub cultural_context: Option<String>,
	pub extras: Option<NodeExtras>,
}

/// A node as the simulation sees it: kinematics always present, display
/// material tucked away in [`NodeDisplay`].
#[derive(Clone, Debug)]
pub struct OrbitNode {
	pub id: String,
	pub label: String,
	pub kind: NodeType,
	pub status: NodeStatus,
	pub connections: u32,
	pub pos: Vec2,
	/// Pointer velocity while dragged, zero otherwise.
	pub vx: f64,
	pub vy: f64,
	pub angle: f64,
	pub orbit_radius: f64,
	/// Radians per tick, sign is the orbit direction.
	pub orbit_speed: f64,
	pub is_being_dragged: bool,
	pub display: NodeDisplay,
}

impl OrbitNode {
	pub fn is_self(&self) -> bool {
		self.kind == NodeType::SelfNode
	}

	/// Drawn radius, also the base of the hit radius.
	pub fn radius(&self) -> f64 {
		BASE_NODE_SIZE + self.connections as f64 * SIZE_PER_CONNECTION
	}
}

#[derive(Clone, Debug)]
pub struct OrbitLink {
	pub source_id: String,
	pub target_id: String,
	/// `None` when the fixture names a node that does not exist.
	pub source: Option<usize>,
	pub target: Option<usize>,
	pub strength: f64,
	pub bandwidth: f64,
	pub latency: f64,
	pub status: LinkStatus,
	pub transfer: Option<TransferDirection>,
}

impl OrbitLink {
	pub fn touches(&self, index: usize) -> bool {
		self.source == Some(index) || self.target == Some(index)
	}

	pub fn endpoints(&self) -> Option<(usize, usize)> {
		Some((self.source?, self.target?))
	}
}

/// Everything one visualizer instance owns: node and link stores, gesture
/// state and physics scratch space.
pub struct SimulationContext {
	pub nodes: Vec<OrbitNode>,
	pub links: Vec<OrbitLink>,
	pub self_idx: usize,
	pub config: OrbitConfig,
	pub viewport: Rect,
	pub gesture: GestureState,
	index_by_id: HashMap<String, usize>,
	scratch: PhysicsScratch,
}

/// Deterministic value in `[-1, 1]` derived from a node id.
fn stable_unit(id: &str) -> f64 {
	let mut hasher = DefaultHasher::new();
	id.hash(&mut hasher);
	let hash = hasher.finish();
	((hash & 0xffff_ffff) as f64 / u32::MAX as f64) * 2.0 - 1.0
}

impl SimulationContext {
	/// Builds the simulation from a validated fixture. Nodes without explicit
	/// kinematics are spread across the configured orbit band.
	pub fn new(data: &GraphData, config: OrbitConfig, width: f64, height: f64) -> Self {
		let viewport = Rect::new(0.0, 0.0, width, height);
		let center = viewport.center();

		let index_by_id: HashMap<String, usize> = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		let self_idx = data
			.nodes
			.iter()
			.position(|n| n.kind == NodeType::SelfNode)
			.unwrap_or(0);

		for err in data.dangling_links() {
			warn!("skipping link: {err}");
		}
		let links: Vec<OrbitLink> = data
			.links
			.iter()
			.map(|l| OrbitLink {
				source_id: l.source.clone(),
				target_id: l.target.clone(),
				source: index_by_id.get(&l.source).copied(),
				target: index_by_id.get(&l.target).copied(),
				strength: l.strength.clamp(0.0, 1.0),
				bandwidth: l.bandwidth,
				latency: l.latency,
				status: l.status,
				transfer: l.transfer,
			})
			.collect();

		let orbiters = data.nodes.len().saturating_sub(1).max(1);
		let band = (config.max_orbit_radius - config.min_orbit_radius).max(0.0);
		let mut slot = 0usize;
		let nodes = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| {
				let is_self = i == self_idx;
				let (orbit_radius, angle, orbit_speed) = if is_self {
					(0.0, 0.0, 0.0)
				} else {
					let fraction = if orbiters > 1 {
						slot as f64 / (orbiters - 1) as f64
					} else {
						0.5
					};
					let radius = n
						.orbit_radius
						.unwrap_or(config.min_orbit_radius + band * fraction)
						.clamp(config.min_orbit_radius, config.max_orbit_radius);
					let angle = n.angle.unwrap_or(TAU * slot as f64 / orbiters as f64);
					let speed = n.orbit_speed.unwrap_or_else(|| {
						let magnitude = config.base_orbit_speed
							+ config.speed_variation * stable_unit(&n.id);
						magnitude.abs()
							* physics::speed_multiplier(radius, config.min_orbit_radius)
					});
					let connected = physics::is_connected(i, &links);
					slot += 1;
					(radius, angle, physics::direction_corrected(speed, connected))
				};
				OrbitNode {
					id: n.id.clone(),
					label: n.label.clone(),
					kind: n.kind,
					status: n.status,
					connections: n.connections,
					pos: center + Vec2::from_polar(orbit_radius, angle),
					vx: 0.0,
					vy: 0.0,
					angle,
					orbit_radius,
					orbit_speed,
					is_being_dragged: false,
					display: NodeDisplay {
						bandwidth: n.bandwidth,
						latency: n.latency,
						reliability: n.reliability,
						cultural_context: n.cultural_context.clone(),
						extras: n.extras.clone(),
					},
				}
			})
			.collect();

		info!(
			"orbit graph ready: {} nodes, {} links, {}x{}",
			data.nodes.len(),
			links.len(),
			width,
			height
		);

		Self {
			nodes,
			links,
			self_idx,
			config,
			viewport,
			gesture: GestureState::default(),
			index_by_id,
			scratch: PhysicsScratch::default(),
		}
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index_by_id.get(id).copied()
	}

	pub fn node(&self, id: &str) -> Option<&OrbitNode> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	pub fn self_node(&self) -> &OrbitNode {
		&self.nodes[self.self_idx]
	}

	/// Advances timers and physics by one frame.
	pub fn tick(&mut self, now: f64) -> Vec<GraphEvent> {
		let events = self.gesture.advance(now);
		let drag = self
			.gesture
			.drag_target()
			.and_then(|(id, position)| Some(DragTarget {
				index: self.index_of(id)?,
				position,
			}));
		physics::step(
			&mut self.nodes,
			&self.links,
			self.self_idx,
			drag,
			&self.config,
			&mut self.scratch,
		);
		events
	}

	pub fn hit(&self, pos: Vec2) -> Option<&OrbitNode> {
		interaction::hit_test(&self.nodes, pos).map(|i| &self.nodes[i])
	}

	pub fn pointer_down(&mut self, pos: Vec2) {
		self.gesture.pointer_down(&self.nodes, pos);
	}

	pub fn pointer_move(&mut self, pos: Vec2, now: f64) -> CursorHint {
		self.gesture.pointer_move(&mut self.nodes, pos, now)
	}

	pub fn pointer_up(&mut self, now: f64) {
		self.gesture.pointer_up(&mut self.nodes, now);
	}

	pub fn pointer_leave(&mut self, now: f64) {
		self.gesture.pointer_leave(&mut self.nodes, now);
	}

	pub fn click(&mut self, pos: Vec2, now: f64) -> Vec<GraphEvent> {
		self.gesture.click(&self.nodes, pos, now)
	}

	/// Node positions are in display pixels, so only the visible rectangle
	/// changes. Drag offsets are node-relative and survive untouched.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport = Rect::new(0.0, 0.0, width, height);
		info!("orbit graph resized to {width}x{height}");
	}

	/// Moves the self node back to the viewport center. Orbiters follow on
	/// the next tick.
	pub fn recenter(&mut self) -> GraphEvent {
		let center = self.viewport.center();
		self.nodes[self.self_idx].pos = center;
		info!("recentered self node at ({:.0}, {:.0})", center.x, center.y);
		GraphEvent::RecenterAcknowledged
	}
}

#[cfg(test)]
pub(super) mod tests {
	use super::*;

	pub(crate) fn fixture(raw: &str) -> GraphData {
		GraphData::from_json(raw).unwrap()
	}

	pub(crate) const SMALL_MESH: &str = r#"{
		"nodes": [
			{ "id": "me", "label": "You", "type": "self", "connections": 2 },
			{ "id": "a", "label": "A", "type": "peer", "connections": 1 },
			{ "id": "b", "label": "B", "type": "community" },
			{ "id": "c", "label": "C", "type": "institution", "orbitRadius": 999, "orbitSpeed": 0.01 }
		],
		"links": [
			{ "source": "me", "target": "a", "status": "active" },
			{ "source": "me", "target": "b", "status": "error" },
			{ "source": "c", "target": "nowhere", "status": "idle" }
		]
	}"#;

	#[test]
	fn seeds_orbits_inside_band_with_direction_from_connectivity() {
		let cfg = OrbitConfig::default();
		let ctx = SimulationContext::new(&fixture(SMALL_MESH), cfg.clone(), 800.0, 600.0);

		let me = ctx.self_node();
		assert_eq!(me.pos, Vec2::new(400.0, 300.0));
		assert_eq!(me.orbit_radius, 0.0);

		for node in ctx.nodes.iter().filter(|n| !n.is_self()) {
			assert!(node.orbit_radius >= cfg.min_orbit_radius);
			assert!(node.orbit_radius <= cfg.max_orbit_radius);
			let dist = node.pos.distance(me.pos);
			assert!((dist - node.orbit_radius).abs() < 1e-9);
		}
		assert!(ctx.node("a").unwrap().orbit_speed > 0.0);
		assert!(ctx.node("b").unwrap().orbit_speed < 0.0);
		// The idle link still counts even though its other end is missing.
		assert_eq!(ctx.node("c").unwrap().orbit_speed, 0.01);
		assert_eq!(ctx.node("c").unwrap().orbit_radius, cfg.max_orbit_radius);
	}

	#[test]
	fn dangling_link_keeps_resolved_endpoint_only() {
		let ctx = SimulationContext::new(&fixture(SMALL_MESH), OrbitConfig::default(), 800.0, 600.0);
		let link = &ctx.links[2];
		assert_eq!(link.source, ctx.index_of("c"));
		assert_eq!(link.target, None);
		assert_eq!(link.endpoints(), None);
	}

	#[test]
	fn recenter_moves_self_to_viewport_center() {
		let mut ctx =
			SimulationContext::new(&fixture(SMALL_MESH), OrbitConfig::default(), 800.0, 600.0);
		let idx = ctx.self_idx;
		ctx.nodes[idx].pos = Vec2::new(10.0, 10.0);
		ctx.resize(1000.0, 500.0);
		assert_eq!(ctx.recenter(), GraphEvent::RecenterAcknowledged);
		assert_eq!(ctx.self_node().pos, Vec2::new(500.0, 250.0));
	}

	#[test]
	fn node_radius_grows_with_connections() {
		let ctx = SimulationContext::new(&fixture(SMALL_MESH), OrbitConfig::default(), 800.0, 600.0);
		assert_eq!(ctx.node("b").unwrap().radius(), BASE_NODE_SIZE);
		assert_eq!(ctx.node("me").unwrap().radius(), BASE_NODE_SIZE + 3.0);
	}

	#[test]
	fn click_after_drag_is_swallowed_until_cooldown_passes() {
		use super::interaction::CLICK_COOLDOWN_MS;

		let mut ctx =
			SimulationContext::new(&fixture(SMALL_MESH), OrbitConfig::default(), 800.0, 600.0);
		let start = ctx.node("a").unwrap().pos;

		ctx.pointer_down(start);
		assert_eq!(ctx.pointer_move(start + Vec2::new(60.0, 0.0), 0.0), CursorHint::Grabbing);
		assert!(ctx.node("a").unwrap().is_being_dragged);
		ctx.tick(16.0);
		assert!(ctx.node("a").unwrap().pos.x > start.x);

		ctx.pointer_up(20.0);
		let released = ctx.node("a").unwrap().pos;
		assert!(ctx.click(released, 30.0).is_empty());
		assert_eq!(ctx.gesture.selected, None);

		ctx.tick(20.0 + CLICK_COOLDOWN_MS + 1.0);
		let pos = ctx.node("a").unwrap().pos;
		let events = ctx.click(pos, 20.0 + CLICK_COOLDOWN_MS + 2.0);
		assert!(events.contains(&GraphEvent::SelectionChanged(Some("a".into()))));
		assert!(events.contains(&GraphEvent::ExpansionOpened("a".into())));
	}
}
