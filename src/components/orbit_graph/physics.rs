//! Orbital kinematics with soft pairwise repulsion.
//!
//! Every non-self node chases a target on its orbit around the self node. The
//! target is pushed outward by neighbours inside the atmosphere radius, and
//! the node lerps toward it with a factor that shrinks as crowding rises.

use super::config::OrbitConfig;
use super::state::{OrbitLink, OrbitNode};
use super::types::LinkStatus;
use crate::util::{SpatialGrid, Vec2, VecPool};

const SPEED_FALLOFF: f64 = 0.7;
const BASE_LERP: f64 = 0.1;
const CROWDED_INFLUENCE: f64 = 0.7;
const CROWDED_MULTIPLIER: f64 = 8.0;
const NORMAL_MULTIPLIER: f64 = 4.0;

/// Where the pointer wants a dragged node this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragTarget {
	pub index: usize,
	pub position: Vec2,
}

/// Buffers reused across ticks.
#[derive(Debug, Default)]
pub struct PhysicsScratch {
	grid: SpatialGrid,
	pool: VecPool,
	neighbours: Vec<usize>,
}

/// A node is connected while any touching link is active or idle.
pub fn is_connected(index: usize, links: &[OrbitLink]) -> bool {
	links.iter().any(|l| {
		l.touches(index) && matches!(l.status, LinkStatus::Active | LinkStatus::Idle)
	})
}

/// Connected nodes orbit clockwise (non-negative speed), the rest
/// counterclockwise.
pub fn direction_corrected(speed: f64, connected: bool) -> f64 {
	if connected { speed.abs() } else { -speed.abs() }
}

/// `(min_radius / max(distance, min_radius)) ^ 0.7`, at most 1.
pub fn speed_multiplier(distance: f64, min_radius: f64) -> f64 {
	if min_radius <= 0.0 {
		return 1.0;
	}
	(min_radius / distance.max(min_radius)).powf(SPEED_FALLOFF)
}

/// Push a node receives from one neighbour, plus that neighbour's atmosphere
/// influence in `(0, 1]`. `None` outside the atmosphere.
///
/// Coincident nodes get a fixed direction derived from their index pair so
/// the two forces stay antiparallel and the pair separates.
pub fn pair_repulsion(
	at: Vec2,
	from: Vec2,
	at_index: usize,
	from_index: usize,
	config: &OrbitConfig,
) -> Option<(Vec2, f64)> {
	let atmosphere = config.atmosphere_radius;
	if atmosphere <= 0.0 {
		return None;
	}
	let delta = at - from;
	let distance = delta.length();
	if distance >= atmosphere {
		return None;
	}

	let (lo, hi) = (at_index.min(from_index), at_index.max(from_index));
	let split = Vec2::from_polar(
		1.0,
		((lo as f64) * 0.618_034 + (hi as f64) * 0.414_214) * std::f64::consts::TAU,
	);
	let fallback = if at_index < from_index { split } else { -split };
	let direction = delta.normalized_or(fallback);

	let penetration = 1.0 - distance / atmosphere;
	// The emergency term is added on top of the atmosphere force, so inside
	// `min_safe_distance` the push is always stronger than the plain falloff.
	let mut magnitude = config.max_repulsion_force * penetration * penetration;
	if distance < config.min_safe_distance {
		let emergency = 1.0 - distance / config.min_safe_distance;
		magnitude += config.emergency_repulsion * emergency.powf(1.5);
	}
	Some((direction * magnitude, penetration))
}

/// Places the dragged node under the pointer. Non-self nodes get their orbit
/// rebuilt from the drop point so releasing them resumes a consistent orbit.
fn apply_drag(
	nodes: &mut [OrbitNode],
	links: &[OrbitLink],
	self_idx: usize,
	drag: DragTarget,
	config: &OrbitConfig,
) {
	let self_pos = nodes[self_idx].pos;
	let node = &mut nodes[drag.index];
	let moved = drag.position - node.pos;
	node.pos = drag.position;
	node.vx = moved.x;
	node.vy = moved.y;
	if drag.index == self_idx {
		return;
	}

	let relative = drag.position - self_pos;
	let radius = relative
		.length()
		.clamp(config.min_orbit_radius, config.max_orbit_radius);
	node.orbit_radius = radius;
	node.angle = relative.angle();
	let speed = config.base_orbit_speed * speed_multiplier(radius, config.min_orbit_radius);
	node.orbit_speed = direction_corrected(speed, is_connected(drag.index, links));
}

/// Advances every node by one tick.
pub fn step(
	nodes: &mut [OrbitNode],
	links: &[OrbitLink],
	self_idx: usize,
	drag: Option<DragTarget>,
	config: &OrbitConfig,
	scratch: &mut PhysicsScratch,
) {
	if self_idx >= nodes.len() {
		return;
	}
	let drag = drag.filter(|d| d.index < nodes.len());
	if let Some(drag) = drag {
		apply_drag(nodes, links, self_idx, drag, config);
	}
	if !drag.is_some_and(|d| d.index == self_idx) {
		let me = &mut nodes[self_idx];
		me.vx = 0.0;
		me.vy = 0.0;
	}

	let self_pos = nodes[self_idx].pos;
	let mut positions = scratch.pool.take();
	positions.extend(nodes.iter().map(|n| n.pos));
	scratch.grid.rebuild(&positions, config.atmosphere_radius);

	for (i, node) in nodes.iter_mut().enumerate() {
		if i == self_idx || drag.is_some_and(|d| d.index == i) {
			continue;
		}
		node.vx = 0.0;
		node.vy = 0.0;

		node.orbit_speed = direction_corrected(node.orbit_speed, is_connected(i, links));
		let current = positions[i];
		let adjusted = node.orbit_speed
			* speed_multiplier(current.distance(self_pos), config.min_orbit_radius);
		node.angle += adjusted;
		let target = self_pos + Vec2::from_polar(node.orbit_radius, node.angle);

		let mut repulsion = Vec2::ZERO;
		let mut max_influence: f64 = 0.0;
		scratch
			.grid
			.query(current, config.atmosphere_radius, &mut scratch.neighbours);
		for &j in &scratch.neighbours {
			if j == i {
				continue;
			}
			if let Some((force, influence)) =
				pair_repulsion(current, positions[j], i, j, config)
			{
				repulsion += force;
				max_influence = max_influence.max(influence);
			}
		}

		let multiplier = if max_influence > CROWDED_INFLUENCE {
			CROWDED_MULTIPLIER
		} else {
			NORMAL_MULTIPLIER
		};
		let final_target = target + repulsion * multiplier;
		let lerp = BASE_LERP * (1.0 - max_influence * 0.5);
		node.pos = current.lerp(final_target, lerp);
	}

	scratch.pool.give(positions);
}
