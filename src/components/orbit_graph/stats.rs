use super::state::OrbitNode;
use super::types::NodeStatus;

/// Read-only aggregate for the stats panel. The self node is excluded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkStats {
	pub active_peers: usize,
	pub total_peers: usize,
	pub total_bandwidth: f64,
	pub average_latency: f64,
	/// `100 * active / total`, 0 for an empty network.
	pub health: f64,
}

impl NetworkStats {
	pub fn collect(nodes: &[OrbitNode]) -> Self {
		let peers = nodes.iter().filter(|n| !n.is_self());
		let mut stats = NetworkStats::default();
		let mut latency_sum = 0.0;
		for node in peers {
			stats.total_peers += 1;
			if node.status == NodeStatus::Connected {
				stats.active_peers += 1;
			}
			stats.total_bandwidth += node.display.bandwidth;
			latency_sum += node.display.latency;
		}
		if stats.total_peers > 0 {
			stats.average_latency = latency_sum / stats.total_peers as f64;
			stats.health = 100.0 * stats.active_peers as f64 / stats.total_peers as f64;
		}
		stats
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::orbit_graph::config::OrbitConfig;
	use crate::components::orbit_graph::state::SimulationContext;
	use crate::components::orbit_graph::state::tests::fixture;

	#[test]
	fn aggregates_non_self_nodes_only() {
		let raw = r#"{
			"nodes": [
				{ "id": "me", "label": "Me", "type": "self", "bandwidth": 1000, "latency": 1 },
				{ "id": "a", "label": "A", "type": "peer", "status": "connected", "bandwidth": 2.5, "latency": 40 },
				{ "id": "b", "label": "B", "type": "peer", "status": "error", "bandwidth": 1.5, "latency": 80 },
				{ "id": "c", "label": "C", "type": "community", "status": "connected", "latency": 60 },
				{ "id": "d", "label": "D", "type": "institution", "status": "connecting", "latency": 20 }
			]
		}"#;
		let ctx = SimulationContext::new(&fixture(raw), OrbitConfig::default(), 800.0, 600.0);
		let stats = NetworkStats::collect(&ctx.nodes);
		assert_eq!(stats.total_peers, 4);
		assert_eq!(stats.active_peers, 2);
		assert_eq!(stats.total_bandwidth, 4.0);
		assert_eq!(stats.average_latency, 50.0);
		assert_eq!(stats.health, 50.0);
	}

	#[test]
	fn lone_self_node_reports_zero_health() {
		let raw = r#"{ "nodes": [ { "id": "me", "label": "Me", "type": "self" } ] }"#;
		let ctx = SimulationContext::new(&fixture(raw), OrbitConfig::default(), 800.0, 600.0);
		assert_eq!(NetworkStats::collect(&ctx.nodes), NetworkStats::default());
	}
}
