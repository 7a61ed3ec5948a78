use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

/// Problems found while loading a topology fixture.
#[derive(Error, Debug)]
pub enum GraphError {
	#[error("invalid graph fixture: {0}")]
	Decode(#[from] serde_json::Error),

	#[error("graph must contain exactly one self node, found {0}")]
	SelfNodeCount(usize),

	#[error("duplicate node id: {0}")]
	DuplicateNode(String),

	#[error("link {source_id} -> {target_id} references unknown node {missing}")]
	DanglingLink {
		source_id: String,
		target_id: String,
		missing: String,
	},
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
	#[serde(rename = "self")]
	SelfNode,
	Peer,
	Institution,
	Community,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
	#[default]
	Connected,
	Connecting,
	Disconnected,
	Error,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
	#[default]
	Active,
	Idle,
	Error,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
	Upload,
	Download,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Transfer {
	pub name: String,
	pub direction: TransferDirection,
	/// Completion in `[0, 1]`.
	#[serde(default)]
	pub progress: f64,
	/// KB/s.
	#[serde(default)]
	pub rate: f64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeerStats {
	#[serde(default)]
	pub documents_shared: u32,
	#[serde(default)]
	pub uptime_hours: f64,
}

/// Tooltip and overlay material. Never read by physics or hit-testing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeExtras {
	#[serde(default)]
	pub transfers: Vec<Transfer>,
	#[serde(default)]
	pub capabilities: Vec<String>,
	#[serde(default)]
	pub stats: Option<PeerStats>,
}

/// A peer as it appears in a topology fixture. Kinematics are optional and
/// seeded when missing.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	#[serde(rename = "type")]
	pub kind: NodeType,
	#[serde(default)]
	pub status: NodeStatus,
	#[serde(default)]
	pub connections: u32,
	#[serde(default)]
	pub bandwidth: f64,
	#[serde(default)]
	pub latency: f64,
	#[serde(default)]
	pub reliability: f64,
	#[serde(default)]
	pub cultural_context: Option<String>,
	#[serde(default)]
	pub angle: Option<f64>,
	#[serde(default)]
	pub orbit_radius: Option<f64>,
	#[serde(default)]
	pub orbit_speed: Option<f64>,
	#[serde(default)]
	pub extras: Option<NodeExtras>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	#[serde(default = "default_strength")]
	pub strength: f64,
	#[serde(default)]
	pub bandwidth: f64,
	#[serde(default)]
	pub latency: f64,
	#[serde(default)]
	pub status: LinkStatus,
	#[serde(default)]
	pub transfer: Option<TransferDirection>,
}

fn default_strength() -> f64 {
	0.6
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// Parses and validates a JSON fixture.
	pub fn from_json(raw: &str) -> Result<Self, GraphError> {
		let data: GraphData = serde_json::from_str(raw)?;
		data.validate()?;
		Ok(data)
	}

	/// Checks the structural invariants the simulation relies on. Dangling
	/// links are tolerated here and reported by [`GraphData::dangling_links`].
	pub fn validate(&self) -> Result<(), GraphError> {
		let self_count = self
			.nodes
			.iter()
			.filter(|n| n.kind == NodeType::SelfNode)
			.count();
		if self_count != 1 {
			return Err(GraphError::SelfNodeCount(self_count));
		}

		let mut seen = HashSet::new();
		for node in &self.nodes {
			if !seen.insert(node.id.as_str()) {
				return Err(GraphError::DuplicateNode(node.id.clone()));
			}
		}
		Ok(())
	}

	pub fn dangling_links(&self) -> Vec<GraphError> {
		let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
		self.links
			.iter()
			.filter_map(|link| {
				let missing = [&link.source, &link.target]
					.into_iter()
					.find(|id| !ids.contains(id.as_str()))?;
				Some(GraphError::DanglingLink {
					source_id: link.source.clone(),
					target_id: link.target.clone(),
					missing: missing.clone(),
				})
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const FIXTURE: &str = r#"{
		"nodes": [
			{ "id": "me", "label": "You", "type": "self", "connections": 3 },
			{ "id": "a", "label": "Archive", "type": "institution", "status": "connecting",
			  "culturalContext": "Oral histories",
			  "extras": { "transfers": [ { "name": "map.tiff", "direction": "download", "progress": 0.4 } ] } }
		],
		"links": [
			{ "source": "me", "target": "a", "status": "idle", "transfer": "download" },
			{ "source": "me", "target": "ghost" }
		]
	}"#;

	#[test]
	fn parses_fixture_with_optional_fields() {
		let data = GraphData::from_json(FIXTURE).unwrap();
		assert_eq!(data.nodes[0].kind, NodeType::SelfNode);
		assert_eq!(data.nodes[1].status, NodeStatus::Connecting);
		assert_eq!(data.nodes[1].cultural_context.as_deref(), Some("Oral histories"));
		let extras = data.nodes[1].extras.as_ref().unwrap();
		assert_eq!(extras.transfers[0].direction, TransferDirection::Download);
		assert_eq!(data.links[1].status, LinkStatus::Active);
		assert_eq!(data.links[1].strength, 0.6);
	}

	#[test]
	fn reports_dangling_links_without_failing() {
		let data = GraphData::from_json(FIXTURE).unwrap();
		let dangling = data.dangling_links();
		assert_eq!(dangling.len(), 1);
		assert!(matches!(
			&dangling[0],
			GraphError::DanglingLink { missing, .. } if missing == "ghost"
		));
	}

	#[test]
	fn rejects_graphs_without_exactly_one_self_node() {
		let raw = r#"{ "nodes": [ { "id": "p", "label": "P", "type": "peer" } ] }"#;
		assert!(matches!(
			GraphData::from_json(raw),
			Err(GraphError::SelfNodeCount(0))
		));
	}

	#[test]
	fn rejects_duplicate_ids() {
		let raw = r#"{ "nodes": [
			{ "id": "me", "label": "Me", "type": "self" },
			{ "id": "me", "label": "Again", "type": "peer" }
		] }"#;
		assert!(matches!(
			GraphData::from_json(raw),
			Err(GraphError::DuplicateNode(id)) if id == "me"
		));
	}

	#[test]
	fn bundled_mesh_fixture_loads() {
		let data = GraphData::from_json(include_str!("../../../fixtures/mesh.json")).unwrap();
		assert_eq!(data.nodes.len(), 9);
		assert_eq!(data.dangling_links().len(), 1);
	}
}
