use log::debug;

use super::interaction::GraphEvent;

pub const EXPAND_MS: f64 = 75.0;
pub const CLOSE_MS: f64 = 200.0;

#[derive(Clone, Debug, PartialEq)]
pub enum ExpansionPhase {
	Closed,
	Expanding { node: String, started: f64 },
	Expanded { node: String },
	Closing { node: String, started: f64 },
}

#[derive(Clone, Debug, PartialEq)]
enum Pending {
	Open(String),
	Close,
}

/// Overlay open/close machine: `closed -> expanding -> expanded -> closing
/// -> closed`. Requests arriving mid-transition are queued, latest wins, and
/// applied once the running transition finishes.
#[derive(Clone, Debug)]
pub struct Expansion {
	phase: ExpansionPhase,
	pending: Option<Pending>,
}

impl Default for Expansion {
	fn default() -> Self {
		Self {
			phase: ExpansionPhase::Closed,
			pending: None,
		}
	}
}

impl Expansion {
	/// Node the overlay belongs to in any phase but `Closed`.
	pub fn expanded_node(&self) -> Option<&str> {
		match &self.phase {
			ExpansionPhase::Closed => None,
			ExpansionPhase::Expanding { node, .. }
			| ExpansionPhase::Expanded { node }
			| ExpansionPhase::Closing { node, .. } => Some(node),
		}
	}

	pub fn is_expanding(&self) -> bool {
		matches!(self.phase, ExpansionPhase::Expanding { .. })
	}

	pub fn is_expanded(&self) -> bool {
		matches!(self.phase, ExpansionPhase::Expanded { .. })
	}

	/// True when a click on `id` should close rather than open.
	pub fn is_open_for(&self, id: &str) -> bool {
		match &self.phase {
			ExpansionPhase::Expanding { node, .. } | ExpansionPhase::Expanded { node } => {
				node == id && self.pending.is_none()
			}
			_ => false,
		}
	}

	/// Overlay visibility in `[0, 1]`.
	pub fn progress(&self, now: f64) -> f64 {
		match &self.phase {
			ExpansionPhase::Closed => 0.0,
			ExpansionPhase::Expanding { started, .. } => ((now - started) / EXPAND_MS).clamp(0.0, 1.0),
			ExpansionPhase::Expanded { .. } => 1.0,
			ExpansionPhase::Closing { started, .. } => {
				1.0 - ((now - started) / CLOSE_MS).clamp(0.0, 1.0)
			}
		}
	}

	fn start_expanding(&mut self, node: String, now: f64, events: &mut Vec<GraphEvent>) {
		debug!("expansion: opening {node}");
		events.push(GraphEvent::ExpansionOpened(node.clone()));
		self.phase = ExpansionPhase::Expanding { node, started: now };
	}

	fn start_closing(&mut self, node: String, now: f64) {
		debug!("expansion: closing {node}");
		self.phase = ExpansionPhase::Closing { node, started: now };
	}

	pub fn request_open(&mut self, id: &str, now: f64) -> Vec<GraphEvent> {
		let mut events = Vec::new();
		match self.phase.clone() {
			ExpansionPhase::Closed => self.start_expanding(id.to_string(), now, &mut events),
			ExpansionPhase::Expanded { node } => {
				if node != id {
					self.pending = Some(Pending::Open(id.to_string()));
					self.start_closing(node, now);
				}
			}
			ExpansionPhase::Expanding { node, .. } if node == id => self.pending = None,
			ExpansionPhase::Expanding { .. } | ExpansionPhase::Closing { .. } => {
				self.pending = Some(Pending::Open(id.to_string()));
			}
		}
		events
	}

	pub fn request_close(&mut self, now: f64) {
		match self.phase.clone() {
			ExpansionPhase::Expanded { node } => {
				self.pending = None;
				self.start_closing(node, now);
			}
			ExpansionPhase::Expanding { .. } => self.pending = Some(Pending::Close),
			ExpansionPhase::Closing { .. } | ExpansionPhase::Closed => self.pending = None,
		}
	}

	/// Completes any transition whose timer has elapsed.
	pub fn advance(&mut self, now: f64) -> Vec<GraphEvent> {
		let mut events = Vec::new();
		match self.phase.clone() {
			ExpansionPhase::Expanding { node, started } if now - started >= EXPAND_MS => {
				match self.pending.take() {
					Some(Pending::Close) => self.start_closing(node, now),
					Some(Pending::Open(next)) if next != node => {
						self.pending = Some(Pending::Open(next));
						self.start_closing(node, now);
					}
					_ => self.phase = ExpansionPhase::Expanded { node },
				}
			}
			ExpansionPhase::Closing { node, started } if now - started >= CLOSE_MS => {
				self.phase = ExpansionPhase::Closed;
				events.push(GraphEvent::ExpansionClosed(node));
				if let Some(Pending::Open(next)) = self.pending.take() {
					self.start_expanding(next, now, &mut events);
				}
			}
			_ => {}
		}
		events
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn runs_full_open_close_cycle_on_timers() {
		let mut ex = Expansion::default();
		assert_eq!(
			ex.request_open("a", 0.0),
			vec![GraphEvent::ExpansionOpened("a".into())]
		);
		assert!(ex.is_expanding());
		assert!(ex.advance(50.0).is_empty());
		assert!(ex.is_expanding());
		ex.advance(75.0);
		assert!(ex.is_expanded());
		assert_eq!(ex.expanded_node(), Some("a"));

		ex.request_close(100.0);
		assert!(matches!(ex.phase, ExpansionPhase::Closing { .. }));
		assert!((ex.progress(200.0) - 0.5).abs() < 1e-9);
		assert_eq!(
			ex.advance(300.0),
			vec![GraphEvent::ExpansionClosed("a".into())]
		);
		assert_eq!(&ex.phase, &ExpansionPhase::Closed);
	}

	#[test]
	fn switching_nodes_closes_first_then_opens_latest_request() {
		let mut ex = Expansion::default();
		ex.request_open("a", 0.0);
		ex.advance(80.0);

		assert!(ex.request_open("b", 100.0).is_empty());
		assert_eq!(ex.expanded_node(), Some("a"));
		// A newer request replaces the queued one.
		ex.request_open("c", 150.0);

		let events = ex.advance(300.0);
		assert_eq!(
			events,
			vec![
				GraphEvent::ExpansionClosed("a".into()),
				GraphEvent::ExpansionOpened("c".into()),
			]
		);
		assert!(ex.is_expanding());
		assert_eq!(ex.expanded_node(), Some("c"));
	}

	#[test]
	fn close_requested_while_expanding_runs_after_open_completes() {
		let mut ex = Expansion::default();
		ex.request_open("a", 0.0);
		ex.request_close(10.0);
		assert!(ex.is_expanding());
		ex.advance(75.0);
		assert!(matches!(ex.phase, ExpansionPhase::Closing { .. }));
		ex.advance(275.0);
		assert_eq!(&ex.phase, &ExpansionPhase::Closed);
	}

	#[test]
	fn close_during_closing_drops_queued_open() {
		let mut ex = Expansion::default();
		ex.request_open("a", 0.0);
		ex.advance(75.0);
		ex.request_open("b", 80.0);
		ex.request_close(90.0);
		assert_eq!(
			ex.advance(280.0),
			vec![GraphEvent::ExpansionClosed("a".into())]
		);
		assert_eq!(&ex.phase, &ExpansionPhase::Closed);
	}
}
