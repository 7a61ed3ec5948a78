//! Wall-clock helpers. Every function takes `now` in milliseconds so callers
//! can feed `performance.now()` in the browser and plain numbers in tests.

/// Lets a call through at most once per `interval_ms`.
#[derive(Clone, Debug)]
pub struct Throttle {
	interval_ms: f64,
	last: Option<f64>,
}

impl Throttle {
	pub fn new(interval_ms: f64) -> Self {
		Self {
			interval_ms,
			last: None,
		}
	}

	pub fn ready(&mut self, now: f64) -> bool {
		match self.last {
			Some(last) if now - last < self.interval_ms => false,
			_ => {
				self.last = Some(now);
				true
			}
		}
	}
}

/// Fires once after `quiet_ms` without a new trigger.
#[derive(Clone, Debug)]
pub struct Debounce {
	quiet_ms: f64,
	deadline: Option<f64>,
}

impl Debounce {
	pub fn new(quiet_ms: f64) -> Self {
		Self {
			quiet_ms,
			deadline: None,
		}
	}

	pub fn trigger(&mut self, now: f64) {
		self.deadline = Some(now + self.quiet_ms);
	}

	pub fn poll(&mut self, now: f64) -> bool {
		match self.deadline {
			Some(deadline) if now >= deadline => {
				self.deadline = None;
				true
			}
			_ => false,
		}
	}
}

pub const FRAME_BUDGET_MS: f64 = 1000.0 / 60.0;

/// Clamp on the per-frame delta so a backgrounded tab does not produce a
/// single huge step when it comes back.
const MAX_FRAME_DELTA_MS: f64 = 250.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTiming {
	pub dt_ms: f64,
	pub fps: f64,
	pub over_budget: bool,
}

/// Tracks frame pacing for the animation loop.
#[derive(Clone, Debug, Default)]
pub struct FrameScheduler {
	last: Option<f64>,
	fps: f64,
	frames: u64,
}

impl FrameScheduler {
	pub fn begin_frame(&mut self, now: f64) -> FrameTiming {
		let dt_ms = match self.last {
			Some(last) => (now - last).clamp(0.0, MAX_FRAME_DELTA_MS),
			None => FRAME_BUDGET_MS,
		};
		self.last = Some(now);
		self.frames += 1;

		if dt_ms > 0.0 {
			let instant = 1000.0 / dt_ms;
			self.fps = if self.fps == 0.0 {
				instant
			} else {
				self.fps * 0.9 + instant * 0.1
			};
		}

		FrameTiming {
			dt_ms,
			fps: self.fps,
			over_budget: dt_ms > FRAME_BUDGET_MS * 1.5,
		}
	}

	pub fn frames(&self) -> u64 {
		self.frames
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn throttle_blocks_calls_inside_interval() {
		let mut t = Throttle::new(16.0);
		assert!(t.ready(0.0));
		assert!(!t.ready(10.0));
		assert!(t.ready(16.0));
		assert!(!t.ready(20.0));
	}

	#[test]
	fn debounce_fires_once_after_quiet_period() {
		let mut d = Debounce::new(100.0);
		d.trigger(0.0);
		d.trigger(50.0);
		assert!(!d.poll(120.0));
		assert!(d.poll(150.0));
		assert!(!d.poll(300.0));
	}

	#[test]
	fn scheduler_clamps_long_gaps_and_flags_slow_frames() {
		let mut s = FrameScheduler::default();
		let first = s.begin_frame(1000.0);
		assert_eq!(first.dt_ms, FRAME_BUDGET_MS);
		assert!(!first.over_budget);

		let slow = s.begin_frame(6000.0);
		assert_eq!(slow.dt_ms, MAX_FRAME_DELTA_MS);
		assert!(slow.over_budget);
		assert_eq!(s.frames(), 2);
	}
}
