use std::collections::HashMap;

use super::geometry::Vec2;

/// Uniform bucket grid for neighbour queries.
///
/// Buckets are kept between rebuilds so a steady node count stops allocating
/// after the first few ticks.
#[derive(Debug, Default)]
pub struct SpatialGrid {
	cell_size: f64,
	buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
	fn cell_of(&self, p: Vec2) -> (i64, i64) {
		(
			(p.x / self.cell_size).floor() as i64,
			(p.y / self.cell_size).floor() as i64,
		)
	}

	pub fn rebuild(&mut self, positions: &[Vec2], cell_size: f64) {
		self.cell_size = cell_size.max(1.0);
		for bucket in self.buckets.values_mut() {
			bucket.clear();
		}
		for (index, &p) in positions.iter().enumerate() {
			if !p.x.is_finite() || !p.y.is_finite() {
				continue;
			}
			let cell = self.cell_of(p);
			self.buckets.entry(cell).or_default().push(index);
		}
		self.buckets.retain(|_, bucket| !bucket.is_empty());
	}

	/// Pushes every index whose cell overlaps the square around `center`.
	/// Callers still filter by exact distance.
	pub fn query(&self, center: Vec2, radius: f64, out: &mut Vec<usize>) {
		out.clear();
		let (min_x, min_y) = self.cell_of(center - Vec2::new(radius, radius));
		let (max_x, max_y) = self.cell_of(center + Vec2::new(radius, radius));
		for cx in min_x..=max_x {
			for cy in min_y..=max_y {
				if let Some(bucket) = self.buckets.get(&(cx, cy)) {
					out.extend_from_slice(bucket);
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn query_finds_neighbours_across_cell_borders() {
		let positions = [
			Vec2::new(9.0, 9.0),
			Vec2::new(11.0, 11.0),
			Vec2::new(19.5, 0.5),
			Vec2::new(-1.0, -1.0),
			Vec2::new(500.0, 500.0),
		];
		let mut grid = SpatialGrid::default();
		grid.rebuild(&positions, 10.0);

		let mut out = Vec::new();
		grid.query(Vec2::new(10.0, 10.0), 10.0, &mut out);
		out.sort_unstable();
		// (-1, -1) sits in cell (-1, -1), outside the queried square.
		assert_eq!(out, vec![0, 1, 2]);
	}

	#[test]
	fn rebuild_forgets_previous_positions() {
		let mut grid = SpatialGrid::default();
		grid.rebuild(&[Vec2::new(0.0, 0.0)], 10.0);
		grid.rebuild(&[Vec2::new(1000.0, 0.0)], 10.0);

		let mut out = Vec::new();
		grid.query(Vec2::ZERO, 5.0, &mut out);
		assert!(out.is_empty());
	}

	#[test]
	fn non_finite_positions_are_not_indexed() {
		let mut grid = SpatialGrid::default();
		grid.rebuild(&[Vec2::new(f64::NAN, 0.0), Vec2::new(1.0, 1.0)], 10.0);

		let mut out = Vec::new();
		grid.query(Vec2::ZERO, 5.0, &mut out);
		assert_eq!(out, vec![1]);
	}
}
