use super::geometry::Vec2;

/// Recycles `Vec<Vec2>` scratch buffers between ticks.
#[derive(Debug, Default)]
pub struct VecPool {
	free: Vec<Vec<Vec2>>,
	#[cfg(test)]
	created: usize,
}

impl VecPool {
	/// Hands out an empty buffer, reusing a returned one when available.
	pub fn take(&mut self) -> Vec<Vec2> {
		match self.free.pop() {
			Some(mut buf) => {
				buf.clear();
				buf
			}
			None => {
				#[cfg(test)]
				{
					self.created += 1;
				}
				Vec::new()
			}
		}
	}

	pub fn give(&mut self, buf: Vec<Vec2>) {
		self.free.push(buf);
	}

	/// Number of buffers ever allocated by this pool.
	#[cfg(test)]
	pub fn created(&self) -> usize {
		self.created
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn returned_buffers_are_reused_and_cleared() {
		let mut pool = VecPool::default();
		let mut buf = pool.take();
		buf.push(Vec2::new(1.0, 2.0));
		let cap = buf.capacity();
		pool.give(buf);

		let again = pool.take();
		assert!(again.is_empty());
		assert_eq!(again.capacity(), cap);
		assert_eq!(pool.created(), 1);
	}
}
