use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Point or displacement in display pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
	pub x: f64,
	pub y: f64,
}

impl Vec2 {
	pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn from_polar(radius: f64, angle: f64) -> Self {
		Self::new(radius * angle.cos(), radius * angle.sin())
	}

	fn length_sq(self) -> f64 {
		self.x * self.x + self.y * self.y
	}

	pub fn length(self) -> f64 {
		self.length_sq().sqrt()
	}

	pub fn distance(self, other: Self) -> f64 {
		(self - other).length()
	}

	pub fn angle(self) -> f64 {
		self.y.atan2(self.x)
	}

	pub fn lerp(self, target: Self, t: f64) -> Self {
		self + (target - self) * t
	}

	/// Unit vector, or `fallback` when the length is too small to divide by.
	pub fn normalized_or(self, fallback: Self) -> Self {
		let len = self.length();
		if len > f64::EPSILON { self / len } else { fallback }
	}
}

impl Add for Vec2 {
	type Output = Self;
	fn add(self, rhs: Self) -> Self {
		Self::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl AddAssign for Vec2 {
	fn add_assign(&mut self, rhs: Self) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl Sub for Vec2 {
	type Output = Self;
	fn sub(self, rhs: Self) -> Self {
		Self::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Vec2 {
	type Output = Self;
	fn mul(self, rhs: f64) -> Self {
		Self::new(self.x * rhs, self.y * rhs)
	}
}

impl Div<f64> for Vec2 {
	type Output = Self;
	fn div(self, rhs: f64) -> Self {
		Self::new(self.x / rhs, self.y / rhs)
	}
}

impl Neg for Vec2 {
	type Output = Self;
	fn neg(self) -> Self {
		Self::new(-self.x, -self.y)
	}
}

/// Axis-aligned rectangle in display pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	pub fn center(&self) -> Vec2 {
		Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	pub fn expand(&self, by: f64) -> Self {
		Self::new(
			self.x - by,
			self.y - by,
			self.width + by * 2.0,
			self.height + by * 2.0,
		)
	}

	pub fn contains(&self, p: Vec2) -> bool {
		p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalized_or_uses_fallback_for_zero_length() {
		let fallback = Vec2::new(0.0, 1.0);
		assert_eq!(Vec2::ZERO.normalized_or(fallback), fallback);
		let unit = Vec2::new(3.0, 4.0).normalized_or(fallback);
		assert!((unit.length() - 1.0).abs() < 1e-12);
	}

	#[test]
	fn expanded_rect_contains_padding_band() {
		let r = Rect::new(0.0, 0.0, 100.0, 50.0).expand(10.0);
		assert!(r.contains(Vec2::new(-10.0, 60.0)));
		assert!(!r.contains(Vec2::new(-10.5, 0.0)));
	}
}
