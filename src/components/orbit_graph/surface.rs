use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::util::Vec2;

/// The slice of the 2D canvas API the renderer uses. Coordinates are display
/// pixels; any device-pixel scaling is applied once when the surface is set up.
pub trait Surface {
	fn save(&self);
	fn restore(&self);
	fn clear(&self, width: f64, height: f64, color: &str);
	fn set_fill(&self, color: &str);
	fn set_stroke(&self, color: &str);
	fn set_line_width(&self, width: f64);
	fn set_line_dash(&self, segments: &[f64], offset: f64);
	fn set_alpha(&self, alpha: f64);
	fn set_font(&self, font: &str);
	fn begin_path(&self);
	fn move_to(&self, p: Vec2);
	fn line_to(&self, p: Vec2);
	/// Full circle as a closed sub-path.
	fn circle(&self, center: Vec2, radius: f64);
	fn rect(&self, x: f64, y: f64, width: f64, height: f64);
	fn fill(&self);
	fn stroke(&self);
	fn fill_text(&self, text: &str, x: f64, y: f64);
	fn measure_text(&self, text: &str) -> f64;
	fn set_stroke_gradient(&self, from: Vec2, to: Vec2, stops: &[(f64, &str)]);
	fn set_fill_radial(&self, center: Vec2, inner: f64, outer: f64, stops: &[(f64, &str)]);
}

/// Backing buffer size for a display size at a device pixel ratio.
pub fn backing_size(width: f64, height: f64, dpr: f64) -> (u32, u32) {
	let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
	(
		(width * dpr).round().max(1.0) as u32,
		(height * dpr).round().max(1.0) as u32,
	)
}

impl Surface for CanvasRenderingContext2d {
	fn save(&self) {
		CanvasRenderingContext2d::save(self);
	}

	fn restore(&self) {
		CanvasRenderingContext2d::restore(self);
	}

	fn clear(&self, width: f64, height: f64, color: &str) {
		self.clear_rect(0.0, 0.0, width, height);
		self.set_fill_style_str(color);
		self.fill_rect(0.0, 0.0, width, height);
	}

	fn set_fill(&self, color: &str) {
		self.set_fill_style_str(color);
	}

	fn set_stroke(&self, color: &str) {
		self.set_stroke_style_str(color);
	}

	fn set_line_width(&self, width: f64) {
		CanvasRenderingContext2d::set_line_width(self, width);
	}

	fn set_line_dash(&self, segments: &[f64], offset: f64) {
		let array = js_sys::Array::new();
		for s in segments {
			array.push(&JsValue::from_f64(*s));
		}
		let _ = CanvasRenderingContext2d::set_line_dash(self, &array);
		self.set_line_dash_offset(offset);
	}

	fn set_alpha(&self, alpha: f64) {
		self.set_global_alpha(alpha);
	}

	fn set_font(&self, font: &str) {
		CanvasRenderingContext2d::set_font(self, font);
	}

	fn begin_path(&self) {
		CanvasRenderingContext2d::begin_path(self);
	}

	fn move_to(&self, p: Vec2) {
		CanvasRenderingContext2d::move_to(self, p.x, p.y);
	}

	fn line_to(&self, p: Vec2) {
		CanvasRenderingContext2d::line_to(self, p.x, p.y);
	}

	fn circle(&self, center: Vec2, radius: f64) {
		CanvasRenderingContext2d::move_to(self, center.x + radius, center.y);
		let _ = self.arc(center.x, center.y, radius, 0.0, TAU);
	}

	fn rect(&self, x: f64, y: f64, width: f64, height: f64) {
		CanvasRenderingContext2d::rect(self, x, y, width, height);
	}

	fn fill(&self) {
		CanvasRenderingContext2d::fill(self);
	}

	fn stroke(&self) {
		CanvasRenderingContext2d::stroke(self);
	}

	fn fill_text(&self, text: &str, x: f64, y: f64) {
		let _ = CanvasRenderingContext2d::fill_text(self, text, x, y);
	}

	fn measure_text(&self, text: &str) -> f64 {
		CanvasRenderingContext2d::measure_text(self, text)
			.map(|m| m.width())
			.unwrap_or(text.len() as f64 * 7.0)
	}

	fn set_stroke_gradient(&self, from: Vec2, to: Vec2, stops: &[(f64, &str)]) {
		let gradient = self.create_linear_gradient(from.x, from.y, to.x, to.y);
		for (offset, color) in stops {
			let _ = gradient.add_color_stop(*offset as f32, color);
		}
		self.set_stroke_style_canvas_gradient(&gradient);
	}

	fn set_fill_radial(&self, center: Vec2, inner: f64, outer: f64, stops: &[(f64, &str)]) {
		let Ok(gradient) =
			self.create_radial_gradient(center.x, center.y, inner, center.x, center.y, outer)
		else {
			return;
		};
		for (offset, color) in stops {
			let _ = gradient.add_color_stop(*offset as f32, color);
		}
		self.set_fill_style_canvas_gradient(&gradient);
	}
}
