use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
	#[error("invalid dimension {0:?}: expected a number, \"<n>px\" or \"<n>%\"")]
	InvalidDimension(String),
}

/// A display size given either in pixels or relative to the parent element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dimension {
	Pixels(f64),
	Percent(f64),
}

impl Dimension {
	pub fn resolve(self, parent: f64) -> f64 {
		match self {
			Dimension::Pixels(px) => px,
			Dimension::Percent(pct) => parent * pct / 100.0,
		}
	}
}

impl Default for Dimension {
	fn default() -> Self {
		Dimension::Percent(100.0)
	}
}

impl FromStr for Dimension {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		let invalid = || ConfigError::InvalidDimension(s.to_string());
		let (number, percent) = if let Some(n) = trimmed.strip_suffix('%') {
			(n, true)
		} else if let Some(n) = trimmed.strip_suffix("px") {
			(n, false)
		} else {
			(trimmed, false)
		};
		let value: f64 = number.trim().parse().map_err(|_| invalid())?;
		if !value.is_finite() || value < 0.0 {
			return Err(invalid());
		}
		Ok(if percent {
			Dimension::Percent(value)
		} else {
			Dimension::Pixels(value)
		})
	}
}

impl<'de> Deserialize<'de> for Dimension {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Number(f64),
			Text(String),
		}
		match Raw::deserialize(deserializer)? {
			Raw::Number(n) => n.to_string().parse().map_err(serde::de::Error::custom),
			Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
	#[default]
	Dark,
	Light,
}

/// Colors used by the renderer for one theme.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
	pub background: &'static str,
	pub grid: &'static str,
	pub text: &'static str,
	pub muted_text: &'static str,
	pub panel: &'static str,
	pub panel_border: &'static str,
	pub self_node: &'static str,
	pub peer: &'static str,
	pub institution: &'static str,
	pub community: &'static str,
	pub link_active: &'static str,
	pub link_idle: &'static str,
	pub link_error: &'static str,
	pub selection: &'static str,
}

const DARK: Palette = Palette {
	background: "#0b1020",
	grid: "rgba(90, 120, 200, 0.12)",
	text: "#e8ecff",
	muted_text: "#9aa4c7",
	panel: "rgba(16, 22, 44, 0.92)",
	panel_border: "rgba(120, 150, 255, 0.45)",
	self_node: "#f5c542",
	peer: "#4fa3ff",
	institution: "#b07cff",
	community: "#3ddc97",
	link_active: "#3ddc97",
	link_idle: "#f0a040",
	link_error: "#ff5a6a",
	selection: "#ffffff",
};

const LIGHT: Palette = Palette {
	background: "#f6f7fb",
	grid: "rgba(60, 80, 140, 0.10)",
	text: "#1b2038",
	muted_text: "#5b6386",
	panel: "rgba(255, 255, 255, 0.95)",
	panel_border: "rgba(60, 80, 160, 0.35)",
	self_node: "#d99a00",
	peer: "#1f6fd1",
	institution: "#7a44d6",
	community: "#1a9e66",
	link_active: "#1a9e66",
	link_idle: "#c97a10",
	link_error: "#d3293b",
	selection: "#1b2038",
};

impl Theme {
	pub fn palette(self) -> &'static Palette {
		match self {
			Theme::Dark => &DARK,
			Theme::Light => &LIGHT,
		}
	}
}

/// Construction-time options for the orbit simulation and its canvas.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct OrbitConfig {
	pub min_orbit_radius: f64,
	pub max_orbit_radius: f64,
	/// Radians per tick at `min_orbit_radius`.
	pub base_orbit_speed: f64,
	pub speed_variation: f64,
	pub atmosphere_radius: f64,
	pub max_repulsion_force: f64,
	pub min_safe_distance: f64,
	pub emergency_repulsion: f64,
	pub width: Dimension,
	pub height: Dimension,
	pub theme: Theme,
	pub show_stats: bool,
}

impl Default for OrbitConfig {
	fn default() -> Self {
		Self {
			min_orbit_radius: 120.0,
			max_orbit_radius: 300.0,
			base_orbit_speed: 0.003,
			speed_variation: 0.0015,
			atmosphere_radius: 70.0,
			max_repulsion_force: 3.0,
			min_safe_distance: 35.0,
			emergency_repulsion: 8.0,
			width: Dimension::default(),
			height: Dimension::default(),
			theme: Theme::default(),
			show_stats: true,
		}
	}
}
