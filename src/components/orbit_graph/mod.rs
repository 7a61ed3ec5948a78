mod component;
mod config;
mod expansion;
mod interaction;
mod physics;
mod render;
mod state;
mod stats;
mod surface;
mod tooltip;
mod types;

pub use component::OrbitGraphCanvas;
pub use config::{OrbitConfig, Theme};
pub use interaction::GraphEvent;
pub use types::GraphData;
