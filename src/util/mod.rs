//! Spatial and frame-pacing helpers shared by the graph components.

pub mod geometry;
pub mod grid;
pub mod pool;
pub mod timing;

pub use geometry::{Rect, Vec2};
pub use grid::SpatialGrid;
pub use pool::VecPool;
pub use timing::{Debounce, FrameScheduler, Throttle};
