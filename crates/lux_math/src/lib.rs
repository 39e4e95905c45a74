// Re-export glam for convenience
pub use glam::*;

// Lux math types
mod aabb;
mod camera;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use camera::Camera;
pub use interval::Interval;
pub use ray::{Ray, MIN_HIT_DISTANCE};
