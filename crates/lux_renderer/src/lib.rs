//! Lux renderer - CPU ray tracing with a spatio-temporal denoiser.
//!
//! Two integrators share one BVH-backed scene:
//! - a Whitted-style recursive tracer (mirrors, glass, Phong-lit diffuse
//!   surfaces under point lights)
//! - a Monte Carlo path tracer with next-event estimation and Russian
//!   roulette, rendered at 1 sample per pixel and cleaned up by a joint
//!   bilateral filter followed by temporal reprojection.

mod bvh;
pub mod config;
pub mod denoiser;
mod error;
mod hittable;
mod material;
mod mesh;
pub mod path_tracer;
mod renderer;
pub mod sampling;
mod scene;
mod sphere;
mod triangle;
pub mod whitted;

pub use bvh::{Bvh, BvhNode};
pub use config::{Integrator, RenderConfig, SpatialFilterConfig, TemporalFilterConfig};
pub use denoiser::{Denoiser, FrameBuffer, GBuffer, Texel};
pub use error::{ConfigError, ConfigResult, SceneError, SceneResult};
pub use hittable::{EntityId, Hittable, IntersectionRecord, MaterialId, SurfaceSample};
pub use material::{
    fresnel_reflectance, reflect, refract, Color, Glass, Lambertian, Material, Mirror, Phong,
    PhongCoefficients, SurfaceKind,
};
pub use mesh::{Checkerboard, Mesh};
pub use renderer::{color_to_rgba, linear_to_gamma, Renderer};
pub use scene::{LightSample, PointLight, Scene, SceneBuilder};
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export common math types from lux_math
pub use lux_math::{Aabb, Camera, Interval, Ray, Vec3};
