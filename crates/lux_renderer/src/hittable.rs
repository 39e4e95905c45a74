//! Hittable trait and IntersectionRecord for ray-object intersection.

use lux_math::{Aabb, Vec2, Vec3};
use rand::RngCore;

use crate::{Color, Material, Ray};

/// Index of a material in the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Index of a top-level entity in the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub usize);

/// Result of a nearest-hit query.
///
/// A miss has `hit == false` and `t == f64::INFINITY`, so picking the record
/// with the smaller `t` always prefers a real hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionRecord {
    pub hit: bool,
    /// Ray parameter of the hit, in double precision.
    pub t: f64,
    pub location: Vec3,
    /// Outward unit geometric normal. Integrators flip it toward the viewer.
    pub normal: Vec3,
    /// Surface parameterization at the hit.
    pub uv: Vec2,
    pub material: Option<MaterialId>,
    /// Filled in by the scene for top-level hits.
    pub entity: Option<EntityId>,
    /// Stable per-primitive identifier, unique across the scene.
    pub primitive_id: Option<u32>,
    pub emission: Color,
}

impl IntersectionRecord {
    pub const MISS: IntersectionRecord = IntersectionRecord {
        hit: false,
        t: f64::INFINITY,
        location: Vec3::ZERO,
        normal: Vec3::ZERO,
        uv: Vec2::ZERO,
        material: None,
        entity: None,
        primitive_id: None,
        emission: Color::ZERO,
    };

    /// Whichever of the two records is closer along the ray.
    #[inline]
    pub fn nearer(self, other: IntersectionRecord) -> IntersectionRecord {
        if other.t < self.t {
            other
        } else {
            self
        }
    }
}

impl Default for IntersectionRecord {
    fn default() -> Self {
        Self::MISS
    }
}

/// A point drawn uniformly by area on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub location: Vec3,
    pub normal: Vec3,
    /// Density with respect to surface area.
    pub pdf: f32,
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;

    /// Nearest hit of `ray` inside its validity range, or [`IntersectionRecord::MISS`].
    fn intersect(&self, ray: &Ray) -> IntersectionRecord;

    /// Total surface area.
    fn area(&self) -> f32;

    /// Uniform-by-area point on the surface.
    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample;

    fn material(&self) -> MaterialId;

    /// Diffuse color at a surface parameterization. Plain surfaces defer to
    /// the material; textured ones override this.
    fn diffuse_color(&self, material: &dyn Material, _uv: Vec2) -> Color {
        material.diffuse_color()
    }
}

impl<H: Hittable + ?Sized> Hittable for Box<H> {
    fn bounding_box(&self) -> Aabb {
        (**self).bounding_box()
    }

    fn intersect(&self, ray: &Ray) -> IntersectionRecord {
        (**self).intersect(ray)
    }

    fn area(&self) -> f32 {
        (**self).area()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        (**self).sample(rng)
    }

    fn material(&self) -> MaterialId {
        (**self).material()
    }

    fn diffuse_color(&self, material: &dyn Material, uv: Vec2) -> Color {
        (**self).diffuse_color(material, uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_is_never_nearer() {
        let hit = IntersectionRecord {
            hit: true,
            t: 3.0,
            ..IntersectionRecord::MISS
        };
        assert_eq!(IntersectionRecord::MISS.nearer(hit), hit);
        assert_eq!(hit.nearer(IntersectionRecord::MISS), hit);

        let closer = IntersectionRecord { t: 1.0, ..hit };
        assert_eq!(hit.nearer(closer).t, 1.0);
    }

    #[test]
    fn test_default_is_miss() {
        let rec = IntersectionRecord::default();
        assert!(!rec.hit);
        assert!(rec.t.is_infinite());
        assert!(rec.primitive_id.is_none());
    }
}
