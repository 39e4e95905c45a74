//! Sphere primitive for ray tracing.

use std::f32::consts::PI;

use lux_math::{Aabb, DVec3, Vec2, Vec3};
use rand::RngCore;

use crate::hittable::{Hittable, IntersectionRecord, MaterialId, SurfaceSample};
use crate::sampling::uniform_sphere;
use crate::Ray;

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: MaterialId,
    id: u32,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32, material: MaterialId, id: u32) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            id,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn sphere_uv(p: Vec3) -> Vec2 {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        Vec2::new(phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn intersect(&self, ray: &Ray) -> IntersectionRecord {
        let origin = ray.origin.as_dvec3();
        let direction = ray.direction.as_dvec3();
        let oc: DVec3 = origin - self.center.as_dvec3();
        let radius = self.radius as f64;

        let a = direction.length_squared();
        if a == 0.0 {
            return IntersectionRecord::MISS;
        }
        let half_b = oc.dot(direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return IntersectionRecord::MISS;
        }

        // Smaller root first, the far side when the origin is inside
        let sqrtd = discriminant.sqrt();
        let mut t = (-half_b - sqrtd) / a;
        if !ray.range.surrounds(t) {
            t = (-half_b + sqrtd) / a;
            if !ray.range.surrounds(t) {
                return IntersectionRecord::MISS;
            }
        }

        let location = ray.at(t);
        let normal = if self.radius > 0.0 {
            (location - self.center) / self.radius
        } else {
            -ray.direction.normalize_or_zero()
        };

        IntersectionRecord {
            hit: true,
            t,
            location,
            normal,
            uv: Self::sphere_uv(normal),
            material: Some(self.material),
            entity: None,
            primitive_id: Some(self.id),
            emission: Vec3::ZERO,
        }
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let normal = uniform_sphere(rng);
        let area = self.area();
        SurfaceSample {
            location: self.center + normal * self.radius,
            normal,
            pdf: if area > 0.0 { 1.0 / area } else { 0.0 },
        }
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}
