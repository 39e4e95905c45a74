//! Triangle primitive using the Möller-Trumbore intersection algorithm.

use lux_math::{Aabb, Vec2, Vec3};
use rand::RngCore;

use crate::hittable::{Hittable, IntersectionRecord, MaterialId, SurfaceSample};
use crate::sampling::uniform_triangle;
use crate::Ray;

/// Texture coordinates that make the interpolated parameterization equal to
/// the barycentric pair `(u, v)`.
const BARYCENTRIC_UVS: [Vec2; 3] = [Vec2::ZERO, Vec2::X, Vec2::Y];

/// A triangle primitive.
#[derive(Debug, Clone)]
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    uvs: [Vec2; 3],
    /// Unit normal by the right-hand rule over `v0, v1, v2`. Zero when degenerate.
    normal: Vec3,
    area: f32,
    material: MaterialId,
    id: u32,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: MaterialId, id: u32) -> Self {
        let cross = (v1 - v0).cross(v2 - v0);
        Self {
            v0,
            v1,
            v2,
            uvs: BARYCENTRIC_UVS,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
            id,
        }
    }

    /// Attach per-vertex texture coordinates.
    pub fn with_uvs(mut self, uvs: [Vec2; 3]) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Möller-Trumbore in double precision.
    ///
    /// Returns `(t, u, v)` where the hit point is `(1 - u - v) * v0 + u * v1 + v * v2`.
    /// All three weights must be strictly positive, so rays through an edge or
    /// vertex miss.
    pub fn barycentric_hit(&self, ray: &Ray) -> Option<(f64, f64, f64)> {
        let origin = ray.origin.as_dvec3();
        let direction = ray.direction.as_dvec3();
        let v0 = self.v0.as_dvec3();
        let edge1 = self.v1.as_dvec3() - v0;
        let edge2 = self.v2.as_dvec3() - v0;

        let pvec = direction.cross(edge2);
        let det = edge1.dot(pvec);
        // Parallel ray or degenerate triangle
        if det == 0.0 {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = origin - v0;
        let u = tvec.dot(pvec) * inv_det;
        let qvec = tvec.cross(edge1);
        let v = direction.dot(qvec) * inv_det;
        let t = edge2.dot(qvec) * inv_det;

        if u > 0.0 && v > 0.0 && 1.0 - u - v > 0.0 && ray.range.surrounds(t) {
            Some((t, u, v))
        } else {
            None
        }
    }
}

impl Hittable for Triangle {
    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.v0, self.v1).union_point(self.v2)
    }

    fn intersect(&self, ray: &Ray) -> IntersectionRecord {
        let Some((t, u, v)) = self.barycentric_hit(ray) else {
            return IntersectionRecord::MISS;
        };
        let (u, v) = (u as f32, v as f32);
        let w = 1.0 - u - v;

        IntersectionRecord {
            hit: true,
            t,
            location: ray.at(t),
            normal: self.normal,
            uv: self.uvs[0] * w + self.uvs[1] * u + self.uvs[2] * v,
            material: Some(self.material),
            entity: None,
            primitive_id: Some(self.id),
            emission: Vec3::ZERO,
        }
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        SurfaceSample {
            location: uniform_triangle(self.v0, self.v1, self.v2, rng),
            normal: self.normal,
            pdf: if self.area > 0.0 { 1.0 / self.area } else { 0.0 },
        }
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}
