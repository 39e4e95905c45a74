//! Triangle meshes: an owned triangle list behind its own BVH.

use lux_math::{Aabb, Vec2, Vec3};
use rand::RngCore;

use crate::bvh::Bvh;
use crate::error::{SceneError, SceneResult};
use crate::hittable::{Hittable, IntersectionRecord, MaterialId, SurfaceSample};
use crate::{Color, Material, Ray, Triangle};

/// Procedural two-color checkerboard over a surface parameterization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkerboard {
    pub frequency: f32,
    pub even: Color,
    pub odd: Color,
}

impl Default for Checkerboard {
    fn default() -> Self {
        Self {
            frequency: 5.0,
            even: Color::new(0.815, 0.235, 0.031),
            odd: Color::new(0.937, 0.937, 0.231),
        }
    }
}

impl Checkerboard {
    pub fn color_at(&self, uv: Vec2) -> Color {
        let cell = |x: f32| (x * self.frequency).rem_euclid(1.0) > 0.5;
        if cell(uv.x) ^ cell(uv.y) {
            self.odd
        } else {
            self.even
        }
    }
}

/// A mesh sharing one material across all of its triangles.
#[derive(Debug, Clone)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    bvh: Bvh,
    material: MaterialId,
    pattern: Option<Checkerboard>,
}

impl Mesh {
    /// Build a mesh from an indexed triangle list.
    ///
    /// Triangle ids are assigned consecutively starting at `first_id`.
    pub fn new(
        positions: &[Vec3],
        indices: &[u32],
        material: MaterialId,
        first_id: u32,
    ) -> SceneResult<Self> {
        Self::build(positions, None, indices, material, first_id)
    }

    /// Like [`Mesh::new`] with per-vertex texture coordinates.
    pub fn with_texture_coordinates(
        positions: &[Vec3],
        uvs: &[Vec2],
        indices: &[u32],
        material: MaterialId,
        first_id: u32,
    ) -> SceneResult<Self> {
        if uvs.len() != positions.len() {
            return Err(SceneError::TextureCoordinateCount {
                expected: positions.len(),
                found: uvs.len(),
            });
        }
        Self::build(positions, Some(uvs), indices, material, first_id)
    }

    fn build(
        positions: &[Vec3],
        uvs: Option<&[Vec2]>,
        indices: &[u32],
        material: MaterialId,
        first_id: u32,
    ) -> SceneResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(SceneError::IndicesNotTriangles(indices.len()));
        }
        if indices.is_empty() {
            return Err(SceneError::EmptyMesh);
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(SceneError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }

        let triangles: Vec<Triangle> = indices
            .chunks_exact(3)
            .zip(first_id..)
            .map(|(face, id)| {
                let [a, b, c] = [face[0], face[1], face[2]].map(|i| i as usize);
                let triangle =
                    Triangle::new(positions[a], positions[b], positions[c], material, id);
                match uvs {
                    Some(uvs) => triangle.with_uvs([uvs[a], uvs[b], uvs[c]]),
                    None => triangle,
                }
            })
            .collect();

        let bvh = Bvh::new(&triangles);
        log::debug!(
            "Built mesh BVH: {} triangles, {} nodes, depth {}",
            triangles.len(),
            bvh.node_count(),
            bvh.depth()
        );

        Ok(Self {
            triangles,
            bvh,
            material,
            pattern: None,
        })
    }

    /// Replace the material's diffuse color with a checkerboard.
    pub fn with_checkerboard(mut self, pattern: Checkerboard) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Number of primitive ids the mesh consumed.
    pub fn id_count(&self) -> u32 {
        self.triangles.len() as u32
    }
}

impl Hittable for Mesh {
    fn bounding_box(&self) -> Aabb {
        self.bvh.bounding_box()
    }

    fn intersect(&self, ray: &Ray) -> IntersectionRecord {
        self.bvh.nearest_hit(&self.triangles, ray)
    }

    fn area(&self) -> f32 {
        self.bvh.area()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        self.bvh
            .sample_primitives(&self.triangles, rng)
            .unwrap_or(SurfaceSample {
                location: self.bounding_box().centroid(),
                normal: Vec3::ZERO,
                pdf: 0.0,
            })
    }

    fn material(&self) -> MaterialId {
        self.material
    }

    fn diffuse_color(&self, material: &dyn Material, uv: Vec2) -> Color {
        match &self.pattern {
            Some(pattern) => pattern.color_at(uv),
            None => material.diffuse_color(),
        }
    }
}
