//! Scene arena: materials, entities, point lights and the top-level BVH.
//!
//! The [`SceneBuilder`] owns every material and entity; entities refer to
//! materials by [`MaterialId`] and the BVH refers to entities by index. The
//! whole arena is dropped together with the [`Scene`].

use lux_math::{Vec2, Vec3};
use rand::RngCore;

use crate::bvh::Bvh;
use crate::error::{SceneError, SceneResult};
use crate::hittable::{EntityId, Hittable, IntersectionRecord, MaterialId};
use crate::mesh::{Checkerboard, Mesh};
use crate::{Color, Material, Ray, Sphere, Triangle};

/// Point light for the Whitted shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub radiance: Color,
}

impl PointLight {
    pub fn new(position: Vec3, radiance: Color) -> Self {
        Self { position, radiance }
    }
}

/// A point on the scene's area light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub location: Vec3,
    /// Outward normal of the light surface at `location`.
    pub normal: Vec3,
    /// Density with respect to the light's surface area.
    pub pdf: f32,
    pub emission: Color,
    pub entity: EntityId,
}

/// Collects materials and geometry, then freezes them into a [`Scene`].
pub struct SceneBuilder {
    materials: Vec<Box<dyn Material>>,
    entities: Vec<Box<dyn Hittable>>,
    lights: Vec<PointLight>,
    next_primitive_id: u32,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            materials: Vec::new(),
            entities: Vec::new(),
            lights: Vec::new(),
            // Primitive ids start at 1
            next_primitive_id: 1,
        }
    }

    pub fn add_material(&mut self, material: impl Material + 'static) -> MaterialId {
        self.materials.push(Box::new(material));
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_sphere(
        &mut self,
        center: Vec3,
        radius: f32,
        material: MaterialId,
    ) -> SceneResult<EntityId> {
        self.check_material(material)?;
        let id = self.take_ids(1);
        Ok(self.push(Sphere::new(center, radius, material, id)))
    }

    pub fn add_triangle(
        &mut self,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        material: MaterialId,
    ) -> SceneResult<EntityId> {
        self.check_material(material)?;
        let id = self.take_ids(1);
        Ok(self.push(Triangle::new(a, b, c, material, id)))
    }

    /// Add an indexed triangle mesh. Faces are consecutive index triples.
    pub fn add_mesh(
        &mut self,
        positions: &[Vec3],
        indices: &[u32],
        material: MaterialId,
    ) -> SceneResult<EntityId> {
        self.check_material(material)?;
        let mesh = Mesh::new(positions, indices, material, self.next_primitive_id)?;
        self.take_ids(mesh.id_count());
        Ok(self.push(mesh))
    }

    /// Add a mesh whose diffuse color is a checkerboard over `uvs`.
    pub fn add_checkered_mesh(
        &mut self,
        positions: &[Vec3],
        uvs: &[Vec2],
        indices: &[u32],
        material: MaterialId,
        pattern: Checkerboard,
    ) -> SceneResult<EntityId> {
        self.check_material(material)?;
        let mesh = Mesh::with_texture_coordinates(
            positions,
            uvs,
            indices,
            material,
            self.next_primitive_id,
        )?
        .with_checkerboard(pattern);
        self.take_ids(mesh.id_count());
        Ok(self.push(mesh))
    }

    /// Parallelogram `corner + s * edge_u + t * edge_v` as a two-triangle mesh.
    ///
    /// The normal points along `edge_u x edge_v`.
    pub fn add_quad(
        &mut self,
        corner: Vec3,
        edge_u: Vec3,
        edge_v: Vec3,
        material: MaterialId,
    ) -> SceneResult<EntityId> {
        let positions = [
            corner,
            corner + edge_u,
            corner + edge_u + edge_v,
            corner + edge_v,
        ];
        self.add_mesh(&positions, &[0, 1, 2, 0, 2, 3], material)
    }

    pub fn add_point_light(&mut self, position: Vec3, radiance: Color) {
        self.lights.push(PointLight::new(position, radiance));
    }

    /// Add any custom primitive.
    pub fn add_entity(&mut self, entity: impl Hittable + 'static) -> SceneResult<EntityId> {
        self.check_material(entity.material())?;
        Ok(self.push(entity))
    }

    /// Next primitive id that will be handed out.
    pub fn next_primitive_id(&self) -> u32 {
        self.next_primitive_id
    }

    /// Build the top-level BVH and freeze the scene.
    pub fn build(self) -> Scene {
        let bvh = Bvh::new(&self.entities);
        let emitter = self
            .entities
            .iter()
            .position(|e| self.materials[e.material().0].is_emitting())
            .map(EntityId);

        log::info!(
            "Built scene: {} entities, {} materials, {} point lights, BVH {} nodes (depth {})",
            self.entities.len(),
            self.materials.len(),
            self.lights.len(),
            bvh.node_count(),
            bvh.depth()
        );

        Scene {
            materials: self.materials,
            entities: self.entities,
            lights: self.lights,
            bvh,
            emitter,
        }
    }

    fn check_material(&self, material: MaterialId) -> SceneResult<()> {
        if material.0 < self.materials.len() {
            Ok(())
        } else {
            Err(SceneError::UnknownMaterial(material.0))
        }
    }

    fn take_ids(&mut self, count: u32) -> u32 {
        let first = self.next_primitive_id;
        self.next_primitive_id += count;
        first
    }

    fn push(&mut self, entity: impl Hittable + 'static) -> EntityId {
        self.entities.push(Box::new(entity));
        EntityId(self.entities.len() - 1)
    }
}

/// Immutable scene shared read-only by every render worker.
pub struct Scene {
    materials: Vec<Box<dyn Material>>,
    entities: Vec<Box<dyn Hittable>>,
    lights: Vec<PointLight>,
    bvh: Bvh,
    emitter: Option<EntityId>,
}

impl Scene {
    /// Nearest hit over all entities, with the entity id filled in.
    pub fn intersect(&self, ray: &Ray) -> IntersectionRecord {
        self.bvh.traverse(ray, |index, ray| {
            let mut rec = self.entities[index].intersect(ray);
            if rec.hit {
                rec.entity = Some(EntityId(index));
            }
            rec
        })
    }

    /// Uniform-by-area point on the first emissive entity.
    ///
    /// `None` when the scene has no emitter, which callers treat as "no
    /// direct light".
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> Option<LightSample> {
        let id = self.emitter?;
        let entity = self.entity(id);
        let sample = entity.sample(rng);
        if sample.pdf <= 0.0 {
            return None;
        }
        Some(LightSample {
            location: sample.location,
            normal: sample.normal,
            pdf: sample.pdf,
            emission: self.material(entity.material()).emission(),
            entity: id,
        })
    }

    /// Materials are only handed out by this scene's builder, so every id an
    /// entity carries is in range.
    pub fn material(&self, id: MaterialId) -> &dyn Material {
        self.materials[id.0].as_ref()
    }

    pub fn entity(&self, id: EntityId) -> &dyn Hittable {
        self.entities[id.0].as_ref()
    }

    pub fn is_emissive(&self, id: EntityId) -> bool {
        self.material(self.entity(id).material()).is_emitting()
    }

    /// The entity light sampling draws from.
    pub fn emitter(&self) -> Option<EntityId> {
        self.emitter
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }
}
