//! Whitted-style recursive ray tracing.
//!
//! Mirrors and glass spawn secondary rays weighted by the exact Fresnel
//! term; every other surface is terminal and lit by the scene's point lights
//! with a Phong diffuse + specular model and hard shadows.

use lux_math::Vec3;

use crate::material::{fresnel_reflectance, reflect, refract, SurfaceKind};
use crate::{Color, RenderConfig, Ray, Scene};

/// Radiance arriving along `ray`. `depth` counts bounces taken so far.
///
/// Exceeding `config.max_depth` or a zero-length direction yields black; a ray
/// that leaves the scene yields `config.background`.
pub fn trace(scene: &Scene, ray: &Ray, depth: u32, config: &RenderConfig) -> Color {
    if depth > config.max_depth || ray.is_degenerate() {
        return Color::ZERO;
    }

    let rec = scene.intersect(ray);
    if !rec.hit {
        return config.background;
    }
    let Some(material_id) = rec.material else {
        return Color::ZERO;
    };
    let material = scene.material(material_id);

    let direction = ray.direction.normalize();
    let normal = rec.normal;
    let eps = config.intersection_epsilon;
    let ior = material.refractive_index();

    match material.kind() {
        SurfaceKind::Reflective => {
            let reflected = reflect(direction, normal).normalize_or_zero();
            let origin = offset_origin(rec.location, normal, reflected, eps);
            let radiance = trace(scene, &Ray::new(origin, reflected), depth + 1, config);
            radiance * fresnel_reflectance(direction, normal, ior)
        }
        SurfaceKind::ReflectiveRefractive => {
            let reflected = reflect(direction, normal).normalize_or_zero();
            let refracted = refract(direction, normal, ior).normalize_or_zero();
            let reflection = trace(
                scene,
                &Ray::new(offset_origin(rec.location, normal, reflected, eps), reflected),
                depth + 1,
                config,
            );
            // Total internal reflection leaves a zero direction, traced as black
            let refraction = trace(
                scene,
                &Ray::new(offset_origin(rec.location, normal, refracted, eps), refracted),
                depth + 1,
                config,
            );
            let r = fresnel_reflectance(direction, normal, ior);
            reflection * r + refraction * (1.0 - r)
        }
        SurfaceKind::DiffuseGlossy => {
            let entity = match rec.entity {
                Some(id) => scene.entity(id),
                None => return Color::ZERO,
            };
            let diffuse_color = entity.diffuse_color(material, rec.uv);
            let phong = material.phong();
            let shading_point = offset_origin(rec.location, normal, -direction, eps);

            let mut diffuse = Color::ZERO;
            let mut specular = Color::ZERO;
            for light in scene.lights() {
                let to_light = light.position - rec.location;
                let distance_squared = to_light.length_squared();
                let l = to_light.normalize_or_zero();

                let shadow = scene.intersect(&Ray::new(shading_point, l));
                let occluded = shadow.hit && shadow.t * shadow.t < distance_squared as f64;
                if occluded {
                    continue;
                }

                diffuse += light.radiance * l.dot(normal).abs();
                let highlight = (-reflect(-l, normal).dot(direction)).max(0.0);
                specular += light.radiance * highlight.powf(phong.exponent);
            }

            diffuse * diffuse_color * phong.diffuse + specular * phong.specular
        }
    }
}

/// Push `point` off the surface toward the side `toward` is heading.
#[inline]
pub fn offset_origin(point: Vec3, normal: Vec3, toward: Vec3, eps: f32) -> Vec3 {
    if toward.dot(normal) < 0.0 {
        point - normal * eps
    } else {
        point + normal * eps
    }
}
