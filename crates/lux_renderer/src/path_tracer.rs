//! Unidirectional Monte Carlo path tracing.
//!
//! Each bounce adds one next-event estimate toward the scene's area light and
//! continues with probability `config.russian_roulette`. Indirect rays that
//! land on an emitter contribute nothing, since the direct estimate already
//! accounts for that light.

use lux_math::Vec3;
use rand::RngCore;

use crate::denoiser::Texel;
use crate::hittable::IntersectionRecord;
use crate::sampling::gen_f32;
use crate::{Color, RenderConfig, Ray, Scene};

/// A light sample counts as visible when it is no farther than the nearest
/// occluder plus this slack.
pub const LIGHT_VISIBILITY_SLACK: f64 = 0.01;

/// Trace one primary ray and capture its G-buffer texel.
///
/// The texel's color is the unfiltered radiance estimate; misses produce a
/// non-contributing texel colored with the background.
pub fn cast_path(
    scene: &Scene,
    ray: &Ray,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Texel {
    if ray.is_degenerate() {
        return Texel::background(Color::ZERO);
    }
    let rec = scene.intersect(ray);
    if !rec.hit {
        return Texel::background(config.background);
    }

    let w_out = -ray.direction.normalize();
    Texel {
        position: rec.location,
        color: radiance(scene, &rec, w_out, config, rng),
        normal: face_toward(rec.normal, w_out),
        contributor: true,
        primitive_id: rec.primitive_id,
    }
}

/// Radiance leaving the hit `rec` along `w_out` (pointing away from the surface).
pub fn radiance(
    scene: &Scene,
    rec: &IntersectionRecord,
    w_out: Vec3,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(material_id) = rec.material else {
        return Color::ZERO;
    };
    let material = scene.material(material_id);
    if material.is_emitting() {
        return material.emission();
    }

    let normal = face_toward(rec.normal, w_out);
    let shading_point = rec.location + normal * config.intersection_epsilon;

    // Next-event estimation
    let mut direct = Color::ZERO;
    if let Some(light) = scene.sample_light(rng) {
        let to_light = light.location - shading_point;
        let distance_squared = to_light.length_squared();
        let distance = distance_squared.sqrt();
        if distance > 0.0 {
            let w_in = to_light / distance;
            let light_normal = face_toward(light.normal, -w_in);

            let occluder = scene.intersect(&Ray::new(shading_point, w_in));
            if (distance as f64) < occluder.t + LIGHT_VISIBILITY_SLACK {
                direct = light.emission
                    * material.brdf(w_out, w_in, normal)
                    * w_in.dot(normal)
                    * (-w_in).dot(light_normal)
                    / distance_squared
                    / light.pdf;
            }
        }
    }

    // Russian roulette decides whether the path continues
    let survival = config.russian_roulette;
    let mut indirect = Color::ZERO;
    if gen_f32(rng) < survival {
        let w_in = material.sample(w_out, normal, rng).normalize_or_zero();
        let pdf = material.pdf(w_out, w_in, normal);
        if pdf > 0.0 {
            let next = scene.intersect(&Ray::new(shading_point, w_in));
            let next_is_light = next
                .material
                .is_some_and(|id| scene.material(id).is_emitting());
            if next.hit && !next_is_light {
                indirect = radiance(scene, &next, -w_in, config, rng)
                    * material.brdf(w_out, w_in, normal)
                    * w_in.dot(normal)
                    / pdf
                    / survival;
            }
        }
    }

    direct + indirect
}

/// `normal`, flipped if needed so it lies in the hemisphere of `toward`.
#[inline]
fn face_toward(normal: Vec3, toward: Vec3) -> Vec3 {
    if normal.dot(toward) < 0.0 {
        -normal
    } else {
        normal
    }
}
