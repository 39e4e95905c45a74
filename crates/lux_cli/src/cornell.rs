//! The built-in Cornell box.

use lux_math::Vec2;
use lux_renderer::{
    Checkerboard, Color, Glass, Lambertian, Mirror, Phong, PhongCoefficients, Scene,
    SceneBuilder, SceneResult, Vec3,
};

pub const LIGHT_EMISSION: Color = Color::new(47.8, 38.6, 31.1);
pub const RED: Color = Color::new(0.63, 0.065, 0.05);
pub const GREEN: Color = Color::new(0.1, 0.5, 0.1);
pub const WHITE: Color = Color::new(0.7, 0.7, 0.7);

/// Box spanning [-1, 1] on every axis, open toward +Z, with a ceiling lamp,
/// a checkered floor, a mirror sphere and a glass sphere.
///
/// The lamp is the area light for the path tracer; the Whitted shader uses the
/// point light placed just below it.
pub fn build() -> SceneResult<Scene> {
    let mut builder = SceneBuilder::new();

    let white = builder.add_material(Phong::new(WHITE, PhongCoefficients::default()));
    let red = builder.add_material(Phong::new(RED, PhongCoefficients::default()));
    let green = builder.add_material(Phong::new(GREEN, PhongCoefficients::default()));
    let lamp = builder.add_material(Lambertian::emissive(Color::ZERO, LIGHT_EMISSION));
    let mirror = builder.add_material(Mirror::new(1.5));
    let glass = builder.add_material(Glass::new(1.5));

    // Floor
    let floor = [
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(-1.0, -1.0, -1.0),
    ];
    let floor_uvs = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
    builder.add_checkered_mesh(
        &floor,
        &floor_uvs,
        &[0, 1, 2, 0, 2, 3],
        white,
        Checkerboard::default(),
    )?;

    // Ceiling, back, left and right walls
    builder.add_quad(Vec3::new(-1.0, 1.0, -1.0), Vec3::X * 2.0, Vec3::Z * 2.0, white)?;
    builder.add_quad(Vec3::new(-1.0, -1.0, -1.0), Vec3::X * 2.0, Vec3::Y * 2.0, white)?;
    builder.add_quad(Vec3::new(-1.0, -1.0, 1.0), Vec3::NEG_Z * 2.0, Vec3::Y * 2.0, red)?;
    builder.add_quad(Vec3::new(1.0, -1.0, -1.0), Vec3::Z * 2.0, Vec3::Y * 2.0, green)?;

    builder.add_quad(Vec3::new(-0.25, 0.98, -0.25), Vec3::X * 0.5, Vec3::Z * 0.5, lamp)?;
    builder.add_point_light(Vec3::new(0.0, 0.9, 0.0), Color::splat(0.9));

    builder.add_sphere(Vec3::new(-0.45, -0.65, -0.3), 0.35, mirror)?;
    builder.add_sphere(Vec3::new(0.45, -0.65, 0.25), 0.35, glass)?;

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cornell_box_has_one_emitter() {
        let scene = build().unwrap();
        assert!(scene.emitter().is_some());
        assert_eq!(scene.lights().len(), 1);
        // Floor, four walls, lamp and two spheres
        assert_eq!(scene.entity_count(), 8);
    }

    #[test]
    fn test_camera_ray_hits_back_wall() {
        let scene = build().unwrap();
        let ray = lux_renderer::Ray::new(Vec3::new(0.0, 0.3, 3.5), Vec3::NEG_Z);
        let rec = scene.intersect(&ray);
        assert!(rec.hit);
        assert!((rec.location.z + 1.0).abs() < 1e-4);
    }
}
