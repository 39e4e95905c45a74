//! End-to-end renders of small scenes through the public renderer.

use lux_renderer::{
    fresnel_reflectance, whitted, Camera, Color, Integrator, Lambertian, Mirror, Ray,
    RenderConfig, Renderer, SceneBuilder, Vec3,
};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

fn camera() -> Camera {
    let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 45.0);
    camera.resize(WIDTH, HEIGHT);
    camera
}

fn whitted_config() -> RenderConfig {
    RenderConfig {
        integrator: Integrator::Whitted,
        background: Color::new(0.2, 0.7, 0.8),
        ..RenderConfig::default()
    }
}

#[test]
fn diffuse_sphere_under_point_light() {
    let _ = env_logger::builder().is_test(true).try_init();

    // Light 10 units from the sphere, above it and toward the camera so the
    // point facing the camera is lit
    let mut builder = SceneBuilder::new();
    let white = builder.add_material(Lambertian::new(Color::splat(0.8)));
    builder.add_sphere(Vec3::ZERO, 1.0, white).unwrap();
    builder.add_point_light(Vec3::new(0.0, 6.0, 8.0), Color::ONE);
    let scene = builder.build();

    let config = whitted_config();
    let mut renderer = Renderer::new(scene, config.clone()).unwrap();
    renderer.render(&camera());

    let center = renderer.pixel(WIDTH / 2, HEIGHT / 2);
    assert!(center.x > 0.0 && center.y > 0.0 && center.z > 0.0, "center = {center:?}");

    // Every ray that misses the sphere shows the exact background
    let mut misses = 0;
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let ray = camera().primary_ray(x, y);
            if !renderer.scene().intersect(&ray).hit {
                assert_eq!(renderer.pixel(x, y), config.background, "pixel ({x}, {y})");
                misses += 1;
            }
        }
    }
    assert!(misses > WIDTH as usize * HEIGHT as usize / 2);
    assert_eq!(renderer.pixel(0, 0), config.background);
}

#[test]
fn mirror_sphere_reflects_wall_with_fresnel_weight() {
    let mut builder = SceneBuilder::new();
    let mirror = builder.add_material(Mirror::new(1.5));
    let wall = builder.add_material(Lambertian::new(Color::new(0.9, 0.3, 0.2)));
    builder.add_sphere(Vec3::ZERO, 1.0, mirror).unwrap();
    // Wall behind the camera; its diagonal stays clear of the reflected ray
    builder
        .add_quad(Vec3::new(-17.0, -23.0, 10.0), Vec3::Y * 40.0, Vec3::X * 40.0, wall)
        .unwrap();
    builder.add_point_light(Vec3::new(0.0, 5.0, 8.0), Color::ONE);
    let scene = builder.build();

    let config = whitted_config();

    // What the wall looks like along the reflected ray, seen directly
    let wall_color = whitted::trace(&scene, &Ray::new(Vec3::new(0.0, 0.0, 1.001), Vec3::Z), 1, &config);
    assert!(wall_color.x > 0.0);

    let mut renderer = Renderer::new(scene, config).unwrap();
    renderer.render(&camera());
    let reflected = renderer.pixel(WIDTH / 2, HEIGHT / 2);

    let ratio = reflected / wall_color;
    let expected = fresnel_reflectance(Vec3::NEG_Z, Vec3::Z, 1.5);
    assert!((expected - 0.04).abs() < 1e-4);
    for channel in ratio.to_array() {
        assert!((channel - 0.04).abs() < 2e-3, "ratio = {ratio:?}");
    }
}

#[test]
fn path_traced_cornell_box_has_light_and_shadow() {
    let mut builder = SceneBuilder::new();
    let white = builder.add_material(Lambertian::new(Color::splat(0.7)));
    let lamp = builder.add_material(Lambertian::emissive(Color::ZERO, Color::splat(15.0)));
    // Floor, back wall and a small ceiling light
    builder
        .add_quad(Vec3::new(-2.0, -1.0, 2.0), Vec3::X * 4.0, Vec3::NEG_Z * 4.0, white)
        .unwrap();
    builder
        .add_quad(Vec3::new(-2.0, -1.0, -2.0), Vec3::X * 4.0, Vec3::Y * 4.0, white)
        .unwrap();
    builder
        .add_quad(Vec3::new(-0.4, 2.0, -0.4), Vec3::X * 0.8, Vec3::Z * 0.8, lamp)
        .unwrap();
    builder.add_sphere(Vec3::new(0.0, -0.4, 0.0), 0.6, white).unwrap();
    let scene = builder.build();

    let mut renderer = Renderer::new(scene, RenderConfig::default()).unwrap();
    let mut camera = Camera::new(Vec3::new(0.0, 0.5, 6.0), Vec3::new(0.0, 0.5, 0.0), 40.0);
    camera.resize(32, 32);
    for _ in 0..4 {
        renderer.render(&camera);
    }

    let gbuffer = renderer.gbuffer();
    let contributors = gbuffer.texels.as_slice().iter().filter(|t| t.contributor).count();
    assert!(contributors > 0);

    // Immediate clamp keeps every output in range; something is lit
    let mut brightest: f32 = 0.0;
    for y in 0..32 {
        for x in 0..32 {
            let c = renderer.pixel(x, y);
            assert!(c.min_element() >= 0.0 && c.max_element() <= 1.0);
            brightest = brightest.max(c.max_element());
        }
    }
    assert!(brightest > 0.1);
    assert!(renderer.denoiser().has_history());
}
