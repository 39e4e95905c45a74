//! Whitted ray tracing example.
//!
//! Renders a few spheres over a checkered ground plane and saves to PPM format.

use lux_renderer::{
    Camera, Checkerboard, Color, Glass, Integrator, Mirror, Phong, PhongCoefficients,
    RenderConfig, Renderer, Scene, SceneBuilder, SceneResult, Vec3,
};
use lux_math::Vec2;
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Lux Whitted Tracer - Simple Example");
    println!("===================================");

    let start = std::time::Instant::now();
    let scene = build_scene()?;
    println!("Scene built in {:?} ({} entities)", start.elapsed(), scene.entity_count());

    let mut camera = Camera::new(Vec3::new(0.0, 1.5, 6.0), Vec3::new(0.0, 0.5, 0.0), 45.0);
    camera.resize(640, 360);

    let config = RenderConfig {
        integrator: Integrator::Whitted,
        gamma: 2.2,
        ..RenderConfig::default()
    };
    let mut renderer = Renderer::new(scene, config)?;

    // A few accumulated frames smooth the edges
    let frames = 8;
    println!("Rendering {}x{} x {} frames...", camera.width(), camera.height(), frames);
    let start = std::time::Instant::now();
    for _ in 0..frames {
        renderer.render(&camera);
    }
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.ppm";
    save_ppm(&renderer, filename)?;
    println!("Saved to {}", filename);
    Ok(())
}

fn build_scene() -> SceneResult<Scene> {
    let mut builder = SceneBuilder::new();

    // Ground
    let ground = builder.add_material(Phong::new(Color::splat(0.8), PhongCoefficients::default()));
    let corners = [
        Vec3::new(-20.0, 0.0, 20.0),
        Vec3::new(20.0, 0.0, 20.0),
        Vec3::new(20.0, 0.0, -20.0),
        Vec3::new(-20.0, 0.0, -20.0),
    ];
    let uvs = [Vec2::ZERO, Vec2::X * 4.0, Vec2::splat(4.0), Vec2::Y * 4.0];
    builder.add_checkered_mesh(&corners, &uvs, &[0, 1, 2, 0, 2, 3], ground, Checkerboard::default())?;

    // Three main spheres
    let diffuse = builder.add_material(Phong::new(Color::new(0.4, 0.2, 0.1), PhongCoefficients::default()));
    let mirror = builder.add_material(Mirror::new(1.5));
    let glass = builder.add_material(Glass::new(1.5));
    builder.add_sphere(Vec3::new(-2.2, 1.0, 0.0), 1.0, diffuse)?;
    builder.add_sphere(Vec3::new(0.0, 1.0, -0.5), 1.0, mirror)?;
    builder.add_sphere(Vec3::new(2.2, 1.0, 0.0), 1.0, glass)?;

    builder.add_point_light(Vec3::new(-4.0, 8.0, 6.0), Color::splat(0.8));
    builder.add_point_light(Vec3::new(5.0, 6.0, 2.0), Color::splat(0.4));

    Ok(builder.build())
}

fn save_ppm(renderer: &Renderer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", renderer.width(), renderer.height())?;
    writeln!(writer, "255")?;

    // PPM rows run top-down, frame rows bottom-up
    let bytes = renderer.frame_bytes();
    let width = renderer.width() as usize;
    for row in bytes.chunks_exact(width * 4).rev() {
        for rgba in row.chunks_exact(4) {
            writeln!(writer, "{} {} {}", rgba[0], rgba[1], rgba[2])?;
        }
    }

    Ok(())
}
