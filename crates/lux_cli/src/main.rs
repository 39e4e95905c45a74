use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lux_renderer::{Camera, Integrator, RenderConfig, Renderer, Vec3};

mod cornell;

/// Render the built-in Cornell box to a PNG.
#[derive(Parser, Debug)]
#[command(name = "lux", version, about)]
struct Args {
    /// JSON render configuration; defaults are used for missing fields
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 512)]
    width: u32,

    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Number of frames to render; the last one is written out
    #[arg(long, short = 'f', default_value_t = 16)]
    frames: u32,

    /// Overrides the integrator from the configuration
    #[arg(long, value_enum)]
    integrator: Option<IntegratorArg>,

    #[arg(long, short = 'o', value_name = "PATH", default_value = "lux.png")]
    output: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum IntegratorArg {
    Whitted,
    PathTraced,
}

impl From<IntegratorArg> for Integrator {
    fn from(arg: IntegratorArg) -> Self {
        match arg {
            IntegratorArg::Whitted => Integrator::Whitted,
            IntegratorArg::PathTraced => Integrator::PathTraced,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    log::info!("Starting Lux");

    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RenderConfig::default(),
    };
    if let Some(integrator) = args.integrator {
        config.integrator = integrator.into();
    }

    let scene = cornell::build().context("failed to build the Cornell box")?;
    let mut renderer = Renderer::new(scene, config).context("invalid render config")?;

    let mut camera = Camera::new(Vec3::new(0.0, 0.0, 3.4), Vec3::ZERO, 40.0);
    camera.resize(args.width, args.height);

    let start = Instant::now();
    for _ in 0..args.frames.max(1) {
        renderer.render(&camera);
    }
    log::info!(
        "Rendered {} frame(s) at {}x{} in {:?}",
        args.frames.max(1),
        args.width,
        args.height,
        start.elapsed()
    );

    save_png(&renderer, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}

/// Row 0 of the frame is the bottom of the image, PNG rows run top-down.
fn save_png(renderer: &Renderer, path: &Path) -> Result<()> {
    let (width, height) = (renderer.width(), renderer.height());
    let image = image::RgbaImage::from_raw(width, height, renderer.frame_bytes().to_vec())
        .context("frame size does not match the viewport")?;
    image::imageops::flip_vertical(&image).save(path)?;
    Ok(())
}
