//! Frame orchestration.
//!
//! A [`Renderer`] owns the scene, the per-pixel buffers and the denoiser, and
//! turns one [`Camera`] into one finished frame per [`Renderer::render`] call:
//! - path traced: 1 spp per pixel, spatial filter, temporal filter
//! - Whitted: deterministic shading, averaged over frames while the view holds

use std::time::Instant;

use lux_math::{Camera, Mat4, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::config::Integrator;
use crate::denoiser::{Denoiser, FrameBuffer, GBuffer};
use crate::error::ConfigResult;
use crate::sampling::gen_f32;
use crate::{path_tracer, whitted, Color, Ray, RenderConfig, Scene};

/// Renders frames of a fixed scene.
pub struct Renderer {
    scene: Scene,
    config: RenderConfig,
    width: u32,
    height: u32,
    gbuffer: GBuffer,
    denoiser: Denoiser,
    accumulation: FrameBuffer<Color>,
    accumulated_frames: u32,
    accumulated_view: Option<(Mat4, Mat4)>,
    final_colors: FrameBuffer<Color>,
    frame: Vec<u32>,
    frame_index: u64,
}

impl Renderer {
    /// Validate `config` and take ownership of `scene`. Buffers are sized on
    /// the first [`Renderer::resize`] or [`Renderer::render`].
    pub fn new(scene: Scene, config: RenderConfig) -> ConfigResult<Self> {
        config.validate()?;
        warn_on_missing_lights(&scene, &config);
        Ok(Self {
            scene,
            config,
            width: 0,
            height: 0,
            gbuffer: GBuffer::new(0, 0),
            denoiser: Denoiser::new(0, 0),
            accumulation: FrameBuffer::new(0, 0),
            accumulated_frames: 0,
            accumulated_view: None,
            final_colors: FrameBuffer::new(0, 0),
            frame: Vec::new(),
            frame_index: 0,
        })
    }

    /// Reallocate every buffer and drop temporal history. A no-op when the
    /// size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        log::info!("Resizing renderer to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.gbuffer.reset(width, height);
        self.denoiser.resize(width, height);
        self.accumulation.reset(width, height);
        self.final_colors.reset(width, height);
        self.frame.clear();
        self.frame.resize((width * height) as usize, 0);
        self.accumulated_frames = 0;
        self.accumulated_view = None;
    }

    /// Forget temporal history and progressive accumulation.
    pub fn restart_temporal(&mut self) {
        self.denoiser.restart_temporal();
        self.reset_accumulation();
    }

    /// Restart progressive averaging of Whitted frames.
    pub fn reset_accumulation(&mut self) {
        self.accumulation.fill(Color::ZERO);
        self.accumulated_frames = 0;
        self.accumulated_view = None;
    }

    /// Render one frame from `camera`, resizing first if the camera's
    /// viewport differs.
    pub fn render(&mut self, camera: &Camera) {
        self.resize(camera.width(), camera.height());
        if self.width == 0 || self.height == 0 {
            return;
        }

        let start = Instant::now();
        match self.config.integrator {
            Integrator::PathTraced => self.render_path_traced(camera),
            Integrator::Whitted => self.render_whitted(camera),
        }

        let gamma = self.config.gamma;
        self.frame
            .par_iter_mut()
            .zip(self.final_colors.as_slice().par_iter())
            .for_each(|(pixel, color)| *pixel = color_to_rgba(*color, gamma));

        log::debug!(
            "Frame {} ({:?}) rendered in {:.2?}",
            self.frame_index,
            self.config.integrator,
            start.elapsed()
        );
        self.frame_index += 1;
    }

    fn render_path_traced(&mut self, camera: &Camera) {
        let scene = &self.scene;
        let config = &self.config;
        let width = self.width as usize;
        let frame_index = self.frame_index;

        self.gbuffer
            .texels
            .as_mut_slice()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, texel) in row.iter_mut().enumerate() {
                    let pixel = (y * width + x) as u64;
                    let mut rng = StdRng::seed_from_u64(pixel_seed(config.seed, frame_index, pixel));
                    let ray = Ray::new(camera.position, camera.ray_direction(x as u32, y as u32));

                    *texel = path_tracer::cast_path(scene, &ray, config, &mut rng);
                    if config.immediate_clamp {
                        texel.color = texel.color.clamp(Color::ZERO, Color::ONE);
                    }
                }
            });

        self.denoiser
            .spatial_filter(&mut self.gbuffer, &config.spatial, config.immediate_clamp);
        self.gbuffer.view = camera.view_matrix();
        self.gbuffer.projection = camera.projection_matrix();
        self.denoiser.temporal_filter(&mut self.gbuffer, &config.temporal);

        self.final_colors
            .as_mut_slice()
            .par_iter_mut()
            .zip(self.gbuffer.texels.as_slice().par_iter())
            .for_each(|(out, texel)| *out = texel.color);
    }

    fn render_whitted(&mut self, camera: &Camera) {
        let view = (camera.view_matrix(), camera.projection_matrix());
        if !self.config.accumulate || self.accumulated_view != Some(view) {
            self.reset_accumulation();
            self.accumulated_view = Some(view);
        }

        let scene = &self.scene;
        let config = &self.config;
        let width = self.width as usize;
        let frame_index = self.frame_index;
        // The first frame of a run goes through pixel corners; later ones jitter
        let jitter = self.accumulated_frames > 0;
        let frames = (self.accumulated_frames + 1) as f32;

        self.accumulation
            .as_mut_slice()
            .par_chunks_mut(width)
            .zip(self.final_colors.as_mut_slice().par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (sums, finals))| {
                for (x, (sum, out)) in sums.iter_mut().zip(finals.iter_mut()).enumerate() {
                    let direction = if jitter {
                        let pixel = (y * width + x) as u64;
                        let mut rng = StdRng::seed_from_u64(pixel_seed(config.seed, frame_index, pixel));
                        camera.direction_through(x as f32 + gen_f32(&mut rng), y as f32 + gen_f32(&mut rng))
                    } else {
                        camera.ray_direction(x as u32, y as u32)
                    };

                    *sum += whitted::trace(scene, &Ray::new(camera.position, direction), 0, config);
                    *out = *sum / frames;
                }
            });

        self.accumulated_frames += 1;
    }

    /// Final linear color of pixel `(x, y)` after denoising or accumulation.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        *self.final_colors.get(x, y)
    }

    /// Packed `0xAABBGGRR` pixels, row 0 at the bottom.
    pub fn frame(&self) -> &[u32] {
        &self.frame
    }

    /// The packed frame as RGBA bytes.
    pub fn frame_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.frame)
    }

    pub fn gbuffer(&self) -> &GBuffer {
        &self.gbuffer
    }

    pub fn denoiser(&self) -> &Denoiser {
        &self.denoiser
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace the configuration. Switching integrators restarts history.
    pub fn set_config(&mut self, config: RenderConfig) -> ConfigResult<()> {
        config.validate()?;
        if config.integrator != self.config.integrator {
            warn_on_missing_lights(&self.scene, &config);
            self.restart_temporal();
        }
        self.config = config;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of frames rendered so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Whitted frames averaged into the current image.
    pub fn accumulated_frames(&self) -> u32 {
        self.accumulated_frames
    }
}

fn warn_on_missing_lights(scene: &Scene, config: &RenderConfig) {
    match config.integrator {
        Integrator::PathTraced if scene.emitter().is_none() => {
            log::warn!("Path-traced scene has no emissive entity; direct lighting will be black")
        }
        Integrator::Whitted if scene.lights().is_empty() => {
            log::warn!("Whitted scene has no point lights; diffuse surfaces will be black")
        }
        _ => {}
    }
}

/// Independent RNG seed per (run, frame, pixel).
fn pixel_seed(seed: u64, frame: u64, pixel: u64) -> u64 {
    let mut z = seed
        ^ frame.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ pixel.wrapping_mul(0xD1B5_4A32_D192_ED03);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Apply display gamma. `gamma == 1.0` leaves the value linear.
#[inline]
pub fn linear_to_gamma(linear: f32, gamma: f32) -> f32 {
    if linear <= 0.0 {
        0.0
    } else if gamma == 1.0 {
        linear
    } else {
        linear.powf(1.0 / gamma)
    }
}

/// Clamp to [0, 1], gamma-correct and pack as `0xAABBGGRR` with opaque alpha,
/// so the bytes in memory read R, G, B, A on little-endian targets.
pub fn color_to_rgba(color: Color, gamma: f32) -> u32 {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE);
    let to_byte = |v: f32| (255.0 * linear_to_gamma(v, gamma).clamp(0.0, 1.0)) as u32;
    let (r, g, b) = (to_byte(c.x), to_byte(c.y), to_byte(c.z));
    (255 << 24) | (b << 16) | (g << 8) | r
}
