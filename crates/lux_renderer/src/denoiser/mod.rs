//! Spatio-temporal denoising of 1 sample-per-pixel path-traced frames.
//!
//! A frame runs through [`Denoiser::spatial_filter`] and then
//! [`Denoiser::temporal_filter`]. Both overwrite the G-buffer colors in
//! place; the temporal pass then keeps the whole G-buffer as history for the
//! next frame.

mod bilateral;
mod gbuffer;
mod temporal;

pub use gbuffer::{FrameBuffer, GBuffer, Texel};
pub use temporal::{neighborhood_stats, reproject};

use rayon::prelude::*;

use crate::config::{SpatialFilterConfig, TemporalFilterConfig};
use crate::Color;

/// Holds one generation of history plus a scratch buffer for filter output.
#[derive(Debug, Clone)]
pub struct Denoiser {
    history: GBuffer,
    has_history: bool,
    scratch: FrameBuffer<Color>,
}

impl Denoiser {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            history: GBuffer::new(width, height),
            has_history: false,
            scratch: FrameBuffer::new(width, height),
        }
    }

    /// Reallocate for a new viewport; history is dropped.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.history.reset(width, height);
        self.scratch.reset(width, height);
        self.has_history = false;
    }

    /// Forget the previous frame, e.g. after a camera cut.
    pub fn restart_temporal(&mut self) {
        self.has_history = false;
    }

    pub fn has_history(&self) -> bool {
        self.has_history
    }

    /// The previous frame, when it can be reprojected into.
    pub fn history(&self) -> Option<&GBuffer> {
        self.has_history.then_some(&self.history)
    }

    /// Joint bilateral pass. With `clamp`, results are limited to [0, 1].
    pub fn spatial_filter(&mut self, gbuffer: &mut GBuffer, settings: &SpatialFilterConfig, clamp: bool) {
        if !settings.enabled {
            return;
        }
        self.fit_scratch(gbuffer);
        bilateral::filter_into(gbuffer, settings, clamp, self.scratch.as_mut_slice());
        write_colors(gbuffer, &self.scratch);
    }

    /// Temporal pass. Disabling it also invalidates the stored history.
    pub fn temporal_filter(&mut self, gbuffer: &mut GBuffer, settings: &TemporalFilterConfig) {
        if !settings.enabled {
            self.has_history = false;
            return;
        }
        self.fit_scratch(gbuffer);

        let same_size = self.history.width() == gbuffer.width()
            && self.history.height() == gbuffer.height();
        let previous = (self.has_history && same_size).then_some(&self.history);
        temporal::filter_into(gbuffer, previous, settings, self.scratch.as_mut_slice());
        write_colors(gbuffer, &self.scratch);

        self.history.clone_from(gbuffer);
        self.has_history = true;
    }

    fn fit_scratch(&mut self, gbuffer: &GBuffer) {
        if self.scratch.width() != gbuffer.width() || self.scratch.height() != gbuffer.height() {
            self.scratch.reset(gbuffer.width(), gbuffer.height());
        }
    }
}

fn write_colors(gbuffer: &mut GBuffer, colors: &FrameBuffer<Color>) {
    gbuffer
        .texels
        .as_mut_slice()
        .par_iter_mut()
        .zip(colors.as_slice().par_iter())
        .for_each(|(texel, color)| texel.color = *color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_math::Vec3;

    fn frame(width: u32, height: u32, color: Color) -> GBuffer {
        let mut gbuffer = GBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                *gbuffer.texels.get_mut(x, y) = Texel {
                    position: Vec3::new(
                        (x as f32 + 0.5) / width as f32 * 2.0 - 1.0,
                        (y as f32 + 0.5) / height as f32 * 2.0 - 1.0,
                        0.0,
                    ),
                    color,
                    normal: Vec3::Z,
                    contributor: true,
                    primitive_id: Some(1),
                };
            }
        }
        gbuffer
    }

    #[test]
    fn test_history_lifecycle() {
        let mut denoiser = Denoiser::new(4, 4);
        let settings = TemporalFilterConfig::default();
        assert!(!denoiser.has_history());

        let mut gbuffer = frame(4, 4, Color::splat(0.5));
        denoiser.temporal_filter(&mut gbuffer, &settings);
        assert!(denoiser.has_history());
        assert_eq!(denoiser.history(), Some(&gbuffer));

        denoiser.restart_temporal();
        assert!(denoiser.history().is_none());

        denoiser.temporal_filter(&mut gbuffer, &settings);
        denoiser.resize(8, 8);
        assert!(!denoiser.has_history());
    }

    #[test]
    fn test_disabled_temporal_drops_history() {
        let mut denoiser = Denoiser::new(4, 4);
        let mut gbuffer = frame(4, 4, Color::splat(0.5));
        denoiser.temporal_filter(&mut gbuffer, &TemporalFilterConfig::default());
        let disabled = TemporalFilterConfig {
            enabled: false,
            ..TemporalFilterConfig::default()
        };
        gbuffer.texels.get_mut(0, 0).color = Color::ONE;
        denoiser.temporal_filter(&mut gbuffer, &disabled);
        assert!(!denoiser.has_history());
        assert_eq!(gbuffer.color(0, 0), Color::ONE);
    }

    #[test]
    fn test_disabled_spatial_is_identity() {
        let mut denoiser = Denoiser::new(3, 3);
        let mut gbuffer = frame(3, 3, Color::splat(0.5));
        gbuffer.texels.get_mut(1, 1).color = Color::splat(3.0);
        let before = gbuffer.clone();
        let settings = SpatialFilterConfig {
            enabled: false,
            ..SpatialFilterConfig::default()
        };
        denoiser.spatial_filter(&mut gbuffer, &settings, true);
        assert_eq!(gbuffer, before);
    }

    #[test]
    fn test_size_mismatch_ignores_history() {
        let mut denoiser = Denoiser::new(4, 4);
        let settings = TemporalFilterConfig::default();
        let mut small = frame(4, 4, Color::splat(0.9));
        denoiser.temporal_filter(&mut small, &settings);

        // Caller skipped resize: new frame is larger, history must not be used
        let mut large = frame(6, 6, Color::splat(0.1));
        denoiser.temporal_filter(&mut large, &settings);
        assert!(large.texels.as_slice().iter().all(|t| t.color == Color::splat(0.1)));
    }
}
