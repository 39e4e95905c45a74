//! Temporal reprojection filter.
//!
//! Each contributing pixel looks up where its world position landed in the
//! previous frame. If the same primitive was visible there, the old color is
//! clamped to the current neighborhood and blended in.

use lux_math::{Vec2, Vec3};
use rayon::prelude::*;

use super::GBuffer;
use crate::config::TemporalFilterConfig;
use crate::Color;

/// Blend `current` with `previous` into `out` (row-major, same size as `current`).
pub fn filter_into(
    current: &GBuffer,
    previous: Option<&GBuffer>,
    settings: &TemporalFilterConfig,
    out: &mut [Color],
) {
    let width = current.width() as usize;
    if width == 0 {
        return;
    }
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, color) in row.iter_mut().enumerate() {
            *color = filter_pixel(current, previous, x as u32, y as u32, settings);
        }
    });
}

fn filter_pixel(
    current: &GBuffer,
    previous: Option<&GBuffer>,
    x: u32,
    y: u32,
    settings: &TemporalFilterConfig,
) -> Color {
    let texel = current.texel(x, y);
    let Some(id) = texel.primitive_id else {
        return texel.color;
    };
    let Some(previous) = previous else {
        return texel.color;
    };
    let Some((px, py)) = reproject(previous, texel.position) else {
        return texel.color;
    };
    if previous.texel(px, py).primitive_id != Some(id) {
        return texel.color;
    }

    let (mean, std_dev) = neighborhood_stats(current, x, y, settings.half_size);
    let spread = std_dev * settings.tolerance;
    let history = previous.color(px, py).max(mean - spread).min(mean + spread);

    let w = settings.current_frame_weight;
    history * (1.0 - w) + texel.color * w
}

/// Pixel of `frame` that `position` projects onto through that frame's own
/// camera matrices. `None` when it falls outside the image or behind the camera.
pub fn reproject(frame: &GBuffer, position: Vec3) -> Option<(u32, u32)> {
    let clip = frame.projection * frame.view * position.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = Vec2::new(clip.x, clip.y) / clip.w;
    let screen = (ndc + 1.0) * 0.5;
    let (width, height) = (frame.width() as f32, frame.height() as f32);
    let pixel = screen * Vec2::new(width, height);

    if pixel.x > 0.0 && pixel.x < width && pixel.y > 0.0 && pixel.y < height {
        Some((pixel.x as u32, pixel.y as u32))
    } else {
        None
    }
}

/// Per-channel mean and standard deviation of `frame`'s colors in the square
/// window of half size `half` around `(x, y)`, clipped to the image.
pub fn neighborhood_stats(frame: &GBuffer, x: u32, y: u32, half: u32) -> (Color, Color) {
    let left = x.saturating_sub(half);
    let right = x.saturating_add(half).min(frame.width() - 1);
    let bottom = y.saturating_sub(half);
    let top = y.saturating_add(half).min(frame.height() - 1);

    let mut sum = Color::ZERO;
    let mut sum_sq = Color::ZERO;
    let mut n = 0u32;
    for ky in bottom..=top {
        for kx in left..=right {
            let c = frame.color(kx, ky);
            sum += c;
            sum_sq += c * c;
            n += 1;
        }
    }

    let mean = sum / n as f32;
    let variance = (sum_sq / n as f32 - mean * mean).max(Color::ZERO);
    (mean, Vec3::new(variance.x.sqrt(), variance.y.sqrt(), variance.z.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denoiser::Texel;
    use lux_math::Mat4;

    /// With identity matrices, the world position of pixel center `(x, y)`.
    fn pixel_center(x: u32, y: u32, width: u32, height: u32) -> Vec3 {
        Vec3::new(
            (x as f32 + 0.5) / width as f32 * 2.0 - 1.0,
            (y as f32 + 0.5) / height as f32 * 2.0 - 1.0,
            0.0,
        )
    }

    fn uniform_frame(width: u32, height: u32, color: Color, id: u32) -> GBuffer {
        let mut gbuffer = GBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                *gbuffer.texels.get_mut(x, y) = Texel {
                    position: pixel_center(x, y, width, height),
                    color,
                    normal: Vec3::Z,
                    contributor: true,
                    primitive_id: Some(id),
                };
            }
        }
        gbuffer
    }

    fn run(current: &GBuffer, previous: Option<&GBuffer>) -> Vec<Color> {
        let mut out = vec![Color::ZERO; current.texels.as_slice().len()];
        filter_into(current, previous, &TemporalFilterConfig::default(), &mut out);
        out
    }

    #[test]
    fn test_reproject_identity() {
        let frame = uniform_frame(8, 6, Color::ONE, 1);
        assert_eq!(reproject(&frame, pixel_center(3, 2, 8, 6)), Some((3, 2)));
        assert_eq!(reproject(&frame, Vec3::new(1.5, 0.0, 0.0)), None);
        // Exactly on the left border is rejected
        assert_eq!(reproject(&frame, Vec3::new(-1.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_reproject_rejects_points_behind_camera() {
        let mut frame = uniform_frame(8, 8, Color::ONE, 1);
        frame.projection = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        frame.view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        assert!(reproject(&frame, Vec3::new(0.0, 0.0, -5.0)).is_some());
        assert!(reproject(&frame, Vec3::new(0.0, 0.0, 5.0)).is_none());
    }

    #[test]
    fn test_neighborhood_stats() {
        let mut frame = uniform_frame(3, 3, Color::ZERO, 1);
        for (i, t) in frame.texels.as_mut_slice().iter_mut().enumerate() {
            t.color = Color::splat(if i % 2 == 0 { 1.0 } else { 0.0 });
        }
        let (mean, std_dev) = neighborhood_stats(&frame, 1, 1, 1);
        assert!((mean.x - 5.0 / 9.0).abs() < 1e-6);
        let expected = (5.0f32 / 9.0 * (4.0 / 9.0)).sqrt();
        assert!((std_dev.x - expected).abs() < 1e-5);

        // Corner window is clipped to 2x2
        let (mean, _) = neighborhood_stats(&frame, 0, 0, 1);
        assert!((mean.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_neighborhood_window_larger_than_image() {
        let mut frame = uniform_frame(4, 4, Color::ZERO, 1);
        frame.texels.get_mut(3, 3).color = Color::splat(1.6);
        let (mean, std_dev) = neighborhood_stats(&frame, 2, 2, u32::MAX);
        assert!((mean.x - 0.1).abs() < 1e-6);
        assert!(std_dev.x.is_finite());

        let settings = TemporalFilterConfig {
            half_size: u32::MAX,
            ..TemporalFilterConfig::default()
        };
        let mut out = vec![Color::ZERO; 16];
        filter_into(&frame, Some(&frame), &settings, &mut out);
        assert!(out.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_without_history_passes_through() {
        let current = uniform_frame(4, 4, Color::splat(0.3), 1);
        let out = run(&current, None);
        assert!(out.iter().all(|c| *c == Color::splat(0.3)));
    }

    #[test]
    fn test_blends_history_of_same_primitive() {
        // A checkered current frame has a wide neighborhood spread, so the
        // history survives the clamp and the blend is visible.
        let mut current = uniform_frame(4, 4, Color::splat(0.2), 1);
        for (i, t) in current.texels.as_mut_slice().iter_mut().enumerate() {
            if (i + i / 4) % 2 == 1 {
                t.color = Color::splat(0.8);
            }
        }
        let previous = uniform_frame(4, 4, Color::splat(0.5), 1);
        let out = run(&current, Some(&previous));
        // Pixel (1, 1) is 0.2; blend = 0.8 * 0.5 + 0.2 * 0.2
        assert!((out[5].x - 0.44).abs() < 1e-5, "out = {:?}", out[5]);
    }

    #[test]
    fn test_history_is_clamped_to_neighborhood() {
        let current = uniform_frame(4, 4, Color::splat(0.2), 1);
        let previous = uniform_frame(4, 4, Color::splat(0.9), 1);
        let out = run(&current, Some(&previous));
        // Zero spread: history collapses onto the current color
        assert!(out.iter().all(|c| (*c - Color::splat(0.2)).length() < 1e-6));
    }

    #[test]
    fn test_mismatched_primitive_rejects_history() {
        let mut current = uniform_frame(4, 4, Color::splat(0.2), 1);
        current.texels.get_mut(0, 1).color = Color::splat(0.8);
        let previous = uniform_frame(4, 4, Color::splat(0.5), 2);
        let out = run(&current, Some(&previous));
        assert_eq!(out[4], Color::splat(0.8));
        assert_eq!(out[0], Color::splat(0.2));
    }
}
