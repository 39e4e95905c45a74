//! Joint bilateral filter guided by the G-buffer.

use rayon::prelude::*;

use super::GBuffer;
use crate::config::SpatialFilterConfig;
use crate::Color;

/// Filter every contributing pixel of `gbuffer` into `out` (row-major, same size).
///
/// Non-contributing pixels are copied unchanged and never enter another
/// pixel's kernel.
pub fn filter_into(gbuffer: &GBuffer, settings: &SpatialFilterConfig, clamp: bool, out: &mut [Color]) {
    let width = gbuffer.width() as usize;
    if width == 0 {
        return;
    }
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, color) in row.iter_mut().enumerate() {
            *color = filter_pixel(gbuffer, x as u32, y as u32, settings, clamp);
        }
    });
}

fn filter_pixel(gbuffer: &GBuffer, x: u32, y: u32, settings: &SpatialFilterConfig, clamp: bool) -> Color {
    let center = gbuffer.texel(x, y);
    if !center.contributor {
        return center.color;
    }

    let half = settings.half_size;
    let left = x.saturating_sub(half);
    let right = x.saturating_add(half).min(gbuffer.width() - 1);
    let bottom = y.saturating_sub(half);
    let top = y.saturating_add(half).min(gbuffer.height() - 1);

    let two_sigma_sq = |sigma: f32| 2.0 * sigma * sigma;
    let position_scale = two_sigma_sq(settings.sigma_position);
    let color_scale = two_sigma_sq(settings.sigma_color);
    let normal_scale = two_sigma_sq(settings.sigma_normal);
    let coplanarity_scale = two_sigma_sq(settings.sigma_coplanarity);

    let mut sum = Color::ZERO;
    let mut weight_sum = 0.0f32;
    for ky in bottom..=top {
        for kx in left..=right {
            let texel = gbuffer.texel(kx, ky);
            if !texel.contributor {
                continue;
            }
            if kx == x && ky == y {
                sum += center.color;
                weight_sum += 1.0;
                continue;
            }

            let dp = texel.position - center.position;
            let dc = texel.color - center.color;
            let normal_angle = texel.normal.dot(center.normal).clamp(0.0, 1.0).acos();
            let coplanarity = center.normal.dot(dp.normalize_or_zero());

            let exponent = dp.length_squared() / position_scale
                + dc.length_squared() / color_scale
                + normal_angle * normal_angle / normal_scale
                + coplanarity * coplanarity / coplanarity_scale;
            let weight = (-exponent).exp();

            sum += texel.color * weight;
            weight_sum += weight;
        }
    }

    let filtered = sum / weight_sum;
    if clamp {
        filtered.clamp(Color::ZERO, Color::ONE)
    } else {
        filtered
    }
}
