//! Random sampling helpers shared by materials and primitives.
//!
//! All functions take the generator explicitly so every pixel can own its own
//! seeded stream.

use std::f32::consts::PI;

use lux_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform float in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform direction on the hemisphere around `normal`. PDF is `1 / 2pi`.
pub fn uniform_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let cos_theta = gen_f32(rng);
    let phi = 2.0 * PI * gen_f32(rng);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    let (tangent, bitangent) = normal.any_orthonormal_pair();
    (tangent * (sin_theta * phi.cos()) + bitangent * (sin_theta * phi.sin()) + normal * cos_theta)
        .normalize()
}

/// Uniform direction on the unit sphere.
pub fn uniform_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let z = 1.0 - 2.0 * gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform point on triangle `abc`.
///
/// The square root on the first variable undoes the clustering a plain
/// barycentric draw would produce near one corner.
pub fn uniform_triangle(a: Vec3, b: Vec3, c: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let x = 1.0 - gen_f32(rng).sqrt();
    let y = gen_f32(rng);
    a * x + b * ((1.0 - x) * y) + c * ((1.0 - x) * (1.0 - y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hemisphere_stays_above_surface() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Vec3::new(0.3, -0.8, 0.5).normalize();
        for _ in 0..1000 {
            let d = uniform_hemisphere(normal, &mut rng);
            assert!(d.dot(normal) >= -1e-6);
            assert!((d.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_hemisphere_mean_cosine() {
        // E[cos] under a uniform hemisphere is 1/2
        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let mean: f32 = (0..n)
            .map(|_| uniform_hemisphere(Vec3::Y, &mut rng).y)
            .sum::<f32>()
            / n as f32;
        assert!((mean - 0.5).abs() < 0.01, "mean = {mean}");
    }

    #[test]
    fn test_sphere_points_are_unit() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sum = Vec3::ZERO;
        for _ in 0..5000 {
            let d = uniform_sphere(&mut rng);
            assert!((d.length() - 1.0).abs() < 1e-4);
            sum += d;
        }
        assert!((sum / 5000.0).length() < 0.05);
    }

    #[test]
    fn test_triangle_samples_are_inside_and_uniform() {
        let mut rng = StdRng::seed_from_u64(5);
        let (a, b, c) = (Vec3::ZERO, Vec3::X, Vec3::Y);
        let n = 20_000;
        let mut centroid = Vec3::ZERO;
        for _ in 0..n {
            let p = uniform_triangle(a, b, c, &mut rng);
            assert!(p.x >= -1e-6 && p.y >= -1e-6 && p.x + p.y <= 1.0 + 1e-5);
            assert!(p.z.abs() < 1e-6);
            centroid += p;
        }
        let centroid = centroid / n as f32;
        assert!((centroid - Vec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0)).length() < 0.01);
    }
}
