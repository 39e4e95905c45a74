use crate::{Interval, Vec3};

/// Smallest parametric distance at which a surface hit is accepted.
pub const MIN_HIT_DISTANCE: f64 = 1e-6;

/// A ray in 3D space with origin, direction, and a validity interval.
///
/// The reciprocal of the direction is computed once at construction so the
/// slab test against bounding boxes only multiplies. The direction does not
/// have to be normalized; integrators normalize before shading.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Component-wise `1 / direction`. Zero components map to +/- infinity.
    pub inv_direction: Vec3,
    /// Parametric range in which hits are accepted (exclusive at both ends).
    pub range: Interval,
}

impl Ray {
    /// Create a new ray valid on `(MIN_HIT_DISTANCE, +inf)`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::with_range(origin, direction, Interval::new(MIN_HIT_DISTANCE, f64::INFINITY))
    }

    /// Create a ray with an explicit validity interval.
    pub fn with_range(origin: Vec3, direction: Vec3, range: Interval) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
            range,
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t as f32
    }

    /// True when the direction has no length and the ray cannot travel.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO
    }

    /// Whether the direction component on `axis` is negative, judged from the
    /// reciprocal so that `-0.0` counts as negative.
    #[inline]
    pub fn direction_is_negative(&self, axis: usize) -> bool {
        self.inv_direction[axis] < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_creation() {
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let direction = Vec3::new(0.0, 2.0, 4.0);
        let ray = Ray::new(origin, direction);

        assert_eq!(ray.origin, origin);
        assert_eq!(ray.direction, direction);
        assert_eq!(ray.inv_direction.y, 0.5);
        assert_eq!(ray.inv_direction.z, 0.25);
        assert!(ray.inv_direction.x.is_infinite());
        assert_eq!(ray.range.min, MIN_HIT_DISTANCE);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_negative_zero_direction_counts_as_negative() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, -0.0, 0.0));
        assert!(!ray.direction_is_negative(0));
        assert!(ray.direction_is_negative(1));
        assert!(!ray.direction_is_negative(2));
    }

    #[test]
    fn test_degenerate_ray() {
        assert!(Ray::new(Vec3::ONE, Vec3::ZERO).is_degenerate());
        assert!(!Ray::new(Vec3::ONE, Vec3::Y).is_degenerate());
    }
}
