use crate::{Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// The empty box has `min = +inf` and `max = -inf` on every axis, which makes it
/// the identity of [`Aabb::union`] and guarantees every ray misses it. Boxes may
/// be flat or collapse to a point; the slab test handles both.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// A box that contains nothing.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create an AABB from two corner points in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// A box that contains exactly one point.
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// True when the box contains no point at all.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Smallest box containing this box and `p`.
    pub fn union_point(&self, p: Vec3) -> Aabb {
        Aabb {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// True when the two boxes share at least one point.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.max.cmpge(other.min).all() && self.min.cmple(other.max).all()
    }

    /// The overlapping region of two boxes, or [`Aabb::EMPTY`] if they are disjoint.
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        if !self.overlaps(other) {
            return Aabb::EMPTY;
        }
        Aabb {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: Vec3) -> bool {
        self.min.cmple(p).all() && p.cmple(self.max).all()
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        0.5 * (self.min + self.max)
    }

    /// Vector from the min corner to the max corner.
    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    /// Total area of the six faces. Zero for the empty box.
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.y * d.z + d.x * d.z)
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties go to the earlier axis: X over Y over Z.
    pub fn longest_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Slab test. Returns the parametric `(t_enter, t_exit)` pair when the ray's
    /// line crosses the box with `t_exit >= 0`.
    ///
    /// Entry/exit are swapped per axis when the direction is negative on it.
    /// NaN slabs (origin lying exactly on a slab plane of an axis the ray is
    /// parallel to) are ignored by `f32::max`/`f32::min`.
    pub fn slab(&self, ray: &Ray) -> Option<(f32, f32)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let inv = ray.inv_direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv;
            if ray.direction_is_negative(axis) {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
        }

        if self.is_empty() || t_exit < 0.0 || t_enter > t_exit {
            return None;
        }
        Some((t_enter, t_exit))
    }

    /// Test if a ray intersects this AABB.
    #[inline]
    pub fn hit(&self, ray: &Ray) -> bool {
        self.slab(ray).is_some()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}
