//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! The tree stores indices into a primitive slice owned by the caller (a mesh's
//! triangles or the scene's entity arena), so it never borrows or moves the
//! primitives themselves. Built once, immutable afterwards, safe to share
//! between render threads.

use lux_math::Aabb;
use rand::RngCore;

use crate::hittable::{Hittable, IntersectionRecord, SurfaceSample};
use crate::sampling::gen_f32;
use crate::Ray;

/// BVH node - either a branch with two children or a leaf with one primitive.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
        /// Summed surface area of every primitive below this node.
        area: f32,
    },
    /// Leaf holding exactly one primitive.
    Leaf { index: usize, bbox: Aabb, area: f32 },
}

impl BvhNode {
    #[inline]
    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        match self {
            BvhNode::Branch { area, .. } | BvhNode::Leaf { area, .. } => *area,
        }
    }
}

/// Per-primitive data captured once before the recursive build.
struct BuildEntry {
    index: usize,
    bbox: Aabb,
    centroid: [f32; 3],
    area: f32,
}

/// Median-split BVH over an external primitive slice.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    root: Option<BvhNode>,
}

impl Bvh {
    /// Build a tree over `primitives`. An empty slice yields an empty tree.
    pub fn new<P: Hittable>(primitives: &[P]) -> Self {
        if primitives.is_empty() {
            return Self { root: None };
        }

        let mut entries: Vec<BuildEntry> = primitives
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let bbox = p.bounding_box();
                BuildEntry {
                    index,
                    bbox,
                    centroid: bbox.centroid().to_array(),
                    area: p.area(),
                }
            })
            .collect();

        Self {
            root: Some(Self::build(&mut entries)),
        }
    }

    /// Recursive median split on the longest axis of the centroid bounds.
    fn build(entries: &mut [BuildEntry]) -> BvhNode {
        match entries.len() {
            1 => {
                let only = &entries[0];
                BvhNode::Leaf {
                    index: only.index,
                    bbox: only.bbox,
                    area: only.area,
                }
            }
            // Two leaves rather than one merged node
            2 => {
                let (first, second) = entries.split_at_mut(1);
                Self::branch(Self::build(first), Self::build(second))
            }
            _ => {
                let centroid_bounds = entries.iter().fold(Aabb::EMPTY, |acc, e| {
                    acc.union_point(e.centroid.into())
                });
                let axis = centroid_bounds.longest_axis();

                entries.sort_by(|a, b| {
                    a.centroid[axis]
                        .partial_cmp(&b.centroid[axis])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

                let mid = entries.len() / 2;
                let (lower, upper) = entries.split_at_mut(mid);
                let left = Self::build(lower);
                let right = Self::build(upper);
                Self::branch(left, right)
            }
        }
    }

    fn branch(left: BvhNode, right: BvhNode) -> BvhNode {
        BvhNode::Branch {
            bbox: left.bbox().union(&right.bbox()),
            area: left.area() + right.area(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Bounds of everything in the tree, [`Aabb::EMPTY`] when empty.
    pub fn bounding_box(&self) -> Aabb {
        self.root.as_ref().map_or(Aabb::EMPTY, BvhNode::bbox)
    }

    /// Summed surface area of all primitives.
    pub fn area(&self) -> f32 {
        self.root.as_ref().map_or(0.0, BvhNode::area)
    }

    /// Total number of nodes, leaves included.
    pub fn node_count(&self) -> usize {
        fn count(node: &BvhNode) -> usize {
            match node {
                BvhNode::Leaf { .. } => 1,
                BvhNode::Branch { left, right, .. } => 1 + count(left) + count(right),
            }
        }
        self.root.as_ref().map_or(0, count)
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn depth(node: &BvhNode) -> usize {
            match node {
                BvhNode::Leaf { .. } => 1,
                BvhNode::Branch { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }

    /// Nearest hit, with `leaf_hit` resolving the primitive at a leaf index.
    ///
    /// Both children of a branch are always visited and the closer record wins.
    pub fn traverse<F>(&self, ray: &Ray, leaf_hit: F) -> IntersectionRecord
    where
        F: Fn(usize, &Ray) -> IntersectionRecord,
    {
        fn visit<F>(node: &BvhNode, ray: &Ray, leaf_hit: &F) -> IntersectionRecord
        where
            F: Fn(usize, &Ray) -> IntersectionRecord,
        {
            if !node.bbox().hit(ray) {
                return IntersectionRecord::MISS;
            }
            match node {
                BvhNode::Leaf { index, .. } => leaf_hit(*index, ray),
                BvhNode::Branch { left, right, .. } => {
                    let left_rec = visit(left, ray, leaf_hit);
                    let right_rec = visit(right, ray, leaf_hit);
                    left_rec.nearer(right_rec)
                }
            }
        }

        match &self.root {
            Some(root) => visit(root, ray, &leaf_hit),
            None => IntersectionRecord::MISS,
        }
    }

    /// Nearest hit among `primitives`, which must be the slice the tree was built from.
    pub fn nearest_hit<P: Hittable>(&self, primitives: &[P], ray: &Ray) -> IntersectionRecord {
        self.traverse(ray, |index, ray| primitives[index].intersect(ray))
    }

    /// Uniform-by-area point over the whole tree.
    ///
    /// Each branch picks a child with probability proportional to its area;
    /// `leaf_sample` draws the point on the chosen primitive. The returned
    /// density is `1 / total area`. `None` when the tree has no area.
    pub fn sample<F>(&self, rng: &mut dyn RngCore, leaf_sample: F) -> Option<SurfaceSample>
    where
        F: Fn(usize, &mut dyn RngCore) -> SurfaceSample,
    {
        let root = self.root.as_ref()?;
        let total = root.area();
        if total <= 0.0 {
            return None;
        }

        let mut node = root;
        loop {
            match node {
                BvhNode::Leaf { index, .. } => {
                    let mut sample = leaf_sample(*index, rng);
                    sample.pdf = 1.0 / total;
                    return Some(sample);
                }
                BvhNode::Branch { left, right, area, .. } => {
                    let pick = gen_f32(rng) * area;
                    node = if pick < left.area() {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }

    /// [`Bvh::sample`] over the slice the tree was built from.
    pub fn sample_primitives<P: Hittable>(
        &self,
        primitives: &[P],
        rng: &mut dyn RngCore,
    ) -> Option<SurfaceSample> {
        self.sample(rng, |index, rng| primitives[index].sample(rng))
    }
}
