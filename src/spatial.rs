// KD-tree backed point index

use crate::geometry::Point3D;
use kiddo::{KdTree, SquaredEuclidean};

/// Spatial index over 3D points with caller-supplied ids. Queries may work
/// on XY projections simply by inserting points with their Z zeroed.
pub struct SpatialIndex {
    tree: KdTree<f64, 3>,
    entries: Vec<(Point3D, u32)>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self {
            tree: KdTree::new(),
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, point: Point3D, id: u32) {
        self.tree
            .add(&[point.x, point.y, point.z], self.entries.len() as u64);
        self.entries.push((point, id));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// All entries within `radius` of `center`, in insertion order
    pub fn within_radius(&self, center: &Point3D, radius: f64) -> Vec<(Point3D, u32)> {
        let mut slots: Vec<usize> = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&[center.x, center.y, center.z], radius * radius)
            .into_iter()
            .map(|hit| hit.item as usize)
            .collect();
        slots.sort_unstable();
        slots.into_iter().map(|s| self.entries[s]).collect()
    }

    /// Up to `k` entries nearest to `center`, closest first
    pub fn nearest(&self, center: &Point3D, k: usize) -> Vec<(Point3D, u32)> {
        self.tree
            .nearest_n::<SquaredEuclidean>(&[center.x, center.y, center.z], k)
            .into_iter()
            .map(|hit| self.entries[hit.item as usize])
            .collect()
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
