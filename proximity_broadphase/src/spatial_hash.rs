//! Uniform-grid spatial hash used by tetra-tetra detection instead of the
//! shared octree: chaining buckets keyed by cell-quantized coordinates.

use glam::Vec3;
use hashbrown::HashMap;
use proximity_geometry::Aabb3;

type Cell = (i32, i32, i32);

/// A chaining hash over 3D space, bucketed by a fixed cell size. Unlike the
/// octree this crate otherwise drives candidate enumeration through, this
/// structure is built fresh per detect call and discarded — it has no
/// incremental-update story, matching the façade's tetra-tetra algorithm,
/// which is a "Direct" family member that never touches the shared octree.
#[derive(Debug, Default)]
pub struct SpatialHash {
    cell_size: f32,
    buckets: HashMap<Cell, Vec<(u32, Vec3)>>,
}

impl SpatialHash {
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            buckets: HashMap::new(),
        }
    }

    fn cell_of(&self, p: Vec3) -> Cell {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
            (p.z / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, id: u32, position: Vec3) {
        let cell = self.cell_of(position);
        self.buckets.entry(cell).or_default().push((id, position));
    }

    /// Every `(id, position)` whose cell overlaps `aabb`'s cell range.
    /// Conservative: may return ids slightly outside `aabb` near cell
    /// boundaries; callers run an exact predicate on the result.
    #[must_use]
    pub fn query_aabb(&self, aabb: Aabb3) -> Vec<(u32, Vec3)> {
        let min_cell = self.cell_of(aabb.min);
        let max_cell = self.cell_of(aabb.max);
        let mut out = Vec::new();
        for x in min_cell.0..=max_cell.0 {
            for y in min_cell.1..=max_cell.1 {
                for z in min_cell.2..=max_cell.2 {
                    if let Some(bucket) = self.buckets.get(&(x, y, z)) {
                        out.extend(bucket.iter().copied());
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_finds_inserted_point_within_its_cell() {
        let mut hash = SpatialHash::new(1.0);
        hash.insert(7, Vec3::new(0.2, 0.2, 0.2));
        let hits = hash.query_aabb(Aabb3::new(Vec3::ZERO, Vec3::splat(0.5)));
        assert!(hits.iter().any(|&(id, _)| id == 7));
    }

    #[test]
    fn query_outside_every_occupied_cell_is_empty() {
        let mut hash = SpatialHash::new(1.0);
        hash.insert(1, Vec3::ZERO);
        let hits = hash.query_aabb(Aabb3::new(Vec3::splat(100.0), Vec3::splat(101.0)));
        assert!(hits.is_empty());
    }
}
