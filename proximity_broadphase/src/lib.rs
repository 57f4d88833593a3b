// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The broad-phase driver: walks a [`LooseOctree`] for each active
//! primitive to enumerate candidate pairs, filtered by a caller-supplied
//! [`PairDispatcher`], and hands matches off to the narrow phase. Also
//! carries the tetra-tetra spatial hash, the one algorithm that bypasses
//! the octree entirely in favor of its own per-call grid (see
//! [`tetra_tetra`]).
//!
//! This crate never calls into `proximity_narrowphase` or
//! `proximity_detect` itself for octree-routed pairs — dispatch is a trait
//! object the façade crate implements, generalizing what could otherwise
//! be a free-function `match` over pair kinds into a small dispatch table
//! owned by the caller.

pub mod spatial_hash;
pub mod tetra_tetra;

use proximity_geometry::{Aabb3, GeometryId, PrimitiveKind};
use proximity_index::{LooseOctree, NodeId, PrimitiveCache, PrimitiveDescriptor};
use rayon::prelude::*;

/// What the broad-phase driver needs from whoever owns collision-pair
/// registration and narrow-phase dispatch — implemented by
/// `proximity_detect::DetectDispatcher`.
pub trait PairDispatcher: Sync {
    /// Whether `(a, b)` (in either order) has a registered algorithm.
    fn is_registered(&self, a: GeometryId, b: GeometryId) -> bool;

    /// Runs the narrow-phase kernel registered for this pair against the
    /// two candidate primitives. Implementations resolve argument order
    /// (which descriptor plays geometry A vs B of the registered pair)
    /// themselves from the registration, not from the order the driver
    /// happens to pass them in.
    fn dispatch(&self, a: &PrimitiveDescriptor, b: &PrimitiveDescriptor);

    /// Called once after a full driver pass completes. Implementations
    /// consult the per-pair invalid point-mesh map and discard any
    /// previously recorded vertex-triangle contact whose point has since
    /// been shown to lie outside the referenced mesh.
    fn finalize_point_mesh_validity(&self) {}
}

/// Enumerates candidate pairs for every primitive currently held in
/// `octree` and dispatches matches through `dispatcher`, then runs the
/// post-dispatch point-mesh validity cleanup.
///
/// Point-driven and non-point-driven enumeration run as independent
/// `rayon` parallel-for passes over disjoint primitive-id lists, matching
/// "parallel threads over primitive vectors" from the concurrency model;
/// collision elements from one step are therefore unordered across
/// threads by design.
pub fn drive(octree: &LooseOctree, dispatcher: &(impl PairDispatcher + ?Sized)) {
    let points = octree.primitive_ids_of_kind(PrimitiveKind::Point);
    points.par_iter().for_each(|&id| {
        if let Some(p) = octree.primitive(id) {
            drive_point(octree, dispatcher, &p);
        }
    });

    for kind in [PrimitiveKind::Triangle, PrimitiveKind::Analytical] {
        let ids = octree.primitive_ids_of_kind(kind);
        ids.par_iter().for_each(|&id| {
            if let Some(p) = octree.primitive(id) {
                drive_non_point(octree, dispatcher, &p);
            }
        });
    }

    dispatcher.finalize_point_mesh_validity();
}

/// "Point p vs node subtree": at each node that loosely contains `p`,
/// only the non-point lists are checked against registered pairs — a
/// point's own per-type list is never consulted here.
fn drive_point(octree: &LooseOctree, dispatcher: &(impl PairDispatcher + ?Sized), p: &PrimitiveDescriptor) {
    let PrimitiveCache::Point(pos) = p.cache else {
        return;
    };
    let mut visit = |node: NodeId| {
        for kind in [PrimitiveKind::Triangle, PrimitiveKind::Analytical] {
            for q_id in octree.node_list(node, kind) {
                let Some(q) = octree.primitive(q_id) else { continue };
                if dispatcher.is_registered(p.geometry_id, q.geometry_id) {
                    dispatcher.dispatch(p, &q);
                }
            }
        }
    };
    octree.candidates_for_point(pos, &mut visit);
}

/// "Non-point p vs node subtree": every per-type list at each overlapping
/// node is checked, with an AABB test against the resident before
/// dispatch (points degrade to a zero-size AABB for this test).
fn drive_non_point(octree: &LooseOctree, dispatcher: &(impl PairDispatcher + ?Sized), p: &PrimitiveDescriptor) {
    let PrimitiveCache::Bounds(aabb) = p.cache else {
        return;
    };
    let mut visit = |node: NodeId| {
        for kind in [PrimitiveKind::Point, PrimitiveKind::Triangle, PrimitiveKind::Analytical] {
            for q_id in octree.node_list(node, kind) {
                let Some(q) = octree.primitive(q_id) else { continue };
                if !dispatcher.is_registered(p.geometry_id, q.geometry_id) {
                    continue;
                }
                let q_aabb = match q.cache {
                    PrimitiveCache::Bounds(b) => b,
                    PrimitiveCache::Point(pt) => Aabb3::from_point(pt),
                };
                if aabb.overlaps(&q_aabb) {
                    dispatcher.dispatch(p, &q);
                }
            }
        }
    };
    octree.candidates_for_aabb(aabb, &mut visit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proximity_geometry::{Geometry, PointSet, SurfaceMesh};
    use proximity_index::OctreeConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, RwLock};

    struct CountingDispatcher {
        seen_pairs: AtomicUsize,
    }

    impl PairDispatcher for CountingDispatcher {
        fn is_registered(&self, a: GeometryId, b: GeometryId) -> bool {
            // Any (point-set, surface-mesh) pair counts, in either order.
            (a.raw() == 0 && b.raw() == 1) || (a.raw() == 1 && b.raw() == 0)
        }

        fn dispatch(&self, _a: &PrimitiveDescriptor, _b: &PrimitiveDescriptor) {
            self.seen_pairs.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn point_inside_triangle_aabb_is_dispatched() {
        let mut tree = LooseOctree::new(OctreeConfig {
            min_width: 0.1,
            ..Default::default()
        });
        let points = Arc::new(RwLock::new(Geometry::PointSet(PointSet::new(
            GeometryId::new(0),
            vec![glam::Vec3::new(0.1, 0.1, 0.0)],
        ))));
        let mesh = Arc::new(RwLock::new(Geometry::SurfaceMesh(SurfaceMesh::new(
            GeometryId::new(1),
            vec![glam::Vec3::ZERO, glam::Vec3::X, glam::Vec3::Y],
            vec![[0, 1, 2]],
        ))));
        tree.add_point_set(points);
        tree.add_triangle_mesh(mesh);
        tree.build();

        let dispatcher = CountingDispatcher {
            seen_pairs: AtomicUsize::new(0),
        };
        drive(&tree, &dispatcher);
        assert!(dispatcher.seen_pairs.load(Ordering::Relaxed) >= 1);
    }

    #[test]
    fn unregistered_pair_never_dispatches() {
        let mut tree = LooseOctree::new(OctreeConfig {
            min_width: 0.1,
            ..Default::default()
        });
        let points = Arc::new(RwLock::new(Geometry::PointSet(PointSet::new(
            GeometryId::new(7),
            vec![glam::Vec3::ZERO],
        ))));
        let mesh = Arc::new(RwLock::new(Geometry::SurfaceMesh(SurfaceMesh::new(
            GeometryId::new(8),
            vec![glam::Vec3::ZERO, glam::Vec3::X, glam::Vec3::Y],
            vec![[0, 1, 2]],
        ))));
        tree.add_point_set(points);
        tree.add_triangle_mesh(mesh);
        tree.build();

        let dispatcher = CountingDispatcher {
            seen_pairs: AtomicUsize::new(0),
        };
        drive(&tree, &dispatcher);
        assert_eq!(dispatcher.seen_pairs.load(Ordering::Relaxed), 0);
    }

    fn unit_box_mesh(id: u32) -> SurfaceMesh {
        use glam::Vec3;
        let v = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            [0, 1, 2],
            [0, 2, 3],
            [4, 6, 5],
            [4, 7, 6],
            [0, 4, 5],
            [0, 5, 1],
            [1, 5, 6],
            [1, 6, 2],
            [2, 6, 7],
            [2, 7, 3],
            [3, 7, 4],
            [3, 4, 0],
        ];
        SurfaceMesh::new(GeometryId::new(id), v.to_vec(), faces)
    }

    fn piercing_soup_mesh(id: u32) -> SurfaceMesh {
        use glam::Vec3;
        // A handful of triangles chosen to straddle the box's faces and
        // edges unevenly, standing in for an unstructured triangle soup.
        let v = vec![
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(0.5, 1.5, 0.5),
            Vec3::new(1.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 1.5),
            Vec3::new(2.0, 2.0, 2.0),
            Vec3::new(3.0, 2.0, 2.0),
            Vec3::new(2.0, 3.0, 2.0),
        ];
        let faces = vec![[0, 1, 2], [0, 3, 4], [1, 4, 5], [6, 7, 8]];
        SurfaceMesh::new(GeometryId::new(id), v, faces)
    }

    struct TriangleTriangleDispatcher<'a> {
        soup_id: GeometryId,
        box_id: GeometryId,
        soup: &'a SurfaceMesh,
        box_mesh: &'a SurfaceMesh,
        out: &'a proximity_data::CollisionData,
    }

    impl PairDispatcher for TriangleTriangleDispatcher<'_> {
        fn is_registered(&self, a: GeometryId, b: GeometryId) -> bool {
            (a == self.soup_id && b == self.box_id) || (a == self.box_id && b == self.soup_id)
        }

        fn dispatch(&self, a: &PrimitiveDescriptor, b: &PrimitiveDescriptor) {
            use proximity_narrowphase::kernels::triangle_to_triangle;
            if a.kind != PrimitiveKind::Triangle || b.kind != PrimitiveKind::Triangle {
                return;
            }
            let (soup_desc, box_desc) = if a.geometry_id == self.soup_id { (a, b) } else { (b, a) };
            let (Some(&fa), Some(&fb)) = (
                self.soup.triangles().get(soup_desc.local_index as usize),
                self.box_mesh.triangles().get(box_desc.local_index as usize),
            ) else {
                return;
            };
            let va = self.soup.triangle_corners(soup_desc.local_index);
            let vb = self.box_mesh.triangle_corners(box_desc.local_index);
            triangle_to_triangle(fa, va, box_desc.local_index, fb, vb, self.out);
        }
    }

    /// Scenario 5: brute-force triangle-triangle comparison over every pair
    /// must match what the octree-routed broad phase finds, compared as
    /// unordered vertex-index tuples so traversal order cannot matter.
    #[test]
    fn brute_force_matches_octree_routed_triangle_triangle() {
        use proximity_narrowphase::kernels::triangle_to_triangle;
        use std::collections::HashSet;

        let soup = piercing_soup_mesh(0);
        let box_mesh = unit_box_mesh(1);

        let brute = proximity_data::CollisionData::new();
        for (i, &fa) in soup.triangles().iter().enumerate() {
            let va = soup.triangle_corners(i as u32);
            for (j, &fb) in box_mesh.triangles().iter().enumerate() {
                let vb = box_mesh.triangle_corners(j as u32);
                triangle_to_triangle(fa, va, j as u32, fb, vb, &brute);
            }
        }

        let mut tree = LooseOctree::new(OctreeConfig {
            min_width: 0.05,
            ..Default::default()
        });
        let soup_id = soup.id();
        let box_id = box_mesh.id();
        tree.add_triangle_mesh(Arc::new(RwLock::new(Geometry::SurfaceMesh(soup.clone()))));
        tree.add_triangle_mesh(Arc::new(RwLock::new(Geometry::SurfaceMesh(box_mesh.clone()))));
        tree.build();

        let routed = proximity_data::CollisionData::new();
        let dispatcher = TriangleTriangleDispatcher {
            soup_id,
            box_id,
            soup: &soup,
            box_mesh: &box_mesh,
            out: &routed,
        };
        drive(&tree, &dispatcher);

        let vt_set = |data: &proximity_data::CollisionData| -> HashSet<(u32, u32)> {
            data.vt_all().iter().map(|e| (e.vertex_idx, e.triangle_idx)).collect()
        };
        let ee_set = |data: &proximity_data::CollisionData| -> HashSet<(u32, u32, u32, u32)> {
            data.ee_all()
                .iter()
                .map(|e| (e.edge_a.0, e.edge_a.1, e.edge_b.0, e.edge_b.1))
                .collect()
        };

        assert_eq!(vt_set(&brute), vt_set(&routed));
        assert_eq!(ee_set(&brute), ee_set(&routed));
    }
}
