//! Tetra-vs-tetra detection: both tet meshes' vertices go into one
//! [`SpatialHash`], then each tet of each mesh queries the hash by its AABB
//! and barycentric-tests the candidates. Mesh B's vertex ids are offset by
//! `|V_A|` in the hash's id space so the owning side can be recovered from
//! a bare vertex id on the way back out.

use glam::Vec3;
use proximity_data::CollisionData;
use proximity_geometry::{Aabb3, TetMesh};
use proximity_narrowphase::kernels::point_to_tetrahedron;

use crate::spatial_hash::SpatialHash;

/// Runs both directions of point-in-tetrahedron testing (`a`'s vertices
/// against `b`'s tets, and `b`'s vertices against `a`'s tets) and appends
/// every containment found to `out`. `mesh_a` and `mesh_b` may be the same
/// mesh (self-collision): a vertex is never tested against a tet it is
/// itself a corner of, so an unmoved self-test reports zero elements.
pub fn detect(mesh_a: &TetMesh, mesh_b: &TetMesh, cell_size: f32, out: &CollisionData) {
    let a_vertex_count = mesh_a.vertices().len() as u32;

    let mut hash = SpatialHash::new(cell_size);
    for (i, &v) in mesh_a.vertices().iter().enumerate() {
        hash.insert(i as u32, v);
    }
    for (i, &v) in mesh_b.vertices().iter().enumerate() {
        hash.insert(a_vertex_count + i as u32, v);
    }

    test_tets_against_hash(mesh_a, false, &hash, a_vertex_count, out);
    test_tets_against_hash(mesh_b, true, &hash, a_vertex_count, out);
}

fn test_tets_against_hash(
    tet_mesh: &TetMesh,
    tet_owner_is_b: bool,
    hash: &SpatialHash,
    a_vertex_count: u32,
    out: &CollisionData,
) {
    for (tet_id, &tet) in tet_mesh.tets().iter().enumerate() {
        let corners = tet_mesh.tet_corners(tet_id as u32);
        let aabb = Aabb3::from_points(corners);
        for (global_vertex_id, position) in hash.query_aabb(aabb) {
            let vertex_owner_is_b = global_vertex_id >= a_vertex_count;
            let local_vertex_id = if vertex_owner_is_b {
                global_vertex_id - a_vertex_count
            } else {
                global_vertex_id
            };
            // A vertex is trivially "contained" in a tet it is itself a
            // corner of; that is not a collision, only a tautology.
            if vertex_owner_is_b == tet_owner_is_b && tet.contains(&local_vertex_id) {
                continue;
            }
            point_to_tetrahedron(
                position,
                local_vertex_id,
                tet_id as u32,
                corners,
                vertex_owner_is_b,
                tet_owner_is_b,
                out,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proximity_geometry::GeometryId;

    fn unit_tet(id: u32, offset: Vec3) -> TetMesh {
        TetMesh::new(
            GeometryId::new(id),
            vec![
                Vec3::ZERO + offset,
                Vec3::X + offset,
                Vec3::Y + offset,
                Vec3::Z + offset,
            ],
            vec![[0, 1, 2, 3]],
        )
    }

    #[test]
    fn far_translation_of_unit_tets_has_no_overlap() {
        let a = unit_tet(0, Vec3::ZERO);
        let b = unit_tet(1, Vec3::new(0.0, 1.0, 2.5));
        let data = CollisionData::new();
        detect(&a, &b, 1.0, &data);
        assert_eq!(data.pt_size(), 0, "far translation has no overlap");
    }

    #[test]
    fn overlapping_vertex_is_reported_from_both_sides() {
        // Shift B only slightly so one of its vertices lands inside A.
        let a = unit_tet(0, Vec3::ZERO);
        let b = unit_tet(1, Vec3::new(0.05, 0.05, 0.05));
        let data = CollisionData::new();
        detect(&a, &b, 1.0, &data);
        assert!(data.pt_size() >= 1);
        let weights_sum_ok = (0..data.pt_size()).all(|i| (data.pt_get(i).weights.iter().sum::<f32>() - 1.0).abs() < 1e-4);
        assert!(weights_sum_ok);
    }

    #[test]
    fn self_test_on_identical_mesh_reports_no_self_containment() {
        let a = unit_tet(0, Vec3::ZERO);
        let data = CollisionData::new();
        detect(&a, &a, 1.0, &data);
        assert_eq!(data.pt_size(), 0);
    }
}
