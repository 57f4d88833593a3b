//! The `proximity_broadphase::PairDispatcher` implementation that connects
//! the broad-phase driver's candidate enumeration to the narrow-phase
//! kernels, for the two octree-routed algorithm tags.

use hashbrown::HashMap;
use proximity_broadphase::PairDispatcher;
use proximity_geometry::{Geometry, GeometryId, PrimitiveKind};
use proximity_index::PrimitiveDescriptor;
use proximity_narrowphase::kernels::{point_to_triangle, triangle_to_triangle, PointTriangleOutcome};

use crate::algorithm::AlgorithmTag;
use crate::pair::{normalize, PairRegistration};
use crate::sharded_map::{point_mesh_key, ShardedMap};

/// Borrows the registration table and the point-mesh validity map for the
/// duration of one `proximity_broadphase::drive` call.
pub(crate) struct Dispatch<'a> {
    pub registrations: &'a HashMap<(GeometryId, GeometryId), PairRegistration>,
    pub invalid_map: &'a ShardedMap,
}

impl PairDispatcher for Dispatch<'_> {
    fn is_registered(&self, a: GeometryId, b: GeometryId) -> bool {
        self.registrations.contains_key(&normalize(a, b))
    }

    fn dispatch(&self, a: &PrimitiveDescriptor, b: &PrimitiveDescriptor) {
        let Some(reg) = self.registrations.get(&normalize(a.geometry_id, b.geometry_id)) else {
            return;
        };
        match (a.kind, b.kind) {
            (PrimitiveKind::Point, PrimitiveKind::Triangle) => self.point_vs_triangle(a, b, reg),
            (PrimitiveKind::Triangle, PrimitiveKind::Point) => self.point_vs_triangle(b, a, reg),
            (PrimitiveKind::Triangle, PrimitiveKind::Triangle) => self.triangle_vs_triangle(a, b, reg),
            _ => {}
        }
    }

    fn finalize_point_mesh_validity(&self) {
        for reg in self.registrations.values() {
            if reg.tag != AlgorithmTag::PointSetToSurfaceMesh {
                continue;
            }
            let Some(point_side) = reg.point_side() else { continue };
            let mesh_side = if point_side == reg.a { reg.b } else { reg.a };
            let mut kept: Vec<_> = reg
                .buffer
                .vt_all()
                .into_iter()
                .filter(|el| !self.invalid_map.is_outside(point_mesh_key(el.vertex_idx, point_side.raw()), mesh_side.raw()))
                .collect();
            // At most one VertexTriangle survives per (vertex, mesh): sort by
            // vertex id then by closest distance and keep the nearest.
            kept.sort_by_key(|el| (el.vertex_idx, proximity_data::ordered_bits(el.closest_distance)));
            kept.dedup_by_key(|el| el.vertex_idx);
            reg.buffer.vt_replace_all(kept);
        }
    }
}

impl Dispatch<'_> {
    fn point_vs_triangle(&self, point_desc: &PrimitiveDescriptor, tri_desc: &PrimitiveDescriptor, reg: &PairRegistration) {
        let point_geom = reg.geometry_for(point_desc.geometry_id);
        let tri_geom = reg.geometry_for(tri_desc.geometry_id);
        let point_guard = point_geom.read().expect("geometry lock poisoned");
        let tri_guard = tri_geom.read().expect("geometry lock poisoned");
        let (Geometry::PointSet(points), Geometry::SurfaceMesh(mesh)) = (&*point_guard, &*tri_guard) else {
            return;
        };
        let Some(&position) = points.points().get(point_desc.local_index as usize) else {
            return;
        };
        if tri_desc.local_index as usize >= mesh.triangles().len() {
            return;
        }
        let corners = mesh.triangle_corners(tri_desc.local_index);
        let outcome = point_to_triangle(position, point_desc.local_index, tri_desc.local_index, corners, &reg.buffer);
        if outcome == PointTriangleOutcome::Outside {
            self.invalid_map.mark_outside(
                point_mesh_key(point_desc.local_index, point_desc.geometry_id.raw()),
                tri_desc.geometry_id.raw(),
            );
        }
    }

    fn triangle_vs_triangle(&self, a: &PrimitiveDescriptor, b: &PrimitiveDescriptor, reg: &PairRegistration) {
        let geom_a = reg.geometry_for(a.geometry_id);
        let geom_b = reg.geometry_for(b.geometry_id);
        let guard_a = geom_a.read().expect("geometry lock poisoned");
        let guard_b = geom_b.read().expect("geometry lock poisoned");
        let (Geometry::SurfaceMesh(mesh_a), Geometry::SurfaceMesh(mesh_b)) = (&*guard_a, &*guard_b) else {
            return;
        };
        let (Some(&face_a), Some(&face_b)) = (
            mesh_a.triangles().get(a.local_index as usize),
            mesh_b.triangles().get(b.local_index as usize),
        ) else {
            return;
        };
        let verts_a = mesh_a.triangle_corners(a.local_index);
        let verts_b = mesh_b.triangle_corners(b.local_index);
        triangle_to_triangle(face_a, verts_a, b.local_index, face_b, verts_b, &reg.buffer);
    }
}
