// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform geometry contract for the proximity collision detection core.
//!
//! Every geometry the core indexes — point sets, triangle-indexed surface
//! meshes, tetrahedral volume meshes, and the analytical shapes (plane,
//! sphere, capsule, cylinder, oriented box) — is wrapped in the [`Geometry`]
//! enum and accessed through the [`GeometryAccess`] trait. A world transform
//! is expected to already be applied by the caller between simulation steps;
//! this crate only ever reads post-transform positions and keeps no motion
//! history.
//!
//! Each geometry carries a [`GeometryId`] that is stable for the geometry's
//! lifetime and is the key used for collision-pair registration elsewhere in
//! the workspace.

pub mod aabb;
pub mod shapes;

pub use aabb::Aabb3;
pub use shapes::{Capsule, Cylinder, OrientedBox, Plane, PointSet, Sphere, SurfaceMesh, TetMesh};

use glam::Vec3;

/// Half-extent of the finite stand-in box used for the unbounded
/// analytical shapes (plane, infinite cylinder). Comfortably larger than
/// the shared octree's default ~100-unit root width so the straddle test
/// at every depth keeps these primitives anchored near the root, without
/// the NaN center a literal +inf/-inf box would produce.
const UNBOUNDED_HALF_EXTENT: f32 = 1.0e6;

/// Stable, process-wide identifier for a registered geometry instance.
///
/// Unlike the generational handles used in the spatial index, a
/// `GeometryId` is never recycled within a process run: "the global index
/// uniquely identifies a geometry instance for its lifetime" holds even
/// across a remove/re-add of a different geometry.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct GeometryId(pub u32);

impl GeometryId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Which of the octree's three primitive lists a geometry's cells belong to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PrimitiveKind {
    Point,
    Triangle,
    Analytical,
}

/// A geometry, polymorphic over the kinds the core supports.
///
/// This tagged variant replaces the virtual-dispatch geometry hierarchy of
/// the system this core was modeled on; narrow-phase kernels match on it
/// directly rather than going through dynamic dispatch, per the small
/// dispatch table called for in the design notes.
#[derive(Clone, Debug)]
pub enum Geometry {
    PointSet(PointSet),
    SurfaceMesh(SurfaceMesh),
    TetMesh(TetMesh),
    Plane(Plane),
    Sphere(Sphere),
    Capsule(Capsule),
    Cylinder(Cylinder),
    OrientedBox(OrientedBox),
}

impl Geometry {
    #[must_use]
    pub fn id(&self) -> GeometryId {
        match self {
            Self::PointSet(g) => g.id(),
            Self::SurfaceMesh(g) => g.id(),
            Self::TetMesh(g) => g.id(),
            Self::Plane(g) => g.id(),
            Self::Sphere(g) => g.id(),
            Self::Capsule(g) => g.id(),
            Self::Cylinder(g) => g.id(),
            Self::OrientedBox(g) => g.id(),
        }
    }

    /// Which per-type primitive list this geometry's cells are indexed
    /// under in the octree.
    #[must_use]
    pub fn primitive_kind(&self) -> PrimitiveKind {
        match self {
            Self::PointSet(_) => PrimitiveKind::Point,
            Self::SurfaceMesh(_) | Self::TetMesh(_) => PrimitiveKind::Triangle,
            Self::Plane(_) | Self::Sphere(_) | Self::Capsule(_) | Self::Cylinder(_)
            | Self::OrientedBox(_) => PrimitiveKind::Analytical,
        }
    }

    /// Number of indexable cells: points for a point set, triangles for a
    /// surface mesh, tetrahedra for a tet mesh, and exactly one for any
    /// analytical shape (the whole shape is one cell).
    #[must_use]
    pub fn cell_count(&self) -> u32 {
        match self {
            Self::PointSet(g) => g.points().len() as u32,
            Self::SurfaceMesh(g) => g.triangles().len() as u32,
            Self::TetMesh(g) => g.tets().len() as u32,
            Self::Plane(_)
            | Self::Sphere(_)
            | Self::Capsule(_)
            | Self::Cylinder(_)
            | Self::OrientedBox(_) => 1,
        }
    }

    /// Tight AABB of a single cell, in world space.
    ///
    /// Panics if `local_idx` is out of range for the geometry's cell count;
    /// callers always derive `local_idx` from [`Geometry::cell_count`].
    #[must_use]
    pub fn cell_aabb(&self, local_idx: u32) -> Aabb3 {
        match self {
            Self::PointSet(g) => Aabb3::from_point(g.points()[local_idx as usize]),
            Self::SurfaceMesh(g) => Aabb3::from_points(g.triangle_corners(local_idx)),
            Self::TetMesh(g) => Aabb3::from_points(g.tet_corners(local_idx)),
            Self::Plane(g) => {
                // Planes are unbounded. `Aabb3::EMPTY`'s +inf/-inf corners
                // would give a NaN center and silently defeat the straddle
                // test (NaN comparisons are always false), so instead we
                // use a large but finite box around the plane's own point —
                // large enough to straddle any node the octree will ever
                // build, keeping the primitive anchored near the root.
                Aabb3::new(g.center - Vec3::splat(UNBOUNDED_HALF_EXTENT), g.center + Vec3::splat(UNBOUNDED_HALF_EXTENT))
            }
            Self::Sphere(g) => Aabb3::new(g.center - Vec3::splat(g.radius), g.center + Vec3::splat(g.radius)),
            Self::Capsule(g) => {
                let r = Vec3::splat(g.radius);
                Aabb3::from_points([g.segment_a, g.segment_b]).union(&Aabb3::new(
                    g.segment_a.min(g.segment_b) - r,
                    g.segment_a.max(g.segment_b) + r,
                ))
            }
            Self::Cylinder(g) => Aabb3::new(
                g.axis_point - Vec3::splat(UNBOUNDED_HALF_EXTENT),
                g.axis_point + Vec3::splat(UNBOUNDED_HALF_EXTENT),
            ),
            Self::OrientedBox(g) => {
                let corners: Vec<Vec3> = (0_u8..8)
                    .map(|mask| {
                        let sign = Vec3::new(
                            if mask & 1 == 0 { -1.0 } else { 1.0 },
                            if mask & 2 == 0 { -1.0 } else { 1.0 },
                            if mask & 4 == 0 { -1.0 } else { 1.0 },
                        );
                        g.center + g.rotation * (g.half_extents * sign)
                    })
                    .collect();
                Aabb3::from_points(corners)
            }
        }
    }

    /// Tight AABB of the whole geometry.
    #[must_use]
    pub fn aabb(&self) -> Aabb3 {
        (0..self.cell_count()).fold(Aabb3::EMPTY, |acc, i| acc.union(&self.cell_aabb(i)))
    }

    /// World-space position of a point-primitive cell.
    ///
    /// Returns `None` for geometries that are not point sets.
    #[must_use]
    pub fn point_position(&self, local_idx: u32) -> Option<Vec3> {
        match self {
            Self::PointSet(g) => g.points().get(local_idx as usize).copied(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_cell_aabb_is_centered_box() {
        let s = Sphere::new(GeometryId::new(0), Vec3::ZERO, 2.0);
        let g = Geometry::Sphere(s);
        let bb = g.cell_aabb(0);
        assert_eq!(bb.min, Vec3::splat(-2.0));
        assert_eq!(bb.max, Vec3::splat(2.0));
    }

    #[test]
    fn point_set_reports_one_cell_per_point() {
        let g = Geometry::PointSet(PointSet::new(
            GeometryId::new(1),
            vec![Vec3::ZERO, Vec3::ONE, Vec3::X],
        ));
        assert_eq!(g.cell_count(), 3);
        assert_eq!(g.primitive_kind(), PrimitiveKind::Point);
        assert_eq!(g.point_position(1), Some(Vec3::ONE));
    }

    #[test]
    fn surface_mesh_triangle_aabb_covers_its_corners() {
        let g = Geometry::SurfaceMesh(SurfaceMesh::new(
            GeometryId::new(2),
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![[0, 1, 2]],
        ));
        let bb = g.cell_aabb(0);
        assert!(bb.contains_point(Vec3::ZERO));
        assert!(bb.contains_point(Vec3::X));
        assert!(bb.contains_point(Vec3::Y));
    }
}
