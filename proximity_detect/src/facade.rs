//! Concrete collision detectors behind one [`CollisionDetector`] trait: the
//! Direct family calls narrow-phase kernels straight from `detect_collision`
//! with no spatial index involved, while the Octree-routed family only
//! registers with the shared octree at construction and reads back whatever
//! buffer the last `update_internal_octree_and_detect_collision` filled.

use std::sync::Arc;

use proximity_data::CollisionData;
use proximity_geometry::{Geometry, GeometryId};
use proximity_index::SharedGeometry;
use proximity_narrowphase::kernels::{
    bidirectional_plane_to_sphere, point_to_capsule, point_to_plane, point_to_sphere, point_to_sphere_picking,
    sphere_to_cylinder, sphere_to_sphere, unidirectional_plane_to_sphere,
};

use crate::global::GlobalOctreeHandle;

/// Common surface every façade exposes: run (or, for octree-routed
/// detectors, read back) this step's narrow-phase results into a buffer
/// the caller owns.
pub trait CollisionDetector: Send + Sync {
    /// Evaluates this pair's collision state for the current geometry
    /// positions and returns the contacts found, replacing whatever the
    /// buffer held before.
    fn detect_collision(&self) -> Arc<CollisionData>;
}

fn read(geom: &SharedGeometry) -> std::sync::RwLockReadGuard<'_, Geometry> {
    geom.read().expect("geometry lock poisoned")
}

/// `UnidirectionalPlaneToSphere` / `BidirectionalPlaneToSphere`.
#[derive(Debug)]
pub struct PlaneSphereDetector {
    pub(crate) plane: SharedGeometry,
    pub(crate) sphere: SharedGeometry,
    pub(crate) bidirectional: bool,
}

impl CollisionDetector for PlaneSphereDetector {
    fn detect_collision(&self) -> Arc<CollisionData> {
        let data = Arc::new(CollisionData::new());
        let plane_guard = read(&self.plane);
        let sphere_guard = read(&self.sphere);
        if let (Geometry::Plane(plane), Geometry::Sphere(sphere)) = (&*plane_guard, &*sphere_guard) {
            if self.bidirectional {
                bidirectional_plane_to_sphere(plane, sphere, &data);
            } else {
                unidirectional_plane_to_sphere(plane, sphere, &data);
            }
        }
        data
    }
}

/// `SphereToSphere`.
#[derive(Debug)]
pub struct SphereSphereDetector {
    pub(crate) a: SharedGeometry,
    pub(crate) b: SharedGeometry,
}

impl CollisionDetector for SphereSphereDetector {
    fn detect_collision(&self) -> Arc<CollisionData> {
        let data = Arc::new(CollisionData::new());
        let guard_a = read(&self.a);
        let guard_b = read(&self.b);
        if let (Geometry::Sphere(a), Geometry::Sphere(b)) = (&*guard_a, &*guard_b) {
            sphere_to_sphere(a, b, &data);
        }
        data
    }
}

/// `SphereToCylinder`. `cylinder`/`sphere` here are already the factory's
/// de-quirked fields — see `factory::make`'s note on `collidingGeometryA`
/// meaning the cylinder for this one tag.
#[derive(Debug)]
pub struct SphereCylinderDetector {
    pub(crate) sphere: SharedGeometry,
    pub(crate) cylinder: SharedGeometry,
}

impl CollisionDetector for SphereCylinderDetector {
    fn detect_collision(&self) -> Arc<CollisionData> {
        let data = Arc::new(CollisionData::new());
        let sphere_guard = read(&self.sphere);
        let cyl_guard = read(&self.cylinder);
        if let (Geometry::Sphere(sphere), Geometry::Cylinder(cylinder)) = (&*sphere_guard, &*cyl_guard) {
            sphere_to_cylinder(sphere, cylinder, &data);
        }
        data
    }
}

/// Which single-kernel a point set is matched against for the four
/// point-set-vs-single-analytical-shape tags. Only the point set has more
/// than one primitive, so looping directly over its vertices costs the
/// same as routing through the octree — these stay in the Direct family.
#[derive(Debug)]
pub(crate) enum AnalyticalTarget {
    Sphere,
    SpherePicking,
    Plane,
    Capsule,
}

/// `PointSetToSphere` / `PointSetToSpherePicking` / `PointSetToPlane` /
/// `PointSetToCapsule`.
#[derive(Debug)]
pub struct PointSetAnalyticalDetector {
    pub(crate) points: SharedGeometry,
    pub(crate) target: SharedGeometry,
    pub(crate) kind: AnalyticalTarget,
}

impl CollisionDetector for PointSetAnalyticalDetector {
    fn detect_collision(&self) -> Arc<CollisionData> {
        let data = Arc::new(CollisionData::new());
        let points_guard = read(&self.points);
        let target_guard = read(&self.target);
        let Geometry::PointSet(points) = &*points_guard else {
            return data;
        };
        for (idx, &p) in points.points().iter().enumerate() {
            let idx = idx as u32;
            match (&self.kind, &*target_guard) {
                (AnalyticalTarget::Sphere, Geometry::Sphere(s)) => {
                    point_to_sphere(p, idx, s, &data);
                }
                (AnalyticalTarget::SpherePicking, Geometry::Sphere(s)) => {
                    point_to_sphere_picking(p, idx, s, &data);
                }
                (AnalyticalTarget::Plane, Geometry::Plane(pl)) => {
                    point_to_plane(p, idx, pl, &data);
                }
                (AnalyticalTarget::Capsule, Geometry::Capsule(c)) => {
                    point_to_capsule(p, idx, c, &data);
                }
                _ => {}
            }
        }
        data
    }
}

/// `VolumeMeshToVolumeMesh`: bypasses the shared octree entirely in favor
/// of a fresh spatial hash built each call, per the tetra-tetra contract.
#[derive(Debug)]
pub struct TetraTetraDetector {
    pub(crate) a: SharedGeometry,
    pub(crate) b: SharedGeometry,
    pub(crate) cell_size: f32,
}

impl CollisionDetector for TetraTetraDetector {
    fn detect_collision(&self) -> Arc<CollisionData> {
        let data = Arc::new(CollisionData::new());
        let guard_a = read(&self.a);
        let guard_b = read(&self.b);
        if let (Geometry::TetMesh(a), Geometry::TetMesh(b)) = (&*guard_a, &*guard_b) {
            proximity_broadphase::tetra_tetra::detect(a, b, self.cell_size, &data);
        }
        data
    }
}

/// `MeshToMeshBruteForce`: the explicitly-named O(n²) fallback, every
/// triangle of `a` against every triangle of `b`, no spatial index at all.
#[derive(Debug)]
pub struct BruteForceMeshDetector {
    pub(crate) a: SharedGeometry,
    pub(crate) b: SharedGeometry,
}

impl CollisionDetector for BruteForceMeshDetector {
    fn detect_collision(&self) -> Arc<CollisionData> {
        use proximity_narrowphase::kernels::triangle_to_triangle;
        let data = Arc::new(CollisionData::new());
        let guard_a = read(&self.a);
        let guard_b = read(&self.b);
        if let (Geometry::SurfaceMesh(a), Geometry::SurfaceMesh(b)) = (&*guard_a, &*guard_b) {
            for (i, &face_a) in a.triangles().iter().enumerate() {
                let verts_a = a.triangle_corners(i as u32);
                for (j, &face_b) in b.triangles().iter().enumerate() {
                    let verts_b = b.triangle_corners(j as u32);
                    triangle_to_triangle(face_a, verts_a, j as u32, face_b, verts_b, &data);
                }
            }
        }
        data
    }
}

/// `PointSetToSurfaceMesh` / `SurfaceMeshToSurfaceMesh`: the pair is driven
/// by the shared octree's per-step `drive` pass; this façade only reads
/// back the buffer the global handle already filled for it.
#[derive(Debug)]
pub struct OctreeRoutedDetector {
    pub(crate) octree: GlobalOctreeHandle,
    pub(crate) geom_a: GeometryId,
    pub(crate) geom_b: GeometryId,
    pub(crate) buffer: Arc<CollisionData>,
}

impl CollisionDetector for OctreeRoutedDetector {
    fn detect_collision(&self) -> Arc<CollisionData> {
        debug_assert!(
            self.octree.has_geometry(self.geom_a) && self.octree.has_geometry(self.geom_b),
            "geometry removed from the shared octree after an octree-routed façade was built"
        );
        self.buffer.clone()
    }
}
