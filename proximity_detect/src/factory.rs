//! Builds a [`CollisionDetector`] from an [`AlgorithmTag`] and a pair of
//! geometries, validating that the geometries are the kinds the tag
//! expects and, for the octree-routed tags, registering the pair with the
//! shared octree before the façade object itself is constructed.

use proximity_geometry::Geometry;
use proximity_index::SharedGeometry;

use crate::algorithm::AlgorithmTag;
use crate::error::DetectError;
use crate::facade::{
    AnalyticalTarget, BruteForceMeshDetector, CollisionDetector, OctreeRoutedDetector, PlaneSphereDetector,
    PointSetAnalyticalDetector, SphereCylinderDetector, SphereSphereDetector, TetraTetraDetector,
};
use crate::global::GlobalOctreeHandle;

fn kind_error(geom: &SharedGeometry) -> DetectError {
    DetectError::InvalidGeometries(geom.read().expect("geometry lock poisoned").id())
}

/// Builds the detector for `tag` over geometries `a`/`b`, exactly as the
/// caller names them except for `SphereToCylinder` (see below).
///
/// For `SurfaceMeshToSurfaceMeshCCD`, `SignedDistanceField` and `Custom`
/// this always returns [`DetectError::Unsupported`]: these tags are named
/// in the closed algorithm set but carry no kernel in this core.
pub fn make(
    tag: AlgorithmTag,
    a: SharedGeometry,
    b: SharedGeometry,
    octree: &GlobalOctreeHandle,
) -> Result<Box<dyn CollisionDetector>, DetectError> {
    match tag {
        AlgorithmTag::SurfaceMeshToSurfaceMeshCCD | AlgorithmTag::SignedDistanceField | AlgorithmTag::Custom => {
            Err(DetectError::Unsupported(tag))
        }

        AlgorithmTag::UnidirectionalPlaneToSphere | AlgorithmTag::BidirectionalPlaneToSphere => {
            let (plane, sphere) = (a, b);
            expect_kind(&plane, |g| matches!(g, Geometry::Plane(_)))?;
            expect_kind(&sphere, |g| matches!(g, Geometry::Sphere(_)))?;
            Ok(Box::new(PlaneSphereDetector {
                plane,
                sphere,
                bidirectional: tag == AlgorithmTag::BidirectionalPlaneToSphere,
            }))
        }

        AlgorithmTag::SphereToSphere => {
            expect_kind(&a, |g| matches!(g, Geometry::Sphere(_)))?;
            expect_kind(&b, |g| matches!(g, Geometry::Sphere(_)))?;
            Ok(Box::new(SphereSphereDetector { a, b }))
        }

        AlgorithmTag::SphereToCylinder => {
            // The factory's `collidingGeometryA` names the cylinder and
            // `collidingGeometryB` the sphere for this tag alone, opposite
            // of every other analytical-pair convention here.
            let (cylinder, sphere) = (a, b);
            expect_kind(&cylinder, |g| matches!(g, Geometry::Cylinder(_)))?;
            expect_kind(&sphere, |g| matches!(g, Geometry::Sphere(_)))?;
            Ok(Box::new(SphereCylinderDetector { sphere, cylinder }))
        }

        AlgorithmTag::PointSetToSphere
        | AlgorithmTag::PointSetToSpherePicking
        | AlgorithmTag::PointSetToPlane
        | AlgorithmTag::PointSetToCapsule => {
            let (points, target) = (a, b);
            expect_kind(&points, |g| matches!(g, Geometry::PointSet(_)))?;
            let kind = match tag {
                AlgorithmTag::PointSetToSphere => {
                    expect_kind(&target, |g| matches!(g, Geometry::Sphere(_)))?;
                    AnalyticalTarget::Sphere
                }
                AlgorithmTag::PointSetToSpherePicking => {
                    expect_kind(&target, |g| matches!(g, Geometry::Sphere(_)))?;
                    AnalyticalTarget::SpherePicking
                }
                AlgorithmTag::PointSetToPlane => {
                    expect_kind(&target, |g| matches!(g, Geometry::Plane(_)))?;
                    AnalyticalTarget::Plane
                }
                AlgorithmTag::PointSetToCapsule => {
                    expect_kind(&target, |g| matches!(g, Geometry::Capsule(_)))?;
                    AnalyticalTarget::Capsule
                }
                _ => unreachable!(),
            };
            Ok(Box::new(PointSetAnalyticalDetector { points, target, kind }))
        }

        AlgorithmTag::VolumeMeshToVolumeMesh => {
            expect_kind(&a, |g| matches!(g, Geometry::TetMesh(_)))?;
            expect_kind(&b, |g| matches!(g, Geometry::TetMesh(_)))?;
            Ok(Box::new(TetraTetraDetector {
                a,
                b,
                cell_size: default_tetra_cell_size(),
            }))
        }

        AlgorithmTag::MeshToMeshBruteForce => {
            expect_kind(&a, |g| matches!(g, Geometry::SurfaceMesh(_)))?;
            expect_kind(&b, |g| matches!(g, Geometry::SurfaceMesh(_)))?;
            Ok(Box::new(BruteForceMeshDetector { a, b }))
        }

        AlgorithmTag::PointSetToSurfaceMesh => {
            expect_kind(&a, |g| matches!(g, Geometry::PointSet(_)))?;
            expect_kind(&b, |g| matches!(g, Geometry::SurfaceMesh(_)))?;
            build_octree_routed(tag, a, b, octree)
        }

        AlgorithmTag::SurfaceMeshToSurfaceMesh => {
            expect_kind(&a, |g| matches!(g, Geometry::SurfaceMesh(_)))?;
            expect_kind(&b, |g| matches!(g, Geometry::SurfaceMesh(_)))?;
            build_octree_routed(tag, a, b, octree)
        }
    }
}

fn expect_kind(geom: &SharedGeometry, predicate: impl FnOnce(&Geometry) -> bool) -> Result<(), DetectError> {
    if predicate(&geom.read().expect("geometry lock poisoned")) {
        Ok(())
    } else {
        Err(kind_error(geom))
    }
}

/// The pair must be registered with the shared octree before the façade
/// object is constructed: the façade only ever reads back a buffer the
/// registration call already created.
fn build_octree_routed(
    tag: AlgorithmTag,
    a: SharedGeometry,
    b: SharedGeometry,
    octree: &GlobalOctreeHandle,
) -> Result<Box<dyn CollisionDetector>, DetectError> {
    let geom_a = a.read().expect("geometry lock poisoned").id();
    let geom_b = b.read().expect("geometry lock poisoned").id();
    let buffer = octree.register_pair(tag, a, b);
    Ok(Box::new(OctreeRoutedDetector {
        octree: octree.clone(),
        geom_a,
        geom_b,
        buffer,
    }))
}

/// Matches the tetra-tetra spatial hash's default cell size when the
/// caller has no scene-specific value to supply; a façade-level override
/// hook is not part of the closed algorithm set, so this is fixed.
const fn default_tetra_cell_size() -> f32 {
    1.0
}
