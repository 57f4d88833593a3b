// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Octree-routed point-set vs surface-mesh detection, driven through the
//! public façade exactly the way a solver would: configure once, then call
//! the global per-step entry point before reading the buffer back.
//!
//! Run:
//! - `cargo run -p proximity_demos --example point_cloud_vs_mesh`

use std::sync::{Arc, RwLock};

use glam::Vec3;
use proximity_detect::{make_detector, AlgorithmTag, GlobalOctreeHandle};
use proximity_geometry::{Geometry, GeometryId, PointSet, SurfaceMesh};

fn unit_box_mesh(id: u32) -> SurfaceMesh {
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
    // Wound so every face normal, (B-A)x(C-A), points outward.
    let faces = vec![
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
    SurfaceMesh::new(GeometryId::new(id), v.to_vec(), faces)
}

fn main() {
    tracing_subscriber::fmt::init();

    let cloud = vec![
        Vec3::new(0.5, 0.5, 0.5),
        Vec3::new(0.2, 0.8, 0.1),
        Vec3::new(2.0, 2.0, 2.0), // outside the box
    ];
    let points = Arc::new(RwLock::new(Geometry::PointSet(PointSet::new(GeometryId::new(0), cloud))));
    let mesh = Arc::new(RwLock::new(Geometry::SurfaceMesh(unit_box_mesh(1))));

    let octree = GlobalOctreeHandle::get();
    let detector = make_detector(AlgorithmTag::PointSetToSurfaceMesh, points, mesh, &octree)
        .expect("point-set vs surface-mesh is always available");

    // The solver calls this once per simulation step; every octree-routed
    // façade's buffer is refilled by the same call.
    octree.update_internal_octree_and_detect_collision();

    let contacts = detector.detect_collision();
    println!("vertex-triangle contacts this step: {}", contacts.vt_size());
    for i in 0..contacts.vt_size() {
        let el = contacts.vt_get(i);
        println!(
            "  point {} inside triangle {} (closest distance {:.4})",
            el.vertex_idx, el.triangle_idx, el.closest_distance
        );
    }
}
