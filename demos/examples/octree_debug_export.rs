// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walks a built octree into a caller-owned line buffer, the way an
//! external viewer would pull a debug overlay for one frame.
//!
//! Run:
//! - `cargo run -p proximity_demos --example octree_debug_export`

use std::sync::{Arc, RwLock};

use glam::Vec3;
use proximity_debug::{populate_octree_lines, DebugGeometry, OctreeDebugConfig};
use proximity_geometry::{Geometry, GeometryId, PointSet};
use proximity_index::{LooseOctree, OctreeConfig};

fn main() {
    tracing_subscriber::fmt::init();

    let points: Vec<Vec3> = (0..64)
        .map(|i| {
            let t = i as f32 / 64.0;
            Vec3::new(t * 4.0 - 2.0, (t * 7.3).sin(), (t * 5.1).cos())
        })
        .collect();

    let mut tree = LooseOctree::new(OctreeConfig {
        min_width: 0.25,
        ..Default::default()
    });
    tree.add_point_set(Arc::new(RwLock::new(Geometry::PointSet(PointSet::new(GeometryId::new(0), points)))));
    tree.build();

    let mut overlay = DebugGeometry::new();
    populate_octree_lines(&tree, OctreeDebugConfig::default(), &mut overlay);
    println!("full tree: {} line segments", overlay.lines.len());

    overlay.clear();
    populate_octree_lines(
        &tree,
        OctreeDebugConfig {
            max_level: 2,
            draw_non_empty_parent: true,
        },
        &mut overlay,
    );
    println!("top 3 levels, non-empty parents drawn: {} line segments", overlay.lines.len());
}
