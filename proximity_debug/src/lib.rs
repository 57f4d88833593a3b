// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pull-style debug export for the loose octree and the collision-data
//! buffer.
//!
//! Per the design notes' "expose as a pull API that writes into
//! caller-provided line/triangle buffers rather than owning VTK-style
//! objects", this crate owns no rendering state of its own: callers hold a
//! [`DebugGeometry`] (a plain pair of `Vec`s) and pass it to
//! [`populate_octree_lines`] / [`populate_collision_overlay`], which append
//! to it. Nothing here renders or persists anything; a viewer external to
//! this core reads the buffer back.

use glam::Vec3;
use proximity_data::CollisionData;
use proximity_data::CollisionElement;
use proximity_index::{LooseOctree, NodeId};

/// A caller-owned line/triangle overlay buffer. Cleared and refilled each
/// time the caller wants a fresh debug snapshot; nothing here retains a
/// reference to the octree or collision data once a populate call returns.
#[derive(Clone, Debug, Default)]
pub struct DebugGeometry {
    pub lines: Vec<(Vec3, Vec3)>,
    pub triangles: Vec<[Vec3; 3]>,
}

impl DebugGeometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.triangles.clear();
    }
}

/// Pruning controls for the octree line export, matching the two knobs
/// named in the external interfaces section: `maxLevelDebugRender` and
/// `drawNonEmptyParent`.
#[derive(Clone, Copy, Debug)]
pub struct OctreeDebugConfig {
    /// Nodes deeper than this are not drawn. `0` draws only the root.
    pub max_level: u32,
    /// When set, an internal node is drawn too if it still holds any
    /// primitives directly (as opposed to only its descendants) — this is
    /// the only way a straddling primitive's containing node becomes
    /// visible, since such a node is never a leaf.
    pub draw_non_empty_parent: bool,
}

impl Default for OctreeDebugConfig {
    fn default() -> Self {
        Self {
            max_level: u32::MAX,
            draw_non_empty_parent: false,
        }
    }
}

/// Appends 12 line segments per drawn node — the edges of its tight AABB —
/// to `out`, walking `octree` from the root and pruning by `config`.
pub fn populate_octree_lines(octree: &LooseOctree, config: OctreeDebugConfig, out: &mut DebugGeometry) {
    visit(octree, octree.root(), config, out);
}

fn visit(octree: &LooseOctree, node: NodeId, config: OctreeDebugConfig, out: &mut DebugGeometry) {
    let Some(depth) = octree.node_depth(node) else {
        return;
    };
    if depth > config.max_level {
        return;
    }
    let children = octree.node_children(node);
    let should_draw = children.is_none() || (config.draw_non_empty_parent && octree.node_primitive_count(node) > 0);
    if should_draw {
        if let Some(tight) = octree.node_tight_aabb(node) {
            push_box_edges(tight.min, tight.max, out);
        }
    }
    if let Some(children) = children {
        for child in children {
            visit(octree, child, config, out);
        }
    }
}

fn push_box_edges(min: Vec3, max: Vec3, out: &mut DebugGeometry) {
    let corners = [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ];
    const EDGES: [(usize, usize); 12] = [
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 0),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 4),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
    ];
    for (a, b) in EDGES {
        out.lines.push((corners[a], corners[b]));
    }
}

/// Appends a visual overlay of a collision-data buffer's contents to
/// `out`: a line from contact point along its direction scaled by depth
/// for `PointDirection`/`PointIndexDirection` elements (the penetration
/// vector the solver would project against), and nothing for the cell
/// taxonomy elements, which carry no inherent position without resolving
/// through a geometry the caller must supply separately.
pub fn populate_collision_overlay(data: &CollisionData, out: &mut DebugGeometry) {
    for side in [data.elements_a(), data.elements_b()] {
        for element in side {
            if let CollisionElement::PointDirection(pd) = element {
                out.lines.push((pd.point, pd.point + pd.direction * pd.depth));
            }
        }
    }
}
