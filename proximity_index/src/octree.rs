//! The loose octree itself: configuration, bulk build, incremental update,
//! and top-down insertion.

use glam::Vec3;
use proximity_geometry::{Aabb3, Geometry, GeometryId, PrimitiveKind};
use rayon::prelude::*;
use std::sync::{Arc, RwLock};

use crate::arena::{NodeArena, NodeData, NodeId};
use crate::primitive::{PrimitiveArena, PrimitiveCache, PrimitiveDescriptor, PrimitiveId};

/// A geometry registered with the octree, shared with whatever else holds
/// a reference to it (the solver, the façade). The octree only ever reads
/// through this handle; nothing it does requires unique ownership.
pub type SharedGeometry = Arc<RwLock<Geometry>>;

/// Externally supplied configuration for the shared octree.
#[derive(Clone, Copy, Debug)]
pub struct OctreeConfig {
    pub root_center: Vec3,
    pub root_width: f32,
    pub min_width: f32,
    pub min_width_ratio: f32,
    pub always_rebuild: bool,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            root_center: Vec3::ZERO,
            root_width: 100.0,
            min_width: 0.1,
            min_width_ratio: 1.0,
            always_rebuild: false,
        }
    }
}

struct Registered {
    geometry: SharedGeometry,
    kind: PrimitiveKind,
    primitive_ids: Vec<PrimitiveId>,
}

/// Hierarchical spatial index with 8-way subdivision and loose (2x tight)
/// node bounds.
pub struct LooseOctree {
    config: OctreeConfig,
    arena: NodeArena,
    primitives: PrimitiveArena,
    registered: hashbrown::HashMap<GeometryId, Registered>,
    max_depth: u32,
    built: bool,
}

impl LooseOctree {
    #[must_use]
    pub fn new(config: OctreeConfig) -> Self {
        let arena = NodeArena::new(config.root_center, config.root_width * 0.5);
        Self {
            config,
            arena,
            primitives: PrimitiveArena::new(),
            registered: hashbrown::HashMap::new(),
            max_depth: 1,
            built: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.built
    }

    #[must_use]
    pub fn pool_is_conserved(&self) -> bool {
        self.arena.pool().is_conserved()
    }

    fn register(&mut self, geometry: SharedGeometry, expected_kind: PrimitiveKind) {
        let (id, kind, cell_count) = {
            let g = geometry.read().expect("geometry lock poisoned");
            (g.id(), g.primitive_kind(), g.cell_count())
        };
        assert!(
            kind == expected_kind,
            "geometry {id:?} registered under the wrong primitive kind"
        );
        assert!(
            !self.registered.contains_key(&id),
            "geometry {id:?} is already registered with this octree"
        );

        let mut primitive_ids = Vec::with_capacity(cell_count as usize);
        {
            let g = geometry.read().expect("geometry lock poisoned");
            for local_index in 0..cell_count {
                let cache = cell_cache(&g, local_index);
                primitive_ids.push(self.primitives.insert(PrimitiveDescriptor {
                    geometry_id: id,
                    local_index,
                    kind,
                    cache,
                    node: self.arena.root(),
                    valid: false,
                }));
            }
        }
        self.registered.insert(
            id,
            Registered {
                geometry,
                kind,
                primitive_ids,
            },
        );
        self.built = false;
    }

    /// Allocates one descriptor per point of `geometry`, fails-fast if the
    /// geometry is already registered or is not a point set.
    pub fn add_point_set(&mut self, geometry: SharedGeometry) {
        self.register(geometry, PrimitiveKind::Point);
    }

    pub fn add_triangle_mesh(&mut self, geometry: SharedGeometry) {
        self.register(geometry, PrimitiveKind::Triangle);
    }

    pub fn add_analytical_geometry(&mut self, geometry: SharedGeometry) {
        self.register(geometry, PrimitiveKind::Analytical);
    }

    /// Reverse of the `add_*` operations: the geometry's primitives are
    /// dropped from the arena. They are also unlinked from whatever node
    /// lists hold them on the next call to [`Self::update`] or
    /// [`Self::rebuild`]; until then stale descriptors may still be
    /// reachable through a node's list but will no longer resolve through
    /// [`PrimitiveArena::get`].
    pub fn remove_geometry(&mut self, id: GeometryId) {
        if let Some(entry) = self.registered.remove(&id) {
            for prim_id in entry.primitive_ids {
                self.primitives.remove(prim_id);
            }
        }
        self.built = false;
    }

    /// Computes the min-width (from configuration, tightened against the
    /// smallest non-point primitive when any are registered), derives the
    /// max depth, and rebuilds from scratch.
    pub fn build(&mut self) {
        if self.registered.is_empty() {
            tracing::warn!("octree build() called with no geometries added");
            return;
        }

        let mut min_width = self.config.min_width;
        let mut saw_non_point = false;
        for entry in self.registered.values() {
            if entry.kind == PrimitiveKind::Point {
                continue;
            }
            let g = entry.geometry.read().expect("geometry lock poisoned");
            let edge = g.aabb().min_edge_length();
            if edge.is_finite() && edge > 0.0 {
                saw_non_point = true;
                min_width = min_width.min(edge * self.config.min_width_ratio);
            }
        }
        if !saw_non_point {
            // All primitives are points: min-width is taken from configuration unchanged.
            min_width = self.config.min_width;
        }
        min_width = min_width.max(f32::EPSILON);

        let ratio = self.config.root_width / min_width;
        self.max_depth = (1.0 + ratio.max(1.0).log2()).floor().max(1.0) as u32;

        self.rebuild();
    }

    /// Clears all primitive lists from all nodes (returning child blocks
    /// to the pool), then runs top-down insertion for every primitive from
    /// the root in parallel.
    pub fn rebuild(&mut self) {
        let root = self.arena.root();
        self.arena.free_subtree_children(root);

        for entry in self.registered.values() {
            let g = entry.geometry.read().expect("geometry lock poisoned");
            for (&prim_id, local_index) in entry.primitive_ids.iter().zip(0_u32..) {
                let cache = cell_cache(&g, local_index);
                self.primitives.with_mut(prim_id, |d| {
                    d.cache = cache;
                    d.node = root;
                    d.valid = false;
                });
            }
        }

        let ids = self.primitives.live_ids();
        ids.par_iter().for_each(|&id| {
            self.insert_top_down(id, root);
        });
        for &id in &ids {
            self.primitives.with_mut(id, |d| d.valid = true);
        }
        self.built = true;
    }

    /// If not yet built, builds. Else, rebuilds from scratch when
    /// `always_rebuild` is set, otherwise runs the 5-pass incremental
    /// update.
    pub fn update(&mut self) {
        if !self.built {
            self.build();
        } else if self.config.always_rebuild {
            self.rebuild();
        } else {
            self.incremental_update();
        }
    }

    /// Recursively returns all non-root nodes to the pool, clears every
    /// per-type list, primitive vector and geometry registration, and
    /// marks the tree unbuilt.
    pub fn clear(&mut self) {
        let root = self.arena.root();
        self.arena.free_subtree_children(root);
        self.primitives.clear();
        self.registered.clear();
        self.built = false;
        assert!(
            self.pool_is_conserved(),
            "node pool failed to conserve on clear: allocated != 8*free+1"
        );
    }

    fn insert_top_down(&self, prim_id: PrimitiveId, start: NodeId) {
        let mut node = start;
        loop {
            let Some((depth, center, half_width)) =
                self.arena.with_node(node, |n| (n.depth, n.center, n.half_width))
            else {
                // Node died under us (freed by a racing compaction); anchor
                // at the tree root rather than lose the primitive.
                node = self.arena.root();
                continue;
            };

            let (cache, kind) = self
                .primitives
                .get(prim_id)
                .map(|d| (d.cache, d.kind))
                .expect("primitive alive during its own insertion");

            if depth >= self.max_depth {
                self.attach_to_node(prim_id, node, kind);
                return;
            }

            match cache {
                PrimitiveCache::Point(pos) => {
                    let octant = octant_index(pos - center);
                    let children = self.arena.split_if_leaf(node);
                    node = children[octant as usize];
                }
                PrimitiveCache::Bounds(aabb) => {
                    let octant = octant_index(aabb.center() - center);
                    if straddles(aabb.min, aabb.max, center, half_width, octant) {
                        self.attach_to_node(prim_id, node, kind);
                        return;
                    }
                    let children = self.arena.split_if_leaf(node);
                    node = children[octant as usize];
                }
            }
        }
    }

    fn attach_to_node(&self, prim_id: PrimitiveId, node: NodeId, kind: PrimitiveKind) {
        self.arena.with_node(node, |n| match kind {
            PrimitiveKind::Point => n.points.push(prim_id),
            PrimitiveKind::Triangle => n.triangles.push(prim_id),
            PrimitiveKind::Analytical => n.analytical.push(prim_id),
        });
        self.primitives.with_mut(prim_id, |d| d.node = node);
    }

    /// The five-pass incremental update described in the component design:
    /// refresh cached state, upward-revalidate, rebuild per-node lists,
    /// reinsert invalid primitives, and compact empty blocks.
    fn incremental_update(&mut self) {
        self.refresh_cached_state();
        let invalid = self.upward_revalidate();
        self.rebuild_node_lists();
        self.reinsert_invalid(&invalid);
        self.compact();
    }

    fn refresh_cached_state(&self) {
        for entry in self.registered.values() {
            let g = entry.geometry.read().expect("geometry lock poisoned");
            entry.primitive_ids.par_iter().for_each(|&prim_id| {
                self.primitives.with_mut(prim_id, |d| {
                    d.cache = cell_cache(&g, d.local_index);
                });
            });
        }
    }

    /// For each primitive whose current node no longer loosely contains
    /// it, walk parent pointers until the first ancestor that tightly
    /// contains it (or the root); mark invalid and re-anchor there. For
    /// primitives whose node still contains them, validity tracks whether
    /// they must still be pushed deeper (straddling/at-max-depth keeps
    /// them valid; otherwise they must descend further).
    ///
    /// Returns the set of primitive ids marked invalid this pass, which
    /// also covers primitives belonging to geometries removed since the
    /// last update (these are dropped rather than reinserted).
    fn upward_revalidate(&self) -> Vec<PrimitiveId> {
        let ids = self.primitives.live_ids();
        ids.into_par_iter()
            .filter_map(|id| {
                let still_live = self.primitives.get(id)?;
                if !self.registered.contains_key(&still_live.geometry_id) {
                    return Some(id);
                }

                let loose_ok = self
                    .arena
                    .with_node(still_live.node, |n| still_live.cache.loosely_fits_in(n.loose_aabb()))
                    .unwrap_or(false);

                if !loose_ok {
                    let mut walk = still_live.node;
                    let anchor = loop {
                        let Some(parent) = self.arena.with_node(walk, |n| n.parent).flatten() else {
                            break walk;
                        };
                        let tight_ok = self
                            .arena
                            .with_node(parent, |n| still_live.cache.loosely_fits_in(n.tight_aabb()))
                            .unwrap_or(false);
                        if tight_ok {
                            break parent;
                        }
                        walk = parent;
                    };
                    self.primitives.with_mut(id, |d| {
                        d.node = anchor;
                        d.valid = false;
                    });
                    return Some(id);
                }

                let depth = self
                    .arena
                    .with_node(still_live.node, |n| n.depth)
                    .unwrap_or(0);
                let must_descend = depth < self.max_depth
                    && match still_live.cache {
                        PrimitiveCache::Point(_) => true,
                        PrimitiveCache::Bounds(aabb) => {
                            let (center, half_width) = self
                                .arena
                                .with_node(still_live.node, |n| (n.center, n.half_width))
                                .unwrap_or((Vec3::ZERO, 0.0));
                            let octant = octant_index(aabb.center() - center);
                            !straddles(aabb.min, aabb.max, center, half_width, octant)
                        }
                    };

                if must_descend {
                    self.primitives.with_mut(id, |d| d.valid = false);
                    Some(id)
                } else {
                    self.primitives.with_mut(id, |d| d.valid = true);
                    None
                }
            })
            .collect()
    }

    /// For each active node, drop descriptors marked invalid from its
    /// per-type lists; counts fall out of the new list lengths.
    fn rebuild_node_lists(&self) {
        self.visit_all_nodes(self.arena.root(), &mut |arena, node_id| {
            arena.with_node(node_id, |node| {
                let keep = |ids: &mut Vec<PrimitiveId>, primitives: &PrimitiveArena| {
                    ids.retain(|&id| primitives.get(id).is_some_and(|d| d.valid));
                };
                keep(&mut node.points, &self.primitives);
                keep(&mut node.triangles, &self.primitives);
                keep(&mut node.analytical, &self.primitives);
            });
        });
    }

    fn reinsert_invalid(&mut self, invalid: &[PrimitiveId]) {
        let root = self.arena.root();
        invalid.par_iter().for_each(|&id| {
            let Some(descriptor) = self.primitives.get(id) else {
                return;
            };
            if !self.registered.contains_key(&descriptor.geometry_id) {
                return;
            }
            let anchor = if self.arena.with_node(descriptor.node, |_| ()).is_some() {
                descriptor.node
            } else {
                root
            };
            self.insert_top_down(id, anchor);
            self.primitives.with_mut(id, |d| d.valid = true);
        });
        // Descriptors whose owning geometry was removed are dropped instead
        // of reinserted.
        for &id in invalid {
            if let Some(d) = self.primitives.get(id) {
                if !self.registered.contains_key(&d.geometry_id) {
                    self.primitives.remove(id);
                }
            }
        }
    }

    fn compact(&self) {
        // Compaction walks bottom-up from every node that might now be
        // empty; driving it from the root downward then bubbling up from
        // leaves gives the same end state without tracking a worklist.
        self.visit_all_nodes(self.arena.root(), &mut |arena, node_id| {
            arena.compact_from(node_id);
        });
    }

    fn visit_all_nodes(&self, node: NodeId, f: &mut impl FnMut(&NodeArena, NodeId)) {
        let child_block = self.arena.with_node(node, |n| n.child_block).flatten();
        if let Some(block_id) = child_block {
            for child in self.arena.child_ids_of_block(block_id) {
                self.visit_all_nodes(child, f);
            }
        }
        f(&self.arena, node);
    }

    pub(crate) fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub(crate) fn primitives(&self) -> &PrimitiveArena {
        &self.primitives
    }

    pub fn registered_geometry_ids(&self) -> Vec<GeometryId> {
        self.registered.keys().copied().collect()
    }

    /// The tree's root node id, stable for the tree's whole lifetime.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.arena.root()
    }

    /// A snapshot of one primitive's descriptor, or `None` if it has been
    /// removed since the caller last looked it up.
    #[must_use]
    pub fn primitive(&self, id: PrimitiveId) -> Option<PrimitiveDescriptor> {
        self.primitives.get(id)
    }

    /// Every currently-live primitive id of the given kind. Used by the
    /// broad-phase driver to enumerate "each primitive of each type still
    /// held in the tree".
    #[must_use]
    pub fn primitive_ids_of_kind(&self, kind: PrimitiveKind) -> Vec<PrimitiveId> {
        self.primitives
            .live_ids()
            .into_iter()
            .filter(|&id| self.primitives.get(id).is_some_and(|d| d.kind == kind))
            .collect()
    }

    /// The shared handle for a registered geometry, if still registered.
    #[must_use]
    pub fn geometry(&self, id: GeometryId) -> Option<SharedGeometry> {
        self.registered.get(&id).map(|entry| entry.geometry.clone())
    }

    /// A copy of node `node`'s per-type resident list for `kind`.
    #[must_use]
    pub fn node_list(&self, node: NodeId, kind: PrimitiveKind) -> Vec<PrimitiveId> {
        self.arena
            .with_node(node, |n| match kind {
                PrimitiveKind::Point => n.points.clone(),
                PrimitiveKind::Triangle => n.triangles.clone(),
                PrimitiveKind::Analytical => n.analytical.clone(),
            })
            .unwrap_or_default()
    }

    /// `node`'s loose (2x tight) bound, if it is still live.
    #[must_use]
    pub fn node_loose_aabb(&self, node: NodeId) -> Option<Aabb3> {
        self.arena.with_node(node, |n| n.loose_aabb())
    }

    /// `node`'s tight bound, if it is still live.
    #[must_use]
    pub fn node_tight_aabb(&self, node: NodeId) -> Option<Aabb3> {
        self.arena.with_node(node, |n| n.tight_aabb())
    }

    /// `node`'s depth below the root (the root is depth 0), if it is still
    /// live. Used by the debug export's `max_level` pruning.
    #[must_use]
    pub fn node_depth(&self, node: NodeId) -> Option<u32> {
        self.arena.with_node(node, |n| n.depth)
    }

    /// Total number of primitives (of every kind) resident at `node`
    /// itself, not its subtree — used by the debug export's
    /// `draw_non_empty_parent` pruning.
    #[must_use]
    pub fn node_primitive_count(&self, node: NodeId) -> usize {
        self.arena.with_node(node, NodeData::total_primitive_count).unwrap_or(0)
    }

    /// `node`'s 8 children, if it has been split into an internal node.
    #[must_use]
    pub fn node_children(&self, node: NodeId) -> Option<[NodeId; 8]> {
        let block_id = self.arena.with_node(node, |n| n.child_block).flatten()?;
        Some(self.arena.child_ids_of_block(block_id))
    }

    /// Recursively visits every node whose loose bound contains `point`,
    /// starting from the root — "recursively intersect the root with the
    /// point" from the broad-phase driver's contract. The visitor reads
    /// candidate residents itself via [`Self::node_list`].
    pub fn candidates_for_point(&self, point: Vec3, visit: &mut impl FnMut(NodeId)) {
        self.visit_point_subtree(self.arena.root(), point, visit);
    }

    fn visit_point_subtree(&self, node: NodeId, point: Vec3, visit: &mut impl FnMut(NodeId)) {
        let Some(loose) = self.node_loose_aabb(node) else {
            return;
        };
        if !loose.contains_point(point) {
            return;
        }
        visit(node);
        if let Some(children) = self.node_children(node) {
            for child in children {
                self.visit_point_subtree(child, point, visit);
            }
        }
    }

    /// Recursively visits every node whose loose bound overlaps `aabb`,
    /// starting from the root.
    pub fn candidates_for_aabb(&self, aabb: Aabb3, visit: &mut impl FnMut(NodeId)) {
        self.visit_aabb_subtree(self.arena.root(), aabb, visit);
    }

    fn visit_aabb_subtree(&self, node: NodeId, aabb: Aabb3, visit: &mut impl FnMut(NodeId)) {
        let Some(loose) = self.node_loose_aabb(node) else {
            return;
        };
        if !loose.overlaps(&aabb) {
            return;
        }
        visit(node);
        if let Some(children) = self.node_children(node) {
            for child in children {
                self.visit_aabb_subtree(child, aabb, visit);
            }
        }
    }
}

fn cell_cache(geometry: &Geometry, local_index: u32) -> PrimitiveCache {
    match geometry.point_position(local_index) {
        Some(p) => PrimitiveCache::Point(p),
        None => PrimitiveCache::Bounds(geometry.cell_aabb(local_index)),
    }
}

fn octant_index(rel: Vec3) -> u32 {
    let bit = |v: f32| u32::from(v > 0.0);
    bit(rel.x) | (bit(rel.y) << 1) | (bit(rel.z) << 2)
}

/// `true` when the non-point primitive `[lo, hi]` cannot fit inside the
/// loose bound of the child at `octant` under `center`/`half_width` — it
/// must be kept at the current node instead of pushed down.
fn straddles(lo: Vec3, hi: Vec3, center: Vec3, half_width: f32, octant: u32) -> bool {
    for axis in 0..3 {
        let bit = (octant >> axis) & 1;
        let c = center[axis];
        let (loose_min, loose_max) = if bit == 1 {
            (c - 0.5 * half_width, c + 1.5 * half_width)
        } else {
            (c - 1.5 * half_width, c + 0.5 * half_width)
        };
        if lo[axis] < loose_min || hi[axis] > loose_max {
            return true;
        }
    }
    false
}
