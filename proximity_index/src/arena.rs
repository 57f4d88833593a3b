//! Generational node arena backing the octree.
//!
//! This replaces the pointer-linked node blocks of the system this index
//! was modeled on with an index-based arena: a node's "current node"
//! handle is a slot+generation pair rather than a raw pointer, matching
//! `understory_box_tree`'s `NodeId` scheme. Blocks of 8 siblings are
//! carved and returned together through [`crate::pool::NodePool`]; the
//! arena only owns the per-slot storage and generation bookkeeping.

use std::sync::{Mutex, RwLock};

use glam::Vec3;
use proximity_geometry::Aabb3;

use crate::pool::NodePool;
use crate::primitive::PrimitiveId;

/// A stable, generation-checked handle to an octree node.
///
/// Slot 0 is permanently the root and is never recycled. Any other slot
/// belongs to some 8-node block; when that block is returned to the pool
/// every one of its 8 slots' generation is bumped, so a `NodeId` captured
/// before the return compares unequal to the slot's live generation and is
/// treated as dead rather than aliasing a different, newer node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u32, u32);

impl NodeId {
    pub(crate) const fn new(slot: u32, generation: u32) -> Self {
        Self(slot, generation)
    }

    pub(crate) const fn slot(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }

    #[must_use]
    pub const fn root() -> Self {
        Self::new(0, 0)
    }
}

/// The per-node mutable state guarded by that node's lock.
///
/// Folding the per-type list locks and the split lock into a single
/// per-node mutex is a deliberate simplification over the three-separate-
/// locks-plus-split-lock model described for the system this was modeled
/// on: contention is low by construction (primitives land in different
/// nodes), so one mutex per node already gives the required O(1) critical
/// sections without the bookkeeping of four locks per node.
#[derive(Debug)]
pub(crate) struct NodeData {
    pub parent: Option<NodeId>,
    pub child_block: Option<u32>,
    pub center: Vec3,
    pub half_width: f32,
    pub depth: u32,
    pub points: Vec<PrimitiveId>,
    pub triangles: Vec<PrimitiveId>,
    pub analytical: Vec<PrimitiveId>,
}

impl NodeData {
    fn new_leaf(parent: Option<NodeId>, center: Vec3, half_width: f32, depth: u32) -> Self {
        Self {
            parent,
            child_block: None,
            center,
            half_width,
            depth,
            points: Vec::new(),
            triangles: Vec::new(),
            analytical: Vec::new(),
        }
    }

    #[must_use]
    pub fn tight_aabb(&self) -> Aabb3 {
        let he = Vec3::splat(self.half_width);
        Aabb3::new(self.center - he, self.center + he)
    }

    /// Loose bound: the tight bound expanded by the fixed 2x loose factor.
    #[must_use]
    pub fn loose_aabb(&self) -> Aabb3 {
        let he = Vec3::splat(self.half_width * 2.0);
        Aabb3::new(self.center - he, self.center + he)
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.child_block.is_none()
    }

    #[must_use]
    pub fn total_primitive_count(&self) -> usize {
        self.points.len() + self.triangles.len() + self.analytical.len()
    }

    #[must_use]
    pub fn is_empty_of_primitives(&self) -> bool {
        self.total_primitive_count() == 0
    }
}

struct SlotEntry {
    generation: u32,
    data: Mutex<Option<NodeData>>,
}

fn octant_offset(octant: u32, child_half_width: f32) -> Vec3 {
    Vec3::new(
        if octant & 1 == 0 { -child_half_width } else { child_half_width },
        if octant & 2 == 0 { -child_half_width } else { child_half_width },
        if octant & 4 == 0 { -child_half_width } else { child_half_width },
    )
}

pub(crate) struct NodeArena {
    slots: RwLock<Vec<SlotEntry>>,
    pool: Mutex<NodePool>,
}

impl NodeArena {
    pub(crate) fn new(root_center: Vec3, root_half_width: f32) -> Self {
        let root = SlotEntry {
            generation: 0,
            data: Mutex::new(Some(NodeData::new_leaf(None, root_center, root_half_width, 0))),
        };
        Self {
            slots: RwLock::new(vec![root]),
            pool: Mutex::new(NodePool::new()),
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        NodeId::root()
    }

    pub(crate) fn pool(&self) -> std::sync::MutexGuard<'_, NodePool> {
        self.pool.lock().expect("node pool mutex poisoned")
    }

    fn with_node_in<R>(slots: &[SlotEntry], id: NodeId, f: impl FnOnce(&mut NodeData) -> R) -> Option<R> {
        let entry = slots.get(id.slot())?;
        if entry.generation != id.generation() {
            return None;
        }
        let mut guard = entry.data.lock().expect("node mutex poisoned");
        guard.as_mut().map(f)
    }

    fn set_slot_in(slots: &[SlotEntry], id: NodeId, data: NodeData) {
        let entry = &slots[id.slot()];
        debug_assert_eq!(entry.generation, id.generation(), "writing into a stale slot");
        *entry.data.lock().expect("node mutex poisoned") = Some(data);
    }

    fn child_ids_of_block_in(slots: &[SlotEntry], block_id: u32) -> [NodeId; 8] {
        let base = Self::slot_base(block_id);
        std::array::from_fn(|i| NodeId::new((base + i) as u32, slots[base + i].generation))
    }

    fn slot_base(block_id: u32) -> usize {
        1 + block_id as usize * 8
    }

    /// Runs `f` with exclusive access to `id`'s data, if `id` is still
    /// live. Returns `None` if the slot was freed and recycled.
    pub(crate) fn with_node<R>(&self, id: NodeId, f: impl FnOnce(&mut NodeData) -> R) -> Option<R> {
        let slots = self.slots.read().expect("node arena rwlock poisoned");
        Self::with_node_in(&slots, id, f)
    }

    pub(crate) fn child_ids_of_block(&self, block_id: u32) -> [NodeId; 8] {
        let slots = self.slots.read().expect("node arena rwlock poisoned");
        Self::child_ids_of_block_in(&slots, block_id)
    }

    fn ensure_capacity(&self, required_len: usize) {
        let mut slots = self.slots.write().expect("node arena rwlock poisoned");
        while slots.len() < required_len {
            slots.push(SlotEntry {
                generation: 0,
                data: Mutex::new(None),
            });
        }
    }

    /// Splits `id` into 8 children if it is currently a leaf, returning
    /// their ids either way. Concurrent callers racing to split the same
    /// node serialize on that node's data lock: the first to publish a
    /// `child_block` wins, the loser returns its unused block to the pool
    /// and reports the winner's children instead.
    pub(crate) fn split_if_leaf(&self, id: NodeId) -> [NodeId; 8] {
        {
            let slots = self.slots.read().expect("node arena rwlock poisoned");
            if let Some(Some(block_id)) = Self::with_node_in(&slots, id, |n| n.child_block) {
                return Self::child_ids_of_block_in(&slots, block_id);
            }
        }

        let block_id = self.pool().request_block();
        self.ensure_capacity(Self::slot_base(block_id) + 8);

        let slots = self.slots.read().expect("node arena rwlock poisoned");
        let children = Self::child_ids_of_block_in(&slots, block_id);
        let published = Self::with_node_in(&slots, id, |node| {
            if node.child_block.is_some() {
                return false;
            }
            let child_half = node.half_width * 0.5;
            let center = node.center;
            let depth = node.depth;
            for (octant, &child_id) in children.iter().enumerate() {
                let offset = octant_offset(octant as u32, child_half);
                Self::set_slot_in(
                    &slots,
                    child_id,
                    NodeData::new_leaf(Some(id), center + offset, child_half, depth + 1),
                );
            }
            node.child_block = Some(block_id);
            true
        })
        .unwrap_or(false);
        drop(slots);

        if published {
            children
        } else {
            self.pool().return_block(block_id);
            self.with_node(id, |n| n.child_block)
                .flatten()
                .map(|winning| self.child_ids_of_block(winning))
                .unwrap_or(children)
        }
    }

    /// Returns `id`'s child block (if any) to the pool, recursing first so
    /// grandchildren blocks are returned before their parent block. Leaves
    /// `id` itself as an empty leaf.
    pub(crate) fn free_subtree_children(&self, id: NodeId) {
        let block_id = self.with_node(id, |node| node.child_block.take()).flatten();
        let Some(block_id) = block_id else {
            return;
        };
        for child in self.child_ids_of_block(block_id) {
            self.free_subtree_children(child);
        }
        let base = Self::slot_base(block_id);
        {
            let slots = self.slots.read().expect("node arena rwlock poisoned");
            for offset in 0..8 {
                *slots[base + offset].data.lock().expect("node mutex poisoned") = None;
            }
        }
        {
            let mut slots = self.slots.write().expect("node arena rwlock poisoned");
            for offset in 0..8 {
                slots[base + offset].generation = slots[base + offset].generation.wrapping_add(1);
            }
        }
        self.pool().return_block(block_id);
    }

    /// Walks from `id` toward the root, freeing any 8-child block whose
    /// children are all empty leaves, promoting that parent back to a leaf.
    pub(crate) fn compact_from(&self, mut id: NodeId) {
        loop {
            let Some(parent) = self.with_node(id, |n| n.parent).flatten() else {
                return;
            };
            let should_free = self
                .with_node(parent, |p| p.child_block)
                .flatten()
                .is_some_and(|block_id| {
                    self.child_ids_of_block(block_id).iter().all(|&child| {
                        self.with_node(child, |c| c.is_leaf() && c.is_empty_of_primitives())
                            .unwrap_or(true)
                    })
                });
            if should_free {
                self.free_subtree_children(parent);
                id = parent;
            } else {
                return;
            }
        }
    }
}
