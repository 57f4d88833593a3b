//! Primitive descriptors: one record per indexed cell of a registered
//! geometry.
//!
//! Descriptors live in a flat, free-list-backed arena modeled on
//! `understory_index`'s `Entry`/`Key` pattern: a generational id replaces
//! the intrusive-list next-pointer of the system this was modeled on, so a
//! descriptor's "current node" is a plain [`crate::arena::NodeId`] rather
//! than a pointer into node-owned storage. Each slot is its own mutex so
//! the per-step refresh/revalidate/reinsert passes can run as a `rayon`
//! parallel-for over disjoint ids while only taking `&self`.

use std::sync::{Mutex, MutexGuard};

use glam::Vec3;
use proximity_geometry::{Aabb3, GeometryId, PrimitiveKind};

use crate::arena::NodeId;

/// A generational handle to a [`PrimitiveDescriptor`] in a [`PrimitiveArena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PrimitiveId(u32, u32);

impl PrimitiveId {
    const fn new(slot: u32, generation: u32) -> Self {
        Self(slot, generation)
    }

    const fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Either a cached position (point primitives) or a cached AABB
/// (everything else) — "a discriminated cache" per the data model.
#[derive(Clone, Copy, Debug)]
pub enum PrimitiveCache {
    Point(Vec3),
    Bounds(Aabb3),
}

impl PrimitiveCache {
    #[must_use]
    pub fn loosely_fits_in(&self, node_loose: Aabb3) -> bool {
        match self {
            Self::Point(p) => node_loose.contains_point(*p),
            Self::Bounds(b) => {
                node_loose.min.cmple(b.min).all() && node_loose.max.cmpge(b.max).all()
            }
        }
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Point(p) => *p,
            Self::Bounds(b) => b.center(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PrimitiveDescriptor {
    pub geometry_id: GeometryId,
    pub local_index: u32,
    pub kind: PrimitiveKind,
    pub cache: PrimitiveCache,
    pub node: NodeId,
    pub valid: bool,
}

struct Slot {
    generation: u32,
    descriptor: Mutex<Option<PrimitiveDescriptor>>,
}

/// Arena of primitive descriptors for every geometry currently registered
/// with the octree, indexed by [`PrimitiveId`].
///
/// Descriptors are allocated in bulk when a geometry is added (one per
/// cell) and freed only when that geometry is removed or the arena is
/// cleared, matching the descriptor lifecycle in the data model. Bulk
/// structural changes (`insert`/`remove`/`clear`) take `&mut self`; the
/// per-step passes that only touch an existing descriptor's fields take
/// `&self` and are safe to run from a `rayon` parallel iterator.
#[derive(Default)]
pub struct PrimitiveArena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
}

impl PrimitiveArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, descriptor: PrimitiveDescriptor) -> PrimitiveId {
        if let Some(slot) = self.free_list.pop() {
            let entry = &mut self.slots[slot as usize];
            *entry.descriptor.get_mut().expect("descriptor mutex poisoned") = Some(descriptor);
            PrimitiveId::new(slot, entry.generation)
        } else {
            let slot = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                descriptor: Mutex::new(Some(descriptor)),
            });
            PrimitiveId::new(slot, 0)
        }
    }

    pub fn remove(&mut self, id: PrimitiveId) -> Option<PrimitiveDescriptor> {
        let entry = self.slots.get_mut(id.slot())?;
        if entry.generation != id.1 {
            return None;
        }
        let taken = entry
            .descriptor
            .get_mut()
            .expect("descriptor mutex poisoned")
            .take();
        if taken.is_some() {
            entry.generation = entry.generation.wrapping_add(1);
            self.free_list.push(id.0);
        }
        taken
    }

    fn lock(&self, id: PrimitiveId) -> Option<MutexGuard<'_, Option<PrimitiveDescriptor>>> {
        let entry = self.slots.get(id.slot())?;
        if entry.generation != id.1 {
            return None;
        }
        Some(entry.descriptor.lock().expect("descriptor mutex poisoned"))
    }

    #[must_use]
    pub fn get(&self, id: PrimitiveId) -> Option<PrimitiveDescriptor> {
        self.lock(id)?.clone()
    }

    pub fn with_mut<R>(&self, id: PrimitiveId, f: impl FnOnce(&mut PrimitiveDescriptor) -> R) -> Option<R> {
        let mut guard = self.lock(id)?;
        guard.as_mut().map(f)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }

    /// Every currently-live primitive id, in arena order. Used by the
    /// incremental-update passes, which are internally parallelizable over
    /// this list via `rayon`.
    #[must_use]
    pub fn live_ids(&self) -> Vec<PrimitiveId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, e)| {
                e.descriptor
                    .lock()
                    .expect("descriptor mutex poisoned")
                    .is_some()
                    .then(|| PrimitiveId::new(slot as u32, e.generation))
            })
            .collect()
    }

    #[must_use]
    pub fn live_ids_of_geometry(&self, geometry_id: GeometryId) -> Vec<PrimitiveId> {
        self.live_ids()
            .into_iter()
            .filter(|&id| {
                self.get(id)
                    .is_some_and(|d| d.geometry_id == geometry_id)
            })
            .collect()
    }
}
