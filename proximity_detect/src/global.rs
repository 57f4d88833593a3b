//! The process-wide shared octree: a singleton with explicit init/teardown,
//! per design notes §9 ("model as a process-wide singleton with explicit
//! init/teardown ... pass a handle through a context parameter rather than
//! relying on file-scope state"). Direct-family façades never touch this;
//! only octree-routed façades register with it.

use std::sync::{Arc, Mutex, OnceLock};

use hashbrown::HashMap;
use proximity_geometry::{Geometry, GeometryId, PrimitiveKind};
use proximity_index::{LooseOctree, OctreeConfig, SharedGeometry};

use crate::algorithm::AlgorithmTag;
use crate::dispatch::Dispatch;
use crate::pair::{normalize, PairRegistration};
use crate::sharded_map::ShardedMap;
use proximity_data::CollisionData;

struct GlobalOctreeInner {
    octree: LooseOctree,
    registrations: HashMap<(GeometryId, GeometryId), PairRegistration>,
    invalid_map: ShardedMap,
}

impl GlobalOctreeInner {
    fn new(config: OctreeConfig) -> Self {
        Self {
            octree: LooseOctree::new(config),
            registrations: HashMap::new(),
            invalid_map: ShardedMap::new(),
        }
    }
}

/// A cheaply cloneable handle to the one shared octree instance. The
/// octree itself is constructed lazily on first [`GlobalOctreeHandle::get`]
/// / [`GlobalOctreeHandle::init`] call with a fixed root center, ~100-unit
/// initial width, ~0.1 initial min-width and a min-width ratio of 1.0 (see
/// [`OctreeConfig::default`]).
#[derive(Clone)]
pub struct GlobalOctreeHandle(Arc<Mutex<GlobalOctreeInner>>);

impl std::fmt::Debug for GlobalOctreeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalOctreeHandle").finish_non_exhaustive()
    }
}

static GLOBAL: OnceLock<GlobalOctreeHandle> = OnceLock::new();

impl GlobalOctreeHandle {
    /// Initializes the shared octree with `config` if it has not already
    /// been created this process, and returns a handle to it either way —
    /// a later `init` call after the first never changes the already-live
    /// configuration.
    pub fn init(config: OctreeConfig) -> Self {
        GLOBAL
            .get_or_init(|| Self(Arc::new(Mutex::new(GlobalOctreeInner::new(config)))))
            .clone()
    }

    /// A handle to the shared octree, lazily constructed with
    /// [`OctreeConfig::default`] if [`Self::init`] was never called.
    #[must_use]
    pub fn get() -> Self {
        Self::init(OctreeConfig::default())
    }

    /// Releases all registered geometries and pair registrations, keeping
    /// the node pool's already-allocated chunks — "`clearInternalOctree()`
    /// releases all registered geometries and pair registrations but keeps
    /// the pool."
    pub fn teardown(&self) {
        let mut inner = self.0.lock().expect("global octree mutex poisoned");
        inner.octree.clear();
        inner.registrations.clear();
        inner.invalid_map.clear();
    }

    /// Registers geometries `a`/`b` with the shared octree (skipping a
    /// geometry already registered by an earlier pair sharing it) and adds
    /// the pair entry, returning the buffer the broad-phase driver will
    /// fill for it. Duplicate-pair registration is a programmer-error
    /// invariant and panics, matching the octree's own duplicate-geometry
    /// assertion.
    pub(crate) fn register_pair(&self, tag: AlgorithmTag, geom_a: SharedGeometry, geom_b: SharedGeometry) -> Arc<CollisionData> {
        let id_a = geom_a.read().expect("geometry lock poisoned").id();
        let id_b = geom_b.read().expect("geometry lock poisoned").id();
        let mut inner = self.0.lock().expect("global octree mutex poisoned");
        let key = normalize(id_a, id_b);
        assert!(
            !inner.registrations.contains_key(&key),
            "pair ({id_a:?}, {id_b:?}) is already registered with the shared octree"
        );

        for (id, geom) in [(id_a, &geom_a), (id_b, &geom_b)] {
            if inner.octree.registered_geometry_ids().contains(&id) {
                continue;
            }
            let kind = geom.read().expect("geometry lock poisoned").primitive_kind();
            match kind {
                PrimitiveKind::Point => inner.octree.add_point_set(geom.clone()),
                PrimitiveKind::Triangle => inner.octree.add_triangle_mesh(geom.clone()),
                PrimitiveKind::Analytical => inner.octree.add_analytical_geometry(geom.clone()),
            }
        }

        let buffer = Arc::new(CollisionData::new());
        inner.registrations.insert(
            key,
            PairRegistration {
                a: id_a,
                b: id_b,
                geom_a,
                geom_b,
                tag,
                buffer: buffer.clone(),
            },
        );
        buffer
    }

    /// The per-step global entry point: updates the shared octree once,
    /// clears every registered pair's buffer, then runs the broad-phase
    /// driver so every octree-routed pair's buffer is refilled for this
    /// step.
    pub fn update_internal_octree_and_detect_collision(&self) {
        let mut inner = self.0.lock().expect("global octree mutex poisoned");
        inner.octree.update();
        let GlobalOctreeInner {
            octree,
            registrations,
            invalid_map,
        } = &mut *inner;
        for reg in registrations.values() {
            reg.buffer.clear_all();
        }
        let dispatch = Dispatch {
            registrations,
            invalid_map,
        };
        proximity_broadphase::drive(octree, &dispatch);
    }

    /// Whether `id` is currently registered with the shared octree — used
    /// by octree-routed façades to detect a geometry removed after their
    /// construction.
    #[must_use]
    pub(crate) fn has_geometry(&self, id: GeometryId) -> bool {
        let inner = self.0.lock().expect("global octree mutex poisoned");
        inner.octree.geometry(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proximity_geometry::PointSet;
    use std::sync::RwLock;

    fn geom(id: u32, kind: Geometry) -> SharedGeometry {
        let _ = id;
        Arc::new(RwLock::new(kind))
    }

    #[test]
    fn register_pair_adds_both_geometries_once() {
        let handle = GlobalOctreeHandle::init(OctreeConfig {
            min_width: 0.1,
            ..Default::default()
        });
        handle.teardown();
        let a = geom(0, Geometry::PointSet(PointSet::new(GeometryId::new(100), vec![glam::Vec3::ZERO])));
        let b = geom(1, Geometry::SurfaceMesh(proximity_geometry::SurfaceMesh::new(
            GeometryId::new(101),
            vec![glam::Vec3::ZERO, glam::Vec3::X, glam::Vec3::Y],
            vec![[0, 1, 2]],
        )));
        let _buf = handle.register_pair(AlgorithmTag::PointSetToSurfaceMesh, a, b);
        let inner = handle.0.lock().unwrap();
        assert_eq!(inner.octree.registered_geometry_ids().len(), 2);
        drop(inner);
        handle.teardown();
    }
}
