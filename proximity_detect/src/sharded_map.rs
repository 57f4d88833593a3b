//! Shard-by-hash concurrent map used for the per-pair invalid point-mesh
//! map: "a point of mesh M was found outside at least one triangle of
//! mesh N this step." Writers (the point-triangle kernel) and readers (the
//! post-dispatch cleanup pass) each take only the one shard's lock their
//! key hashes to, per design notes §9 ("shard-by-hash fixed-bucket
//! concurrent structure ... avoids dependency on a specific concurrent
//! library").

use std::sync::Mutex;

use hashbrown::HashMap;
use smallvec::SmallVec;

const SHARD_COUNT: u64 = 16;

/// Packs a point-mesh pair's key: the offending vertex's local index and
/// the geometry index of the point-set it belongs to, `(vertex_id << 32) |
/// point_geometry_index` per the concurrency model.
#[must_use]
pub(crate) fn point_mesh_key(vertex_id: u32, point_geometry_index: u32) -> u64 {
    (u64::from(vertex_id) << 32) | u64::from(point_geometry_index)
}

#[derive(Debug, Default)]
pub(crate) struct ShardedMap {
    shards: Vec<Mutex<HashMap<u64, SmallVec<[u32; 4]>>>>,
}

impl ShardedMap {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    fn shard_of(&self, key: u64) -> &Mutex<HashMap<u64, SmallVec<[u32; 4]>>> {
        &self.shards[(key % SHARD_COUNT) as usize]
    }

    /// Records that `key` (a point) was found outside `mesh_geometry_index`
    /// this step.
    pub(crate) fn mark_outside(&self, key: u64, mesh_geometry_index: u32) {
        let mut shard = self.shard_of(key).lock().expect("sharded map mutex poisoned");
        let offenders = shard.entry(key).or_default();
        if !offenders.contains(&mesh_geometry_index) {
            offenders.push(mesh_geometry_index);
        }
    }

    #[must_use]
    pub(crate) fn is_outside(&self, key: u64, mesh_geometry_index: u32) -> bool {
        self.shard_of(key)
            .lock()
            .expect("sharded map mutex poisoned")
            .get(&key)
            .is_some_and(|offenders| offenders.contains(&mesh_geometry_index))
    }

    pub(crate) fn clear(&self) {
        for shard in &self.shards {
            shard.lock().expect("sharded map mutex poisoned").clear();
        }
    }
}
