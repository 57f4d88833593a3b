//! A registered collision pair on the shared octree: the ordered geometry
//! indices, the algorithm tag, and the buffer the broad-phase driver fills.

use std::sync::Arc;

use proximity_data::CollisionData;
use proximity_geometry::{Geometry, GeometryId};
use proximity_index::SharedGeometry;

use crate::algorithm::AlgorithmTag;

/// One entry in the shared octree's pair-registration table: "at most one
/// algorithm tag is registered [per unordered pair] at a time" is enforced
/// by the caller ([`crate::global::GlobalOctreeHandle::register_pair`]).
#[derive(Debug)]
pub(crate) struct PairRegistration {
    pub(crate) a: GeometryId,
    pub(crate) b: GeometryId,
    pub(crate) geom_a: SharedGeometry,
    pub(crate) geom_b: SharedGeometry,
    pub(crate) tag: AlgorithmTag,
    pub(crate) buffer: Arc<CollisionData>,
}

impl PairRegistration {
    /// The geometry handle on whichever side of this pair `id` names.
    ///
    /// Panics if `id` is neither side — every caller derives `id` from a
    /// primitive descriptor the broad-phase driver already matched against
    /// this registration's key.
    #[must_use]
    pub(crate) fn geometry_for(&self, id: GeometryId) -> SharedGeometry {
        if id == self.a {
            self.geom_a.clone()
        } else {
            debug_assert_eq!(id, self.b, "geometry id does not belong to this pair");
            self.geom_b.clone()
        }
    }

    /// Whichever side of this pair is the point-set geometry, for the
    /// point-mesh validity cleanup that `PointSetToSurfaceMesh` needs.
    #[must_use]
    pub(crate) fn point_side(&self) -> Option<GeometryId> {
        if matches!(&*self.geom_a.read().expect("geometry lock poisoned"), Geometry::PointSet(_)) {
            Some(self.a)
        } else if matches!(&*self.geom_b.read().expect("geometry lock poisoned"), Geometry::PointSet(_)) {
            Some(self.b)
        } else {
            None
        }
    }
}

/// Normalizes an unordered geometry pair into the table key: the order a
/// caller happens to pass ids in must not create two distinct
/// registrations for the same unordered pair.
#[must_use]
pub(crate) fn normalize(a: GeometryId, b: GeometryId) -> (GeometryId, GeometryId) {
    if a.raw() <= b.raw() {
        (a, b)
    } else {
        (b, a)
    }
}
