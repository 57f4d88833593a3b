// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The collision-data model: a typed element taxonomy and the append-safe
//! buffer the broad/narrow phase pipeline writes into and the solver reads
//! from.
//!
//! A [`CollisionData`] is owned per registered collision pair. It is
//! cleared at the start of each detect call and is safe to append to from
//! multiple narrow-phase dispatches running concurrently (see the
//! workspace's concurrency model).

pub mod buffer;
pub mod element;

pub use buffer::{ordered_bits, CollisionData};
pub use element::{
    CellIndexElement, CellReference, CellType, CellVertexElement, CollisionElement, EdgeEdgeElement,
    LegacyElement, PointDirectionElement, PointIndexDirectionElement, PointTetrahedronCollisionType,
    PointTetrahedronElement, VertexTriangleElement,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_tetrahedron_collision_type_bits_round_trip() {
        for (vb, tb) in [(false, false), (true, false), (false, true), (true, true)] {
            let ty = PointTetrahedronCollisionType::from_owners(vb, tb);
            assert_eq!(ty.vertex_owner_is_b(), vb);
            assert_eq!(ty.tet_owner_is_b(), tb);
        }
    }
}
