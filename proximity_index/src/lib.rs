// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The loose octree spatial index: primitive descriptors, a pooled
//! generational node arena, and the octree itself (bulk build, incremental
//! update, top-down insertion).
//!
//! This crate owns only the spatial structure. Candidate-pair enumeration
//! lives in `proximity_broadphase`, which walks the trees this crate
//! builds through [`octree::LooseOctree::candidates_for_point`] and
//! [`octree::LooseOctree::candidates_for_aabb`].

pub mod arena;
pub mod octree;
pub mod pool;
pub mod primitive;

pub use arena::NodeId;
pub use octree::{LooseOctree, OctreeConfig, SharedGeometry};
pub use pool::NodePool;
pub use primitive::{PrimitiveArena, PrimitiveCache, PrimitiveDescriptor, PrimitiveId};
