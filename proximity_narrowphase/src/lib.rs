// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Narrow-phase kernels: pure geometric predicates and penetration
//! computations for every supported primitive pair, plus the small shared
//! helpers (segment/triangle intersection, closest-point, barycentric
//! weights) the kernels build on.
//!
//! Every kernel in [`kernels`] is a free function that takes the geometry
//! it needs plus a [`proximity_data::CollisionData`] to append into — this
//! crate never owns a collision-data buffer, only writes through one.

pub mod geom_utils;
pub mod kernels;

use proximity_data::CollisionData;
use proximity_geometry::Geometry;

pub use kernels::KernelOutcome;
pub use kernels::{BidirectionalPlaneSphereKernel, SphereCylinderKernel, SphereSphereKernel, UnidirectionalPlaneSphereKernel};

/// A single-method dispatch contract generalizing the per-pair narrow-phase
/// functions in [`kernels`] into a small trait object table, the way
/// `understory_precise_hit::PreciseHitTest` generalizes its own per-shape
/// hit-test functions behind one method. The free functions in [`kernels`]
/// remain the primary API for callers that already know which kernel they
/// need; this trait is for callers (the façade's Direct-family detectors)
/// that want to hold a `Box<dyn NarrowPhaseKernel>` chosen once at
/// construction instead of branching on a stored flag at every
/// `detect_collision` call.
pub trait NarrowPhaseKernel: Send + Sync + std::fmt::Debug {
    /// Runs this kernel against geometries `a` and `b`, appending any
    /// contact found to `out`. Implementations resolve which side of `out`
    /// (A or B) each geometry maps to themselves, and return
    /// [`KernelOutcome::Degenerate`] if `a`/`b` are not the pair of variants
    /// they expect.
    fn test(&self, a: &Geometry, b: &Geometry, out: &CollisionData) -> KernelOutcome;
}
