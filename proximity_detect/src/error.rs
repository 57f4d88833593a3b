//! Result-based errors for caller-supplied-input failures. Programmer-error
//! invariants (pool corruption, duplicate registration) remain `panic!`/
//! `assert!` inside `proximity_index`/`proximity_broadphase`, matching the
//! split the design notes call for between invariants and recoverable
//! algorithmic failures.

use proximity_geometry::GeometryId;

use crate::algorithm::AlgorithmTag;

/// A caller-input error surfaced by façade construction or the global
/// per-step entry point. Programmer-error invariants are not part of this
/// type; they panic where they are detected.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("geometry {0:?} is not the kind this algorithm expects")]
    InvalidGeometries(GeometryId),
    #[error("algorithm {0:?} has no implementation")]
    Unsupported(AlgorithmTag),
    #[error("geometry {0:?} is missing: it was removed from the shared octree after its façade was configured")]
    MissingGeometry(GeometryId),
}
