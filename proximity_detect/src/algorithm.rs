//! The closed set of algorithm tags the factory understands, stable
//! between this crate and whatever solver consumes it.

/// Names one collision-detection algorithm. This is the external interface
/// the solver matches on; the set is closed and does not grow as new
/// internal kernels are added.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AlgorithmTag {
    PointSetToSphere,
    PointSetToPlane,
    PointSetToCapsule,
    PointSetToSpherePicking,
    PointSetToSurfaceMesh,
    SurfaceMeshToSurfaceMesh,
    /// Disabled continuous-collision path; the factory reports
    /// [`crate::DetectError::Unsupported`] for this tag.
    SurfaceMeshToSurfaceMeshCCD,
    VolumeMeshToVolumeMesh,
    MeshToMeshBruteForce,
    UnidirectionalPlaneToSphere,
    BidirectionalPlaneToSphere,
    SphereToCylinder,
    SphereToSphere,
    /// Named but unimplemented, matching the original's disabled SDF path.
    SignedDistanceField,
    /// Escape hatch for solver-defined kernels; the core ships no
    /// implementation for it.
    Custom,
}

impl AlgorithmTag {
    /// `true` for the two tags whose detection is driven by the shared
    /// octree's broad-phase pass rather than a direct kernel call.
    #[must_use]
    pub const fn is_octree_routed(self) -> bool {
        matches!(self, Self::PointSetToSurfaceMesh | Self::SurfaceMeshToSurfaceMesh)
    }
}
