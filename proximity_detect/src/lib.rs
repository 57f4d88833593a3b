// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision-detection façade: the public entry point that ties the
//! spatial index, narrow-phase kernels and collision-data buffers together
//! behind one closed set of algorithm tags.
//!
//! Two families of detector exist behind the same [`CollisionDetector`]
//! trait. Direct detectors (`PointSetToSphere`, `SphereToSphere`,
//! `SphereToCylinder`, `VolumeMeshToVolumeMesh`, `MeshToMeshBruteForce`, the
//! plane-sphere pair) call narrow-phase kernels straight from
//! `detect_collision`, with no spatial index involved — either because
//! only one shape is a multi-cell geometry (a point set against a single
//! analytical shape costs the same to index as to iterate directly) or
//! because the pair's own spatial structure is cheaper to rebuild per call
//! (tetra-tetra's grid). Octree-routed detectors (`PointSetToSurfaceMesh`,
//! `SurfaceMeshToSurfaceMesh`) register with [`GlobalOctreeHandle`] at
//! construction and are driven once per step by
//! [`GlobalOctreeHandle::update_internal_octree_and_detect_collision`];
//! their own `detect_collision` only reads back the buffer that call last
//! filled.
//!
//! ```no_run
//! use proximity_detect::{make_detector, AlgorithmTag, GlobalOctreeHandle};
//! use proximity_geometry::{Geometry, GeometryId, Plane, Sphere};
//! use std::sync::{Arc, RwLock};
//!
//! let plane = Arc::new(RwLock::new(Geometry::Plane(Plane::new(
//!     GeometryId::new(0), glam::Vec3::ZERO, glam::Vec3::Y,
//! ))));
//! let sphere = Arc::new(RwLock::new(Geometry::Sphere(Sphere::new(
//!     GeometryId::new(1), glam::Vec3::new(0.0, 0.5, 0.0), 1.0,
//! ))));
//! let octree = GlobalOctreeHandle::get();
//! let detector = make_detector(AlgorithmTag::BidirectionalPlaneToSphere, plane, sphere, &octree)?;
//! let contacts = detector.detect_collision();
//! # Ok::<(), proximity_detect::DetectError>(())
//! ```

mod algorithm;
mod dispatch;
mod error;
mod facade;
mod factory;
mod global;
mod pair;
mod sharded_map;

pub use algorithm::AlgorithmTag;
pub use error::DetectError;
pub use facade::{
    BruteForceMeshDetector, CollisionDetector, OctreeRoutedDetector, PlaneSphereDetector, PointSetAnalyticalDetector,
    SphereCylinderDetector, SphereSphereDetector, TetraTetraDetector,
};
pub use factory::make as make_detector;
pub use global::GlobalOctreeHandle;
