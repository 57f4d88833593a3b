use glam::{Quat, Vec3};

use crate::aabb::Aabb3;
use crate::GeometryId;

/// An unstructured set of points, each its own primitive cell.
#[derive(Clone, Debug)]
pub struct PointSet {
    id: GeometryId,
    points: Vec<Vec3>,
}

impl PointSet {
    #[must_use]
    pub fn new(id: GeometryId, points: Vec<Vec3>) -> Self {
        Self { id, points }
    }

    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}

/// A triangle-indexed surface mesh.
#[derive(Clone, Debug)]
pub struct SurfaceMesh {
    id: GeometryId,
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl SurfaceMesh {
    #[must_use]
    pub fn new(id: GeometryId, vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            id,
            vertices,
            triangles,
        }
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[must_use]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    #[must_use]
    pub fn triangle_corners(&self, local_idx: u32) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[local_idx as usize];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }
}

/// A tetrahedron-indexed volume mesh.
#[derive(Clone, Debug)]
pub struct TetMesh {
    id: GeometryId,
    vertices: Vec<Vec3>,
    tets: Vec<[u32; 4]>,
}

impl TetMesh {
    #[must_use]
    pub fn new(id: GeometryId, vertices: Vec<Vec3>, tets: Vec<[u32; 4]>) -> Self {
        Self { id, vertices, tets }
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[must_use]
    pub fn tets(&self) -> &[[u32; 4]] {
        &self.tets
    }

    #[must_use]
    pub fn tet_corners(&self, local_idx: u32) -> [Vec3; 4] {
        let [a, b, c, d] = self.tets[local_idx as usize];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
            self.vertices[d as usize],
        ]
    }
}

/// An infinite plane, given by a point on the plane and a unit normal.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    id: GeometryId,
    pub center: Vec3,
    pub normal: Vec3,
}

impl Plane {
    #[must_use]
    pub fn new(id: GeometryId, center: Vec3, normal: Vec3) -> Self {
        Self {
            id,
            center,
            normal: normal.normalize_or_zero(),
        }
    }

    #[must_use]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        (p - self.center).dot(self.normal)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    id: GeometryId,
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    #[must_use]
    pub fn new(id: GeometryId, center: Vec3, radius: f32) -> Self {
        Self { id, center, radius }
    }
}

/// A capsule: a line segment swept by a radius.
#[derive(Clone, Copy, Debug)]
pub struct Capsule {
    id: GeometryId,
    pub segment_a: Vec3,
    pub segment_b: Vec3,
    pub radius: f32,
}

impl Capsule {
    #[must_use]
    pub fn new(id: GeometryId, segment_a: Vec3, segment_b: Vec3, radius: f32) -> Self {
        Self {
            id,
            segment_a,
            segment_b,
            radius,
        }
    }
}

/// An infinite cylinder (end caps out of scope, matching spec.md §4.4).
#[derive(Clone, Copy, Debug)]
pub struct Cylinder {
    id: GeometryId,
    pub axis_point: Vec3,
    pub axis_dir: Vec3,
    pub radius: f32,
}

impl Cylinder {
    #[must_use]
    pub fn new(id: GeometryId, axis_point: Vec3, axis_dir: Vec3, radius: f32) -> Self {
        Self {
            id,
            axis_point,
            axis_dir: axis_dir.normalize_or_zero(),
            radius,
        }
    }

    /// Point on the axis nearest to `p`.
    #[must_use]
    pub fn project_onto_axis(&self, p: Vec3) -> Vec3 {
        let t = (p - self.axis_point).dot(self.axis_dir);
        self.axis_point + self.axis_dir * t
    }
}

#[derive(Clone, Copy, Debug)]
pub struct OrientedBox {
    id: GeometryId,
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

impl OrientedBox {
    #[must_use]
    pub fn new(id: GeometryId, center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self {
            id,
            center,
            half_extents,
            rotation,
        }
    }
}

macro_rules! impl_id {
    ($($t:ty),* $(,)?) => {
        $(impl $t {
            #[must_use]
            pub fn id(&self) -> GeometryId {
                self.id
            }
        })*
    };
}

impl_id!(
    PointSet, SurfaceMesh, TetMesh, Plane, Sphere, Capsule, Cylinder, OrientedBox
);

#[must_use]
pub fn aabb_of_points(points: impl IntoIterator<Item = Vec3>) -> Aabb3 {
    Aabb3::from_points(points)
}
