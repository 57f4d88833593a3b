//! The collision-element taxonomy: a tagged union of five kinds, plus the
//! three legacy per-test structs used by their own typed sub-buffers.

use glam::Vec3;
use smallvec::SmallVec;

/// Which kind of cell a [`CellIndexElement`]/[`CellVertexElement`] describes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellType {
    Vertex,
    Edge,
    Triangle,
    Tetrahedron,
}

/// How a [`CellIndexElement`] names the offending cell: either a single
/// local index resolvable through the owning geometry, or an explicit list
/// of 2-4 vertex indices when no single local index applies.
#[derive(Clone, Debug)]
pub enum CellReference {
    Local(u32),
    Vertices(SmallVec<[u32; 4]>),
}

/// A cell identified by type and index/indices, resolved against a
/// geometry the consumer already holds a handle to.
#[derive(Clone, Debug)]
pub struct CellIndexElement {
    pub cell_type: CellType,
    pub reference: CellReference,
}

/// A cell given by 1-4 explicit world-space vertex positions (point, edge,
/// triangle, or tetrahedron) with no reference back to the owning geometry.
#[derive(Clone, Debug)]
pub struct CellVertexElement {
    pub cell_type: CellType,
    pub vertices: SmallVec<[Vec3; 4]>,
}

/// A world-space contact point, a unit contact direction, and a signed
/// penetration depth — used by the analytical-vs-analytical kernels that
/// emit a symmetric contact on each side of the pair.
#[derive(Clone, Copy, Debug)]
pub struct PointDirectionElement {
    pub point: Vec3,
    pub direction: Vec3,
    pub depth: f32,
}

/// Like [`PointDirectionElement`] but naming the offending vertex by its
/// local index on a referenced geometry rather than repeating its position.
#[derive(Clone, Copy, Debug)]
pub struct PointIndexDirectionElement {
    pub vertex_index: u32,
    pub direction: Vec3,
    pub depth: f32,
}

/// One vertex of mesh A penetrating a triangle of mesh B, with the
/// shortest distance from the vertex to the triangle's plane region.
#[derive(Clone, Copy, Debug)]
pub struct VertexTriangleElement {
    pub vertex_idx: u32,
    pub triangle_idx: u32,
    pub closest_distance: f32,
}

/// A crossing edge pair, named by their vertex-index pairs plus the
/// intersection's parametric `t` along edge A.
#[derive(Clone, Copy, Debug)]
pub struct EdgeEdgeElement {
    pub edge_a: (u32, u32),
    pub edge_b: (u32, u32),
    pub t: f32,
}

/// Which mesh owns the penetrating vertex and which owns the containing
/// tetrahedron, as a 2-bit code: bit 0 is the vertex owner (0 = mesh A,
/// 1 = mesh B), bit 1 is the tetrahedron owner (0 = mesh A, 1 = mesh B).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum PointTetrahedronCollisionType {
    /// Vertex of A found inside a tetrahedron of A (self-penetration).
    AInA = 0b00,
    /// Vertex of B found inside a tetrahedron of A.
    BInA = 0b01,
    /// Vertex of A found inside a tetrahedron of B.
    AInB = 0b10,
    /// Vertex of B found inside a tetrahedron of B (self-penetration).
    BInB = 0b11,
}

impl PointTetrahedronCollisionType {
    #[must_use]
    pub fn from_owners(vertex_owner_is_b: bool, tet_owner_is_b: bool) -> Self {
        match (tet_owner_is_b, vertex_owner_is_b) {
            (false, false) => Self::AInA,
            (false, true) => Self::BInA,
            (true, false) => Self::AInB,
            (true, true) => Self::BInB,
        }
    }

    #[must_use]
    pub const fn vertex_owner_is_b(self) -> bool {
        (self as u8) & 0b01 != 0
    }

    #[must_use]
    pub const fn tet_owner_is_b(self) -> bool {
        (self as u8) & 0b10 != 0
    }
}

/// A vertex of one tet-mesh found barycentrically inside a tetrahedron of
/// the other (or the same) tet-mesh.
#[derive(Clone, Copy, Debug)]
pub struct PointTetrahedronElement {
    pub collision_type: PointTetrahedronCollisionType,
    pub vertex_id: u32,
    pub tet_id: u32,
    pub weights: [f32; 4],
}

/// The three typed elements kept only in their own named sub-buffers
/// (`VTColData`, `EEColData`, `PTColData`) rather than in `elements_a`/`elements_b`.
#[derive(Clone, Copy, Debug)]
pub enum LegacyElement {
    VertexTriangle(VertexTriangleElement),
    EdgeEdge(EdgeEdgeElement),
    PointTetrahedron(PointTetrahedronElement),
}

/// One contact interaction, tagged by kind.
#[derive(Clone, Debug)]
pub enum CollisionElement {
    CellIndex(CellIndexElement),
    CellVertex(CellVertexElement),
    PointDirection(PointDirectionElement),
    PointIndexDirection(PointIndexDirectionElement),
    Legacy(LegacyElement),
}

impl From<PointDirectionElement> for CollisionElement {
    fn from(e: PointDirectionElement) -> Self {
        Self::PointDirection(e)
    }
}

impl From<PointIndexDirectionElement> for CollisionElement {
    fn from(e: PointIndexDirectionElement) -> Self {
        Self::PointIndexDirection(e)
    }
}
