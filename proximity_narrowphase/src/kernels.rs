//! Per-pair narrow-phase kernels: exact geometric predicates and
//! penetration computations. Each kernel appends directly into the pair's
//! [`CollisionData`]; none of them allocate beyond what the append itself
//! needs, so many of these can run concurrently across worker threads.

use glam::Vec3;
use proximity_data::{
    CollisionData, EdgeEdgeElement, PointDirectionElement, PointIndexDirectionElement, PointTetrahedronCollisionType,
    PointTetrahedronElement, VertexTriangleElement,
};
use proximity_geometry::{Capsule, Cylinder, Geometry, Plane, Sphere};

use crate::geom_utils::{
    closest_point_on_segment, point_triangle_closest_distance, segment_intersects_triangle,
    tetrahedron_barycentric_weights,
};
use crate::NarrowPhaseKernel;

const DEGENERATE_EPS: f32 = 1e-8;

/// Uniform result of a kernel invocation: whether a contact was appended,
/// none was found, or the primitive was too degenerate to evaluate (zero
/// area, coincident centers, zero-length normal) — silently skipped per
/// spec.md's error-handling design.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KernelOutcome {
    Contact,
    NoContact,
    Degenerate,
}

/// Plane center `C`, unit normal `n`, sphere center `S`, radius `r`.
/// Contact is symmetric around the plane: whichever side `S` sits on gets
/// a contact pushed back to the plane's surface.
pub fn bidirectional_plane_to_sphere(plane: &Plane, sphere: &Sphere, out: &CollisionData) -> KernelOutcome {
    if plane.normal.length_squared() < DEGENERATE_EPS {
        return KernelOutcome::Degenerate;
    }
    let d = (sphere.center - plane.center).dot(plane.normal);
    let depth = sphere.radius - d.abs();
    if depth <= 0.0 {
        return KernelOutcome::NoContact;
    }
    let dir = if d < 0.0 { -plane.normal } else { plane.normal };
    let plane_pt = sphere.center - dir * d.abs();
    let sphere_pt = sphere.center - dir * sphere.radius;
    out.append_a(PointDirectionElement {
        point: plane_pt,
        direction: dir,
        depth,
    });
    out.append_b(PointDirectionElement {
        point: sphere_pt,
        direction: -dir,
        depth,
    });
    KernelOutcome::Contact
}

/// Half-space variant: signed distance `d` is measured along the normal
/// only, never folded to `|d|` the way [`bidirectional_plane_to_sphere`]
/// does it. There is no separate guard rejecting `d < 0` — a sphere deep
/// on the back side still satisfies `radius - d > 0` and reports contact,
/// matching the reference `imstkUnidirectionalPlaneToSphereCD`.
pub fn unidirectional_plane_to_sphere(plane: &Plane, sphere: &Sphere, out: &CollisionData) -> KernelOutcome {
    if plane.normal.length_squared() < DEGENERATE_EPS {
        return KernelOutcome::Degenerate;
    }
    let d = (sphere.center - plane.center).dot(plane.normal);
    let depth = sphere.radius - d;
    if depth <= 0.0 {
        return KernelOutcome::NoContact;
    }
    let plane_pt = sphere.center - plane.normal * d;
    let sphere_pt = sphere.center - plane.normal * sphere.radius;
    out.append_a(PointDirectionElement {
        point: plane_pt,
        direction: plane.normal,
        depth,
    });
    out.append_b(PointDirectionElement {
        point: sphere_pt,
        direction: -plane.normal,
        depth,
    });
    KernelOutcome::Contact
}

pub fn sphere_to_sphere(a: &Sphere, b: &Sphere, out: &CollisionData) -> KernelOutcome {
    let delta = b.center - a.center;
    let dist = delta.length();
    let depth = a.radius + b.radius - dist;
    if depth <= 0.0 {
        return KernelOutcome::NoContact;
    }
    if dist < DEGENERATE_EPS {
        return KernelOutcome::Degenerate;
    }
    let dir = delta / dist;
    out.append_a(PointDirectionElement {
        point: a.center + dir * a.radius,
        direction: dir,
        depth,
    });
    out.append_b(PointDirectionElement {
        point: b.center - dir * b.radius,
        direction: -dir,
        depth,
    });
    KernelOutcome::Contact
}

/// Infinite-cylinder variant (end caps are out of scope). `sphere` is the
/// first argument and `cylinder` the second, matching the rest of the
/// analytical-vs-analytical kernels — see `proximity_detect`'s factory for
/// the one tag (`SphereToCylinder`) that swaps this argument order at the
/// façade boundary.
pub fn sphere_to_cylinder(sphere: &Sphere, cylinder: &Cylinder, out: &CollisionData) -> KernelOutcome {
    let axis_pt = cylinder.project_onto_axis(sphere.center);
    let dist_vec = sphere.center - axis_pt;
    let dist = dist_vec.length();
    if dist < DEGENERATE_EPS {
        return KernelOutcome::Degenerate;
    }
    let normal = -dist_vec / dist;
    let depth = -(dist - sphere.radius - cylinder.radius);
    if depth <= 0.0 {
        return KernelOutcome::NoContact;
    }
    let sphere_pt = sphere.center + sphere.radius * normal;
    let cylinder_pt = axis_pt - normal * cylinder.radius;
    out.append_a(PointDirectionElement {
        point: sphere_pt,
        direction: normal,
        depth,
    });
    out.append_b(PointDirectionElement {
        point: cylinder_pt,
        direction: -normal,
        depth,
    });
    KernelOutcome::Contact
}

/// [`NarrowPhaseKernel`] wrapper around [`bidirectional_plane_to_sphere`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BidirectionalPlaneSphereKernel;

impl NarrowPhaseKernel for BidirectionalPlaneSphereKernel {
    fn test(&self, a: &Geometry, b: &Geometry, out: &CollisionData) -> KernelOutcome {
        match (a, b) {
            (Geometry::Plane(plane), Geometry::Sphere(sphere)) => bidirectional_plane_to_sphere(plane, sphere, out),
            _ => KernelOutcome::Degenerate,
        }
    }
}

/// [`NarrowPhaseKernel`] wrapper around [`unidirectional_plane_to_sphere`].
#[derive(Clone, Copy, Debug, Default)]
pub struct UnidirectionalPlaneSphereKernel;

impl NarrowPhaseKernel for UnidirectionalPlaneSphereKernel {
    fn test(&self, a: &Geometry, b: &Geometry, out: &CollisionData) -> KernelOutcome {
        match (a, b) {
            (Geometry::Plane(plane), Geometry::Sphere(sphere)) => unidirectional_plane_to_sphere(plane, sphere, out),
            _ => KernelOutcome::Degenerate,
        }
    }
}

/// [`NarrowPhaseKernel`] wrapper around [`sphere_to_sphere`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SphereSphereKernel;

impl NarrowPhaseKernel for SphereSphereKernel {
    fn test(&self, a: &Geometry, b: &Geometry, out: &CollisionData) -> KernelOutcome {
        match (a, b) {
            (Geometry::Sphere(a), Geometry::Sphere(b)) => sphere_to_sphere(a, b, out),
            _ => KernelOutcome::Degenerate,
        }
    }
}

/// [`NarrowPhaseKernel`] wrapper around [`sphere_to_cylinder`]. Expects
/// `a` to be the sphere and `b` the cylinder, matching the free function's
/// own argument order rather than the façade factory's swapped one.
#[derive(Clone, Copy, Debug, Default)]
pub struct SphereCylinderKernel;

impl NarrowPhaseKernel for SphereCylinderKernel {
    fn test(&self, a: &Geometry, b: &Geometry, out: &CollisionData) -> KernelOutcome {
        match (a, b) {
            (Geometry::Sphere(sphere), Geometry::Cylinder(cylinder)) => sphere_to_cylinder(sphere, cylinder, out),
            _ => KernelOutcome::Degenerate,
        }
    }
}

pub fn point_to_capsule(point: Vec3, point_idx: u32, capsule: &Capsule, out: &CollisionData) -> KernelOutcome {
    let closest = closest_point_on_segment(point, capsule.segment_a, capsule.segment_b);
    let dist = (closest - point).length();
    if dist >= capsule.radius {
        return KernelOutcome::NoContact;
    }
    if dist < DEGENERATE_EPS {
        return KernelOutcome::Degenerate;
    }
    let direction = (closest - point) / dist;
    let surface = closest - capsule.radius * direction;
    out.append_a(PointIndexDirectionElement {
        vertex_index: point_idx,
        direction,
        depth: (point - surface).length(),
    });
    KernelOutcome::Contact
}

pub fn point_to_plane(point: Vec3, point_idx: u32, plane: &Plane, out: &CollisionData) -> KernelOutcome {
    if plane.normal.length_squared() < DEGENERATE_EPS {
        return KernelOutcome::Degenerate;
    }
    let penetration = (point - plane.center).dot(plane.normal);
    if penetration >= 0.0 {
        return KernelOutcome::NoContact;
    }
    out.append_a(PointIndexDirectionElement {
        vertex_index: point_idx,
        direction: plane.normal,
        depth: -penetration,
    });
    KernelOutcome::Contact
}

pub fn point_to_sphere(point: Vec3, point_idx: u32, sphere: &Sphere, out: &CollisionData) -> KernelOutcome {
    let delta = sphere.center - point;
    let dist_sq = delta.length_squared();
    if dist_sq >= sphere.radius * sphere.radius {
        return KernelOutcome::NoContact;
    }
    let dist = dist_sq.sqrt();
    let direction = if dist_sq > 1e-12 { delta / dist } else { Vec3::ZERO };
    let point_on_sphere = sphere.center - sphere.radius * direction;
    let penetration_dir = point - point_on_sphere;
    out.append_a(PointIndexDirectionElement {
        vertex_index: point_idx,
        direction: penetration_dir.normalize_or_zero(),
        depth: penetration_dir.length(),
    });
    KernelOutcome::Contact
}

/// Picking variant: always reports a contact displacement toward the
/// sphere's *center* rather than clamping to the surface, for
/// selection/picking rather than physical response.
pub fn point_to_sphere_picking(point: Vec3, point_idx: u32, sphere: &Sphere, out: &CollisionData) -> KernelOutcome {
    let delta = sphere.center - point;
    if delta.length_squared() >= sphere.radius * sphere.radius {
        return KernelOutcome::NoContact;
    }
    let depth = delta.length();
    out.append_a(PointIndexDirectionElement {
        vertex_index: point_idx,
        direction: delta.normalize_or_zero(),
        depth,
    });
    KernelOutcome::Contact
}

/// Outcome of the point-vs-triangle predicate: `Outside` is not a failure,
/// it is the signal the broad-phase driver uses to invalidate every
/// contact previously recorded for this (point, mesh) pair this step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointTriangleOutcome {
    Inside,
    Outside,
    Degenerate,
}

/// `P` is declared outside when it lies on the outward side of the
/// triangle's plane (`(P-A)·n > 0`); otherwise the vertex-triangle element
/// is appended with the clamped closest distance.
pub fn point_to_triangle(
    point: Vec3,
    point_idx: u32,
    triangle_idx: u32,
    triangle: [Vec3; 3],
    out: &CollisionData,
) -> PointTriangleOutcome {
    let [a, b, c] = triangle;
    let normal = (b - a).cross(c - a);
    if normal.length_squared() < DEGENERATE_EPS {
        return PointTriangleOutcome::Degenerate;
    }
    if (point - a).dot(normal) > 0.0 {
        return PointTriangleOutcome::Outside;
    }
    let closest_distance = point_triangle_closest_distance(point, a, b, c);
    out.vt_safe_append(VertexTriangleElement {
        vertex_idx: point_idx,
        triangle_idx,
        closest_distance,
    });
    PointTriangleOutcome::Inside
}

/// Edge/face crossing count between two triangles: 0 = no contact,
/// 2 = one vertex of triangle 1 penetrates triangle 2 (vertex-triangle),
/// 1 = one edge of triangle 1 crosses triangle 2 and is matched against
/// the symmetric crossing edge of triangle 2 (edge-edge); 3 or numeric
/// jitter that leaves the symmetric edge unfound are silently dropped.
#[allow(clippy::too_many_arguments, reason = "mirrors the original's flat argument list for the two triangles")]
pub fn triangle_to_triangle(
    tri1_face: [u32; 3],
    tri1_verts: [Vec3; 3],
    tri2_idx: u32,
    tri2_face: [u32; 3],
    tri2_verts: [Vec3; 3],
    out: &CollisionData,
) -> KernelOutcome {
    let tri1_edges = [
        (tri1_verts[0], tri1_verts[1]),
        (tri1_verts[0], tri1_verts[2]),
        (tri1_verts[1], tri1_verts[2]),
    ];
    let intersected: [bool; 3] = std::array::from_fn(|i| {
        segment_intersects_triangle(tri1_edges[i].0, tri1_edges[i].1, tri2_verts[0], tri2_verts[1], tri2_verts[2])
    });
    let count = intersected.iter().filter(|&&b| b).count();

    match count {
        0 => KernelOutcome::NoContact,
        2 => {
            let vertex_idx = if intersected[0] {
                if intersected[1] { tri1_face[0] } else { tri1_face[1] }
            } else {
                tri1_face[2]
            };
            out.vt_safe_append(VertexTriangleElement {
                vertex_idx,
                triangle_idx: tri2_idx,
                closest_distance: 0.0,
            });
            KernelOutcome::Contact
        }
        1 => {
            let edge_a = if intersected[0] {
                (tri1_face[0], tri1_face[1])
            } else if intersected[1] {
                (tri1_face[0], tri1_face[2])
            } else {
                (tri1_face[1], tri1_face[2])
            };

            let tri2_edges = [
                (tri2_verts[0], tri2_verts[1]),
                (tri2_verts[0], tri2_verts[2]),
                (tri2_verts[1], tri2_verts[2]),
            ];
            let edge_b = (0..3).find_map(|i| {
                segment_intersects_triangle(
                    tri2_edges[i].0,
                    tri2_edges[i].1,
                    tri1_verts[0],
                    tri1_verts[1],
                    tri1_verts[2],
                )
                .then(|| match i {
                    0 => (tri2_face[0], tri2_face[1]),
                    1 => (tri2_face[0], tri2_face[2]),
                    _ => (tri2_face[1], tri2_face[2]),
                })
            });

            match edge_b {
                Some(edge_b) => {
                    out.ee_safe_append(EdgeEdgeElement { edge_a, edge_b, t: 0.0 });
                    KernelOutcome::Contact
                }
                // Numeric jitter left the symmetric edge unfound: drop silently.
                None => KernelOutcome::NoContact,
            }
        }
        _ => KernelOutcome::NoContact,
    }
}

/// Barycentric point-in-tetrahedron test used by tetra-tetra detection.
/// `vertex_owner_is_b`/`tet_owner_is_b` encode which mesh each side
/// belongs to, per [`PointTetrahedronCollisionType`].
pub fn point_to_tetrahedron(
    vertex: Vec3,
    vertex_id: u32,
    tet_id: u32,
    tet_corners: [Vec3; 4],
    vertex_owner_is_b: bool,
    tet_owner_is_b: bool,
    out: &CollisionData,
) -> KernelOutcome {
    const BARY_EPS: f32 = 1e-6;
    let [a, b, c, d] = tet_corners;
    let Some(weights) = tetrahedron_barycentric_weights(vertex, a, b, c, d) else {
        return KernelOutcome::Degenerate;
    };
    if weights.iter().any(|&w| w < -BARY_EPS) {
        return KernelOutcome::NoContact;
    }
    out.pt_safe_append(PointTetrahedronElement {
        collision_type: PointTetrahedronCollisionType::from_owners(vertex_owner_is_b, tet_owner_is_b),
        vertex_id,
        tet_id,
        weights,
    });
    KernelOutcome::Contact
}
