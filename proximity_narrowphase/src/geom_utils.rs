//! Small geometric helpers shared across kernels: segment-vs-triangle
//! intersection, closest point on a triangle, closest point on a segment,
//! and tetrahedron barycentric weights. These are pure functions with no
//! dependency on the geometry contract so they are easy to unit test in
//! isolation.

use glam::Vec3;

const EPS: f32 = 1e-8;

/// Möller-Trumbore segment/triangle intersection test, used by
/// triangle-triangle's edge/face crossing count.
#[must_use]
pub fn segment_intersects_triangle(p0: Vec3, p1: Vec3, a: Vec3, b: Vec3, c: Vec3) -> bool {
    let dir = p1 - p0;
    let edge1 = b - a;
    let edge2 = c - a;
    let pvec = dir.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < EPS {
        return false;
    }
    let inv_det = 1.0 / det;
    let tvec = p0 - a;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let qvec = tvec.cross(edge1);
    let v = dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return false;
    }
    let t = edge2.dot(qvec) * inv_det;
    (0.0..=1.0).contains(&t)
}

/// Closest distance from `p` to the triangle `(a, b, c)`, clamped to the
/// triangle's surface (not its infinite plane).
#[must_use]
pub fn point_triangle_closest_distance(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (p - closest_point_on_triangle(p, a, b, c)).length()
}

/// Closest point to `p` on the triangle `(a, b, c)`. Standard
/// Ericson-style region test against the triangle's Voronoi regions.
#[must_use]
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Closest point to `p` on the segment `[a, b]`.
#[must_use]
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < EPS {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Barycentric weights of `p` with respect to the tetrahedron
/// `(a, b, c, d)`, such that `p == w[0]*a + w[1]*b + w[2]*c + w[3]*d` and
/// `w.sum() == 1` for a non-degenerate tetrahedron.
#[must_use]
pub fn tetrahedron_barycentric_weights(p: Vec3, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Option<[f32; 4]> {
    let vap = p - a;
    let vbp = p - b;

    let vab = b - a;
    let vac = c - a;
    let vad = d - a;

    let vbc = c - b;
    let vbd = d - b;

    let va6 = vbp.cross(vbd).dot(vbc);
    let vb6 = vap.cross(vac).dot(vad);
    let vc6 = vap.cross(vad).dot(vab);
    let vd6 = vap.cross(vab).dot(vac);
    let v6 = vab.cross(vac).dot(vad);

    if v6.abs() < EPS {
        return None;
    }
    let inv = 1.0 / v6;
    Some([va6 * inv, vb6 * inv, vc6 * inv, vd6 * inv])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_point_on_triangle_is_a_vertex_outside_all_edges() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        let c = Vec3::Y;
        let p = Vec3::new(-1.0, -1.0, 0.0);
        assert_eq!(closest_point_on_triangle(p, a, b, c), a);
    }

    #[test]
    fn closest_point_on_triangle_interior_projects_straight_down() {
        let a = Vec3::ZERO;
        let b = Vec3::new(2.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 2.0, 0.0);
        let p = Vec3::new(0.5, 0.5, 3.0);
        let cp = closest_point_on_triangle(p, a, b, c);
        assert!((cp - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn segment_crosses_triangle_plane_inside_bounds() {
        let a = Vec3::new(-1.0, -1.0, 0.0);
        let b = Vec3::new(2.0, -1.0, 0.0);
        let c = Vec3::new(-1.0, 2.0, 0.0);
        assert!(segment_intersects_triangle(
            Vec3::new(-0.2, -0.2, -1.0),
            Vec3::new(-0.2, -0.2, 1.0),
            a,
            b,
            c
        ));
        assert!(!segment_intersects_triangle(
            Vec3::new(10.0, 10.0, -1.0),
            Vec3::new(10.0, 10.0, 1.0),
            a,
            b,
            c
        ));
    }

    #[test]
    fn tetrahedron_weights_sum_to_one_for_centroid() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        let c = Vec3::Y;
        let d = Vec3::Z;
        let centroid = (a + b + c + d) / 4.0;
        let w = tetrahedron_barycentric_weights(centroid, a, b, c, d).unwrap();
        assert!((w.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(w.iter().all(|&x| (x - 0.25).abs() < 1e-5));
    }
}
