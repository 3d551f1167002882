use super::{Point3, Vector3, TOLERANCE};

/// Where a ray crosses a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter of the hit (distance when the direction is unit length).
    pub t: f64,
    /// Barycentric weight of the second vertex.
    pub u: f64,
    /// Barycentric weight of the third vertex.
    pub v: f64,
}

/// Ray-triangle intersection using the Möller–Trumbore algorithm.
///
/// Returns `None` when the ray is parallel to the triangle's plane, the crossing
/// lies outside the triangle, or the triangle is behind the ray origin.
/// Accepted hits satisfy `u, v ∈ [0, 1]` and `u + v ≤ 1`.
#[must_use]
pub fn ray_triangle_intersect(
    origin: &Point3,
    dir: &Vector3,
    v0: &Point3,
    v1: &Point3,
    v2: &Point3,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(&edge2);
    let det = edge1.dot(&h);

    // |det| <= |dir| |edge1| |edge2|; compare against that bound so the
    // parallel test does not depend on triangle size.
    let scale = dir.norm() * edge1.norm() * edge2.norm();
    if scale == 0.0 || det.abs() <= TOLERANCE * scale {
        // Parallel to the plane, or a zero-area triangle
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - v0;
    let u = inv_det * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = inv_det * dir.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(&q);
    if t > TOLERANCE {
        Some(TriangleHit { t, u, v })
    } else {
        None
    }
}

/// Returns `true` if the ray `origin + t * dir` (`t ≥ 0`, `dir` unit length)
/// passes through the sphere.
#[must_use]
pub fn ray_hits_sphere(origin: &Point3, dir: &Vector3, center: &Point3, radius: f64) -> bool {
    let oc = center - origin;
    let dist_sq = oc.norm_squared();
    let r_sq = radius * radius;
    if dist_sq <= r_sq {
        return true;
    }
    let t_closest = oc.dot(dir);
    if t_closest < 0.0 {
        return false;
    }
    dist_sq - t_closest * t_closest <= r_sq
}
