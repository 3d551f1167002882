use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::geometry::ProfilePoint;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{compute_vertex_normals, Mesh};

/// Meridian turns sharper than this (radians) start a new section with its own vertices.
const CREASE_ANGLE: f64 = std::f64::consts::FRAC_PI_4;

/// Revolves meridian sections 360 degrees around the `z` axis.
///
/// Each section is a polyline in the `(z, r)` half-plane, traversed so that the
/// outside of the surface lies to the left of the direction of travel (top to
/// bottom on an outer wall). Sections share no vertices, which keeps creases
/// between them sharp.
pub struct Revolve<'a> {
    sections: &'a [Vec<ProfilePoint>],
    segments: usize,
}

impl<'a> Revolve<'a> {
    /// Creates a new `Revolve` operation.
    #[must_use]
    pub fn new(sections: &'a [Vec<ProfilePoint>], segments: usize) -> Self {
        Self { sections, segments }
    }

    /// Executes the revolution.
    ///
    /// Vertices of one ring are not duplicated at the seam. Triangles collapsing
    /// onto the axis (`r = 0`) are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 3 segments are requested, a profile point
    /// is non-finite or has negative radius, or the mesh would exceed `u32` indices.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<Mesh> {
        let segments = self.segments;
        if segments < 3 {
            return Err(GeometryError::InvalidInput(format!(
                "revolve needs at least 3 segments, got {segments}"
            ))
            .into());
        }
        for p in self.sections.iter().flatten() {
            if !(p.z.is_finite() && p.r.is_finite() && p.r >= 0.0) {
                return Err(
                    GeometryError::InvalidInput(format!("invalid meridian point {p:?}")).into(),
                );
            }
        }
        let total: usize = self.sections.iter().map(|s| s.len() * segments).sum();
        if total > u32::MAX as usize {
            return Err(GeometryError::InvalidInput(format!(
                "revolved mesh would have {total} vertices"
            ))
            .into());
        }

        let ring: Vec<(f64, f64)> = (0..segments)
            .map(|j| {
                let theta = TAU * j as f64 / segments as f64;
                (theta.cos(), theta.sin())
            })
            .collect();

        let mut positions = Vec::with_capacity(total);
        let mut fallback = Vec::with_capacity(total);
        let mut indices = Vec::new();

        for section in self.sections {
            let base = positions.len();
            for (i, point) in section.iter().enumerate() {
                let (nr, nz) = meridian_normal(section, i);
                for &(c, s) in &ring {
                    positions.push(Point3::new(point.r * c, point.r * s, point.z));
                    fallback.push(Vector3::new(nr * c, nr * s, nz));
                }
            }

            for i in 0..section.len().saturating_sub(1) {
                let upper_on_axis = section[i].r < TOLERANCE;
                let lower_on_axis = section[i + 1].r < TOLERANCE;
                for j in 0..segments {
                    let jn = (j + 1) % segments;
                    let a = (base + i * segments + j) as u32;
                    let b = (base + i * segments + jn) as u32;
                    let c = (base + (i + 1) * segments + j) as u32;
                    let d = (base + (i + 1) * segments + jn) as u32;
                    if !upper_on_axis {
                        indices.push([a, c, b]);
                    }
                    if !lower_on_axis {
                        indices.push([b, c, d]);
                    }
                }
            }
        }

        let mut normals = compute_vertex_normals(&positions, &indices, |i| fallback[i]);
        // Each on-axis copy of a pole touches a single triangle; the surface
        // normal there is axial.
        for ((n, p), f) in normals.iter_mut().zip(&positions).zip(&fallback) {
            if p.x.hypot(p.y) < TOLERANCE && f.z.abs() > TOLERANCE {
                *n = Vector3::new(0.0, 0.0, f.z.signum());
            }
        }
        Ok(Mesh::from_generated(positions, normals, indices))
    }
}

/// Splits a meridian wherever consecutive segments turn by more than 45°, and
/// drops repeated points. The crease point is kept in both neighbouring sections.
#[must_use]
pub fn split_at_creases(points: &[ProfilePoint]) -> Vec<Vec<ProfilePoint>> {
    let mut deduped: Vec<ProfilePoint> = Vec::with_capacity(points.len());
    for &p in points {
        match deduped.last() {
            Some(last) if (last.z - p.z).hypot(last.r - p.r) < TOLERANCE => {}
            _ => deduped.push(p),
        }
    }

    let mut sections = Vec::new();
    let mut current: Vec<ProfilePoint> = Vec::new();
    for (i, &p) in deduped.iter().enumerate() {
        current.push(p);
        if i == 0 || i + 1 == deduped.len() {
            continue;
        }
        let prev = deduped[i - 1];
        let next = deduped[i + 1];
        let (ax, ay) = (p.r - prev.r, p.z - prev.z);
        let (bx, by) = (next.r - p.r, next.z - p.z);
        let turn = (ax * by - ay * bx).atan2(ax * bx + ay * by).abs();
        if turn > CREASE_ANGLE {
            sections.push(std::mem::take(&mut current));
            current.push(p);
        }
    }
    if !current.is_empty() {
        sections.push(current);
    }
    sections
}

/// Outward normal of the meridian at point `i`, as `(n_r, n_z)`.
///
/// For a tangent `(dr, dz)` the outside lies to the left, giving `(-dz, dr)`.
fn meridian_normal(section: &[ProfilePoint], i: usize) -> (f64, f64) {
    let prev = section[i.saturating_sub(1)];
    let next = section[(i + 1).min(section.len() - 1)];
    let (dr, dz) = (next.r - prev.r, next.z - prev.z);
    let len = dr.hypot(dz);
    if len < TOLERANCE {
        (1.0, 0.0)
    } else {
        (-dz / len, dr / len)
    }
}
