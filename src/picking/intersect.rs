use std::ops::Range;

use crate::math::bounds::BoundingSphere;
use crate::math::intersect_3d::ray_triangle_intersect;
use crate::math::{Point3, TOLERANCE};
use crate::tessellation::{LayeredMesh, Mesh, SurfaceId};

use super::Ray;

/// Triangles per bounding sphere in a [`MeshPicker`].
const CHUNK_SIZE: usize = 256;

/// The nearest point where a ray meets a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Point3,
    /// Distance from the ray origin.
    pub distance: f64,
    /// Index of the hit triangle in the mesh's index buffer.
    pub triangle: usize,
    /// Barycentric `(u, v)` of the hit, weights of the triangle's second and third corner.
    pub barycentric: (f64, f64),
}

impl Intersection {
    /// Barycentric weights of the three triangle corners, summing to 1.
    #[must_use]
    pub fn weights(&self) -> [f64; 3] {
        let (u, v) = self.barycentric;
        [1.0 - u - v, u, v]
    }
}

/// A hit on one surface of a [`LayeredMesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub surface: SurfaceId,
    pub hit: Intersection,
}

/// Finds the nearest triangle of a mesh along a ray.
pub struct IntersectMesh<'a> {
    ray: &'a Ray,
}

impl<'a> IntersectMesh<'a> {
    /// Creates a new `IntersectMesh` operation.
    #[must_use]
    pub fn new(ray: &'a Ray) -> Self {
        Self { ray }
    }

    /// Returns the hit with the smallest positive distance, or `None` on a miss.
    ///
    /// Rays that miss the mesh's bounding sphere skip the per-triangle tests.
    /// Equidistant hits resolve to the lowest triangle index.
    #[must_use]
    pub fn execute(&self, mesh: &Mesh) -> Option<Intersection> {
        let sphere = mesh.bounding_sphere()?;
        if !sphere.intersects_ray(self.ray.origin(), self.ray.direction()) {
            return None;
        }
        let hit = nearest_hit(self.ray, mesh, 0..mesh.triangle_count(), None);
        if let Some(hit) = &hit {
            tracing::trace!(triangle = hit.triangle, distance = hit.distance, "ray hit");
        }
        hit
    }
}

/// Repeated picking against one mesh.
///
/// Triangles are grouped into fixed-size runs, each with its own bounding
/// sphere, so a ray only tests the runs it passes through. Results are
/// identical to [`IntersectMesh`].
#[derive(Debug, Clone)]
pub struct MeshPicker<'m> {
    mesh: &'m Mesh,
    chunks: Vec<(Range<usize>, BoundingSphere)>,
}

impl<'m> MeshPicker<'m> {
    #[must_use]
    pub fn new(mesh: &'m Mesh) -> Self {
        let positions = mesh.positions();
        let indices = mesh.indices();
        let chunks = (0..indices.len())
            .step_by(CHUNK_SIZE)
            .filter_map(|start| {
                let range = start..(start + CHUNK_SIZE).min(indices.len());
                let corners = indices[range.clone()]
                    .iter()
                    .flatten()
                    .map(|&i| &positions[i as usize]);
                BoundingSphere::from_points(corners).map(|sphere| (range, sphere))
            })
            .collect();
        Self { mesh, chunks }
    }

    #[must_use]
    pub fn mesh(&self) -> &'m Mesh {
        self.mesh
    }

    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Nearest hit along `ray`, or `None` on a miss.
    #[must_use]
    pub fn pick(&self, ray: &Ray) -> Option<Intersection> {
        let mut best: Option<Intersection> = None;
        for (range, sphere) in &self.chunks {
            if !sphere.intersects_ray(ray.origin(), ray.direction()) {
                continue;
            }
            if let Some(hit) = &best {
                // Slightly loose bound so rounding never discards a closer hit.
                let closest = (sphere.center - ray.origin()).norm() - sphere.radius * (1.0 + 1e-9);
                if closest - TOLERANCE > hit.distance {
                    continue;
                }
            }
            best = nearest_hit(ray, self.mesh, range.clone(), best);
        }
        best
    }
}

/// Nearest hit across every surface of a tank, tagged with the surface it lies on.
///
/// Equidistant hits on different surfaces resolve to the one listed first by
/// [`LayeredMesh::surfaces`].
#[must_use]
pub fn pick_layered(ray: &Ray, tank: &LayeredMesh) -> Option<SurfaceHit> {
    let hit = tank
        .surfaces()
        .filter_map(|(surface, mesh)| {
            IntersectMesh::new(ray)
                .execute(mesh)
                .map(|hit| SurfaceHit { surface, hit })
        })
        .min_by(|a, b| a.hit.distance.total_cmp(&b.hit.distance));
    if let Some(SurfaceHit { surface, hit }) = &hit {
        tracing::debug!(?surface, triangle = hit.triangle, distance = hit.distance, "picked surface");
    }
    hit
}

/// Tests `triangles` in order, keeping the first hit closer than `best`.
fn nearest_hit(
    ray: &Ray,
    mesh: &Mesh,
    triangles: Range<usize>,
    mut best: Option<Intersection>,
) -> Option<Intersection> {
    let positions = mesh.positions();
    for triangle in triangles {
        let [a, b, c] = mesh.indices()[triangle];
        let Some(hit) = ray_triangle_intersect(
            ray.origin(),
            ray.direction(),
            &positions[a as usize],
            &positions[b as usize],
            &positions[c as usize],
        ) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| hit.t < b.distance) {
            best = Some(Intersection {
                point: ray.at(hit.t),
                distance: hit.t,
                triangle,
                barycentric: (hit.u, hit.v),
            });
        }
    }
    best
}
