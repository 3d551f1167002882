use crate::error::{MeshError, Result};
use crate::math::bounds::{Aabb, BoundingSphere};
use crate::math::{Point3, Vector3, TOLERANCE};

/// A triangle mesh with one normal per vertex.
///
/// Every index is within bounds, `normals.len() == positions.len()`, every
/// normal has unit length, and no coordinate is NaN or infinite. Meshes are immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<Point3>,
    normals: Vec<Vector3>,
    indices: Vec<[u32; 3]>,
}

impl Mesh {
    /// Builds a mesh from raw buffers, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError`] if the normal count differs from the position count,
    /// an index is out of bounds, a coordinate is not finite or a normal is not unit length.
    pub fn new(
        positions: Vec<Point3>,
        normals: Vec<Vector3>,
        indices: Vec<[u32; 3]>,
    ) -> Result<Self> {
        let mesh = Self {
            positions,
            normals,
            indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Builds a mesh from positions and triangles, computing vertex normals.
    ///
    /// Vertices not used by any non-degenerate triangle get `+z` as their normal.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError`] if an index is out of bounds or a position is not finite.
    pub fn from_triangles(positions: Vec<Point3>, indices: Vec<[u32; 3]>) -> Result<Self> {
        check_indices(&indices, positions.len())?;
        check_finite("position", positions.iter().map(|p| &p.coords))?;
        let normals = compute_vertex_normals(&positions, &indices, |_| Vector3::z());
        Self::new(positions, normals, indices)
    }

    /// Wraps buffers produced by the generators, which uphold the invariants by construction.
    pub(crate) fn from_generated(
        positions: Vec<Point3>,
        normals: Vec<Vector3>,
        indices: Vec<[u32; 3]>,
    ) -> Self {
        debug_assert_eq!(positions.len(), normals.len());
        Self {
            positions,
            normals,
            indices,
        }
    }

    /// Checks all mesh invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.normals.len() != self.positions.len() {
            return Err(MeshError::NormalCountMismatch {
                positions: self.positions.len(),
                normals: self.normals.len(),
            }
            .into());
        }
        check_indices(&self.indices, self.positions.len())?;
        check_finite("position", self.positions.iter().map(|p| &p.coords))?;
        check_finite("normal", self.normals.iter())?;
        check_unit_length(&self.normals)?;
        Ok(())
    }

    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    #[must_use]
    pub fn normals(&self) -> &[Vector3] {
        &self.normals
    }

    #[must_use]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Corner positions of triangle `i`.
    #[must_use]
    pub fn triangle(&self, i: usize) -> Option<[Point3; 3]> {
        let [a, b, c] = *self.indices.get(i)?;
        Some([
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ])
    }

    /// Flat `xyz` position buffer for vertex upload.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn positions_f32(&self) -> Vec<f32> {
        self.positions
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Flat `xyz` normal buffer for vertex upload.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn normals_f32(&self) -> Vec<f32> {
        self.normals
            .iter()
            .flat_map(|n| [n.x as f32, n.y as f32, n.z as f32])
            .collect()
    }

    /// Flat index buffer, three entries per triangle.
    #[must_use]
    pub fn indices_flat(&self) -> Vec<u32> {
        self.indices.iter().flatten().copied().collect()
    }

    #[must_use]
    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points(&self.positions)
    }

    #[must_use]
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        BoundingSphere::from_points(&self.positions)
    }
}

/// Area-weighted average of adjacent face normals, normalized.
///
/// Zero-area triangles contribute nothing. A vertex whose accumulated normal is
/// (near) zero takes `fallback(vertex_index)` instead of a NaN.
pub fn compute_vertex_normals(
    positions: &[Point3],
    indices: &[[u32; 3]],
    fallback: impl Fn(usize) -> Vector3,
) -> Vec<Vector3> {
    let mut sums = vec![Vector3::zeros(); positions.len()];
    for &[a, b, c] in indices {
        let (a, b, c) = (a as usize, b as usize, c as usize);
        // Unnormalized cross product: length is twice the triangle area.
        let face = (positions[b] - positions[a]).cross(&(positions[c] - positions[a]));
        if !face.iter().all(|v| v.is_finite()) {
            continue;
        }
        sums[a] += face;
        sums[b] += face;
        sums[c] += face;
    }

    sums.into_iter()
        .enumerate()
        .map(|(i, n)| {
            let len = n.norm();
            if len > TOLERANCE * TOLERANCE && len.is_finite() {
                n / len
            } else {
                fallback(i)
            }
        })
        .collect()
}

fn check_indices(indices: &[[u32; 3]], vertex_count: usize) -> Result<()> {
    for (triangle, tri) in indices.iter().enumerate() {
        for &index in tri {
            if index as usize >= vertex_count {
                return Err(MeshError::IndexOutOfBounds {
                    triangle,
                    index,
                    vertex_count,
                }
                .into());
            }
        }
    }
    Ok(())
}

fn check_finite<'a>(
    buffer: &'static str,
    values: impl Iterator<Item = &'a Vector3>,
) -> Result<()> {
    for (index, v) in values.enumerate() {
        if !v.iter().all(|c| c.is_finite()) {
            return Err(MeshError::NonFinite { buffer, index }.into());
        }
    }
    Ok(())
}

/// Tolerance on `|n| - 1` for stored normals.
const UNIT_NORMAL_TOLERANCE: f64 = 1e-6;

fn check_unit_length(normals: &[Vector3]) -> Result<()> {
    for (index, n) in normals.iter().enumerate() {
        let length = n.norm();
        if (length - 1.0).abs() > UNIT_NORMAL_TOLERANCE {
            return Err(MeshError::NonUnitNormal { index, length }.into());
        }
    }
    Ok(())
}
