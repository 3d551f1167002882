use serde::{Deserialize, Serialize};

use crate::error::{ColorError, Result};
use crate::math::Point3;
use crate::picking::Intersection;
use crate::tessellation::Mesh;

use super::nearest::NodeIndex;
use super::{Colormap, ColormapName, StressRange};

/// A finite-element node carrying a stress value in MPa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeaNode {
    pub position: Point3,
    pub stress: f64,
}

/// Scalar stress values to paint onto a mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "camelCase")]
pub enum StressField {
    /// One value per mesh vertex, in vertex order.
    PerVertex(Vec<f64>),
    /// Values at FEA nodes that need not coincide with mesh vertices. Each
    /// vertex takes the value of its nearest node.
    Nodal(Vec<FeaNode>),
}

impl StressField {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::PerVertex(values) => values.len(),
            Self::Nodal(nodes) => nodes.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stress value in the field, in order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        let (per_vertex, nodal) = match self {
            Self::PerVertex(values) => (Some(values.iter().copied()), None),
            Self::Nodal(nodes) => (None, Some(nodes.iter().map(|n| n.stress))),
        };
        per_vertex.into_iter().flatten().chain(nodal.into_iter().flatten())
    }

    /// The tightest range holding every value.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError`] for an empty field or a non-finite value.
    pub fn range(&self) -> Result<StressRange> {
        StressRange::of(self.values())
    }
}

/// How stresses become colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorOptions {
    /// Run the colormap from its last stop to its first.
    pub reverse: bool,
    /// Fixed domain; defaults to the field's own min and max.
    pub range: Option<StressRange>,
    /// Emit RGBA with this alpha instead of RGB. Clamped to `[0, 1]`.
    pub alpha: Option<f32>,
}

impl ColorOptions {
    /// Color components per vertex, 3 or 4.
    #[must_use]
    pub fn channels(&self) -> usize {
        if self.alpha.is_some() {
            4
        } else {
            3
        }
    }
}

/// A copy of a mesh with one color per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredMesh {
    mesh: Mesh,
    colors: Vec<f32>,
    channels: usize,
    stresses: Vec<f64>,
    range: StressRange,
    colormap: ColormapName,
}

impl ColoredMesh {
    #[must_use]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Flat color buffer, [`channels`](Self::channels) entries per vertex.
    #[must_use]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Color of vertex `i`.
    #[must_use]
    pub fn color(&self, i: usize) -> Option<&[f32]> {
        self.colors.chunks_exact(self.channels).nth(i)
    }

    /// The stress assigned to each vertex.
    #[must_use]
    pub fn stresses(&self) -> &[f64] {
        &self.stresses
    }

    /// The domain the colormap was stretched over.
    #[must_use]
    pub fn range(&self) -> StressRange {
        self.range
    }

    #[must_use]
    pub fn colormap(&self) -> ColormapName {
        self.colormap
    }

    /// Stress under a pick hit, interpolated from the hit triangle's corners.
    #[must_use]
    pub fn stress_at(&self, hit: &Intersection) -> Option<f64> {
        let corners = self.mesh.indices().get(hit.triangle)?;
        let weights = hit.weights();
        Some(
            corners
                .iter()
                .zip(weights)
                .map(|(&i, w)| self.stresses[i as usize] * w)
                .sum(),
        )
    }

    /// Splits into the mesh and its color buffer.
    #[must_use]
    pub fn into_parts(self) -> (Mesh, Vec<f32>) {
        (self.mesh, self.colors)
    }
}

/// Paints a stress field onto a mesh through a named colormap.
///
/// The input mesh is left untouched; the result owns a copy.
pub struct ApplyStressColors<'a> {
    field: &'a StressField,
    colormap: &'a str,
    options: ColorOptions,
}

impl<'a> ApplyStressColors<'a> {
    /// Creates a new `ApplyStressColors` operation.
    #[must_use]
    pub fn new(field: &'a StressField, colormap: &'a str, options: ColorOptions) -> Self {
        Self {
            field,
            colormap,
            options,
        }
    }

    /// Executes the colouring.
    ///
    /// Values outside the range are clamped to its ends.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError`] for an unknown colormap, an empty field, a
    /// non-finite value, an invalid explicit range, or a per-vertex field whose
    /// length differs from the vertex count.
    pub fn execute(&self, mesh: &Mesh) -> Result<ColoredMesh> {
        let colormap = Colormap::by_name(self.colormap).inspect_err(|_| {
            tracing::warn!(colormap = self.colormap, "unknown colormap");
        })?;

        let data_range = self.field.range()?;
        let range = match self.options.range {
            Some(range) => {
                range.validate()?;
                range
            }
            None => data_range,
        };
        let stresses = self.vertex_stresses(mesh)?;

        let channels = self.options.channels();
        let alpha = self
            .options
            .alpha
            .map(|a| if a.is_nan() { 1.0 } else { a.clamp(0.0, 1.0) });
        let mut colors = Vec::with_capacity(stresses.len() * channels);
        for &stress in &stresses {
            let mut t = range.normalize(stress);
            if self.options.reverse {
                t = 1.0 - t;
            }
            colors.extend_from_slice(&colormap.color_at(t));
            if let Some(a) = alpha {
                colors.push(a);
            }
        }

        tracing::debug!(
            colormap = %colormap.name(),
            vertices = stresses.len(),
            channels,
            min = range.min,
            max = range.max,
            "applied stress colors"
        );
        Ok(ColoredMesh {
            mesh: mesh.clone(),
            colors,
            channels,
            stresses,
            range,
            colormap: colormap.name(),
        })
    }

    fn vertex_stresses(&self, mesh: &Mesh) -> Result<Vec<f64>> {
        match self.field {
            StressField::PerVertex(values) => {
                if values.len() != mesh.vertex_count() {
                    return Err(ColorError::StressCountMismatch {
                        expected: mesh.vertex_count(),
                        actual: values.len(),
                    }
                    .into());
                }
                Ok(values.clone())
            }
            StressField::Nodal(nodes) => {
                let index = NodeIndex::build(nodes.iter().map(|n| n.position))?;
                tracing::trace!(nodes = index.len(), "built FEA node index");
                Ok(mesh
                    .positions()
                    .iter()
                    .map(|p| nodes[index.nearest(p)].stress)
                    .collect())
            }
        }
    }
}
