mod mesh;
mod revolve;
mod tank;

pub use mesh::{compute_vertex_normals, Mesh};
pub use revolve::{split_at_creases, Revolve};
pub use tank::{GenerateTankMesh, LayerMesh, LayeredMesh, SurfaceId};

use serde::{Deserialize, Serialize};

/// Parameters controlling tessellation resolution.
///
/// Out-of-range values are clamped into the bounds below rather than rejected,
/// so a caller asking for one segment still gets a valid minimal mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshParams {
    /// Segments around the tank axis.
    pub angular_segments: usize,
    /// Points along each dome meridian, apex to equator.
    pub dome_points: usize,
    /// Rings along the cylindrical section.
    pub cylinder_rings: usize,
}

impl MeshParams {
    pub const MIN_ANGULAR_SEGMENTS: usize = 3;
    pub const MAX_ANGULAR_SEGMENTS: usize = 1024;
    pub const MIN_DOME_POINTS: usize = 2;
    pub const MAX_DOME_POINTS: usize = 512;
    pub const MIN_CYLINDER_RINGS: usize = 1;
    pub const MAX_CYLINDER_RINGS: usize = 256;

    #[must_use]
    pub fn angular_segments(&self) -> usize {
        self.angular_segments
            .clamp(Self::MIN_ANGULAR_SEGMENTS, Self::MAX_ANGULAR_SEGMENTS)
    }

    #[must_use]
    pub fn dome_points(&self) -> usize {
        self.dome_points
            .clamp(Self::MIN_DOME_POINTS, Self::MAX_DOME_POINTS)
    }

    #[must_use]
    pub fn cylinder_rings(&self) -> usize {
        self.cylinder_rings
            .clamp(Self::MIN_CYLINDER_RINGS, Self::MAX_CYLINDER_RINGS)
    }
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            angular_segments: 64,
            dome_points: 32,
            cylinder_rings: 8,
        }
    }
}
