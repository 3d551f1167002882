use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::TOLERANCE;

/// Largest dome winding angle accepted, in degrees. 90° would put the polar
/// opening on the equator and leave no dome.
pub const MAX_DOME_WINDING_ANGLE: f64 = 89.999;

/// Polar boss dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossParameters {
    /// Bore diameter.
    pub inner_diameter: f64,
    /// Outer diameter of the boss neck.
    pub outer_diameter: f64,
    /// How far the boss protrudes above the dome apex.
    pub length: f64,
}

impl BossParameters {
    /// Bore radius.
    #[must_use]
    pub fn inner_radius(&self) -> f64 {
        self.inner_diameter * 0.5
    }

    /// Neck radius.
    #[must_use]
    pub fn outer_radius(&self) -> f64 {
        self.outer_diameter * 0.5
    }
}

/// Winding pattern of a composite layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Helical,
    Hoop,
}

/// One wound layer of the composite overwrap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeLayer {
    pub kind: LayerKind,
    /// Radial thickness, must be positive.
    pub thickness: f64,
    /// Fiber angle relative to the tank axis, in degrees.
    pub winding_angle: f64,
}

/// Geometry of a Type IV pressure vessel: liner, bosses and composite layers.
///
/// All lengths share one unit (the design API uses millimetres). The tank axis is
/// `z`, with the cylinder centred on the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankParameters {
    /// Liner inner wall radius.
    pub inner_radius: f64,
    /// Liner outer wall radius. The dome profile is built at this radius.
    pub outer_radius: f64,
    /// Length of the cylindrical section.
    pub cylinder_length: f64,
    /// Axial height of each dome; `0` gives a flat cap.
    pub dome_height: f64,
    pub boss: BossParameters,
    /// Geodesic winding angle on the cylinder, in degrees. Sets the dome's polar
    /// opening through the Clairaut relation.
    pub winding_angle: f64,
    /// Composite layers in deposition order, innermost first.
    #[serde(default)]
    pub layers: Vec<CompositeLayer>,
}

impl TankParameters {
    /// Checks every field before any mesh work begins.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] naming the first field that is non-finite or out
    /// of its physical range.
    pub fn validate(&self) -> Result<()> {
        let result = self.check();
        if let Err(e) = &result {
            tracing::warn!(error = %e, "rejected tank parameters");
        }
        result
    }

    fn check(&self) -> Result<()> {
        positive("outer_radius", self.outer_radius)?;
        in_range("inner_radius", self.inner_radius, TOLERANCE, self.outer_radius)?;
        if self.outer_radius - self.inner_radius < TOLERANCE {
            return Err(GeometryError::InvalidInput(format!(
                "liner inner radius {} must be smaller than outer radius {}",
                self.inner_radius, self.outer_radius
            ))
            .into());
        }
        in_range("cylinder_length", self.cylinder_length, 0.0, f64::MAX)?;
        in_range("dome_height", self.dome_height, 0.0, f64::MAX)?;

        let boss_outer = self.boss.outer_radius();
        in_range("boss.outer_diameter", self.boss.outer_diameter, 0.0, 2.0 * self.outer_radius)?;
        if boss_outer >= self.outer_radius - TOLERANCE {
            return Err(GeometryError::InvalidInput(format!(
                "boss outer radius {boss_outer} must be smaller than tank outer radius {}",
                self.outer_radius
            ))
            .into());
        }
        in_range("boss.inner_diameter", self.boss.inner_diameter, 0.0, self.boss.outer_diameter)?;
        if self.boss.outer_diameter > 0.0
            && self.boss.outer_diameter - self.boss.inner_diameter < TOLERANCE
        {
            return Err(GeometryError::InvalidInput(
                "boss bore must be narrower than the boss neck".into(),
            )
            .into());
        }
        if self.boss.inner_radius() >= self.inner_radius {
            return Err(GeometryError::InvalidInput(format!(
                "boss bore radius {} must be smaller than liner inner radius {}",
                self.boss.inner_radius(),
                self.inner_radius
            ))
            .into());
        }
        in_range("boss.length", self.boss.length, 0.0, f64::MAX)?;
        in_range("winding_angle", self.winding_angle, 0.0, MAX_DOME_WINDING_ANGLE)?;

        for layer in &self.layers {
            positive("layers.thickness", layer.thickness)?;
            in_range("layers.winding_angle", layer.winding_angle, 0.0, 90.0)?;
        }
        Ok(())
    }

    /// Radius of the dome's polar opening: the boss neck or the geodesic
    /// turnaround radius `R · sin(α)`, whichever is larger.
    #[must_use]
    pub fn polar_opening_radius(&self) -> f64 {
        let geodesic = self.outer_radius * self.winding_angle.to_radians().sin();
        geodesic.max(self.boss.outer_radius())
    }

    /// Liner wall thickness.
    #[must_use]
    pub fn wall_thickness(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    /// Total thickness of the composite overwrap.
    #[must_use]
    pub fn composite_thickness(&self) -> f64 {
        self.layers.iter().map(|l| l.thickness).sum()
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<()> {
    in_range(parameter, value, TOLERANCE, f64::MAX)
}

fn in_range(parameter: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(GeometryError::ParameterOutOfRange {
            parameter,
            value,
            min,
            max,
        }
        .into())
    }
}
