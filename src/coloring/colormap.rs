use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ColorError, Result, TankMeshError};
use crate::math::TOLERANCE;

/// Linear RGB triple in `[0, 1]`.
pub type Rgb = [f32; 3];

/// The built-in colormaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColormapName {
    Jet,
    Viridis,
    Thermal,
    Plasma,
    Coolwarm,
}

impl ColormapName {
    pub const ALL: [Self; 5] = [
        Self::Jet,
        Self::Viridis,
        Self::Thermal,
        Self::Plasma,
        Self::Coolwarm,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jet => "jet",
            Self::Viridis => "viridis",
            Self::Thermal => "thermal",
            Self::Plasma => "plasma",
            Self::Coolwarm => "coolwarm",
        }
    }
}

impl fmt::Display for ColormapName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColormapName {
    type Err = TankMeshError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ColorError::UnknownColormap(s.to_owned()).into())
    }
}

/// A control point of a colormap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position in `[0, 1]`, strictly increasing along a map.
    pub position: f64,
    pub color: Rgb,
}

const fn stop(position: f64, r: f32, g: f32, b: f32) -> ColorStop {
    ColorStop {
        position,
        color: [r, g, b],
    }
}

const JET: [ColorStop; 6] = [
    stop(0.0, 0.0, 0.0, 0.5),
    stop(0.125, 0.0, 0.0, 1.0),
    stop(0.375, 0.0, 1.0, 1.0),
    stop(0.625, 1.0, 1.0, 0.0),
    stop(0.875, 1.0, 0.0, 0.0),
    stop(1.0, 0.5, 0.0, 0.0),
];

const VIRIDIS: [ColorStop; 5] = [
    stop(0.0, 0.267, 0.005, 0.329),
    stop(0.25, 0.231, 0.322, 0.545),
    stop(0.5, 0.128, 0.567, 0.551),
    stop(0.75, 0.369, 0.789, 0.383),
    stop(1.0, 0.993, 0.906, 0.144),
];

const THERMAL: [ColorStop; 6] = [
    stop(0.0, 0.0, 0.0, 0.0),
    stop(0.2, 0.33, 0.0, 0.5),
    stop(0.4, 0.8, 0.0, 0.2),
    stop(0.6, 1.0, 0.4, 0.0),
    stop(0.8, 1.0, 0.85, 0.0),
    stop(1.0, 1.0, 1.0, 1.0),
];

const PLASMA: [ColorStop; 5] = [
    stop(0.0, 0.051, 0.031, 0.529),
    stop(0.25, 0.494, 0.012, 0.659),
    stop(0.5, 0.798, 0.280, 0.470),
    stop(0.75, 0.973, 0.585, 0.254),
    stop(1.0, 0.940, 0.975, 0.131),
];

const COOLWARM: [ColorStop; 5] = [
    stop(0.0, 0.230, 0.299, 0.754),
    stop(0.25, 0.552, 0.690, 0.996),
    stop(0.5, 0.865, 0.865, 0.865),
    stop(0.75, 0.958, 0.604, 0.482),
    stop(1.0, 0.706, 0.016, 0.150),
];

static COLORMAPS: [Colormap; 5] = [
    Colormap {
        name: ColormapName::Jet,
        stops: &JET,
    },
    Colormap {
        name: ColormapName::Viridis,
        stops: &VIRIDIS,
    },
    Colormap {
        name: ColormapName::Thermal,
        stops: &THERMAL,
    },
    Colormap {
        name: ColormapName::Plasma,
        stops: &PLASMA,
    },
    Colormap {
        name: ColormapName::Coolwarm,
        stops: &COOLWARM,
    },
];

/// The scalar domain mapped onto a colormap. Values outside are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressRange {
    pub min: f64,
    pub max: f64,
}

impl StressRange {
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidRange`] if a bound is non-finite or `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// The tightest range containing every value.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::EmptyStressField`] for no values and
    /// [`ColorError::NonFiniteStress`] if any value is NaN/inf.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Result<Self> {
        let mut bounds: Option<(f64, f64)> = None;
        for (index, v) in values.into_iter().enumerate() {
            if !v.is_finite() {
                return Err(ColorError::NonFiniteStress { index }.into());
            }
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        let (min, max) = bounds.ok_or(ColorError::EmptyStressField)?;
        Ok(Self { min, max })
    }

    /// # Errors
    ///
    /// Returns [`ColorError::InvalidRange`] if a bound is non-finite or `min > max`.
    pub fn validate(&self) -> Result<()> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(ColorError::InvalidRange {
                min: self.min,
                max: self.max,
            }
            .into())
        }
    }

    /// Maps `value` to `[0, 1]`, clamping first. A zero-width range maps to `0.5`.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        let width = self.max - self.min;
        if width < TOLERANCE {
            return 0.5;
        }
        (value.clamp(self.min, self.max) - self.min) / width
    }
}

/// A named sequence of color stops with linear interpolation between them.
#[derive(Debug, PartialEq)]
pub struct Colormap {
    name: ColormapName,
    stops: &'static [ColorStop],
}

impl Colormap {
    /// The process-wide table entry for `name`.
    #[must_use]
    pub fn get(name: ColormapName) -> &'static Colormap {
        match name {
            ColormapName::Jet => &COLORMAPS[0],
            ColormapName::Viridis => &COLORMAPS[1],
            ColormapName::Thermal => &COLORMAPS[2],
            ColormapName::Plasma => &COLORMAPS[3],
            ColormapName::Coolwarm => &COLORMAPS[4],
        }
    }

    /// Looks a colormap up by case-insensitive name.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::UnknownColormap`] for names not in the table.
    pub fn by_name(name: &str) -> Result<&'static Colormap> {
        let name: ColormapName = name.parse()?;
        Ok(Self::get(name))
    }

    #[must_use]
    pub fn name(&self) -> ColormapName {
        self.name
    }

    #[must_use]
    pub fn stops(&self) -> &'static [ColorStop] {
        self.stops
    }

    /// Color at position `t`, clamped to `[0, 1]`. NaN maps to the first stop.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn color_at(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let stops = self.stops;
        // First stop strictly after t; exact stop positions return that stop's color.
        let upper = stops.partition_point(|s| s.position <= t);
        if upper == 0 {
            return stops[0].color;
        }
        if upper == stops.len() {
            return stops[stops.len() - 1].color;
        }
        let lo = stops[upper - 1];
        let hi = stops[upper];
        let f = ((t - lo.position) / (hi.position - lo.position)) as f32;
        [0, 1, 2].map(|c| (lo.color[c] + (hi.color[c] - lo.color[c]) * f).clamp(0.0, 1.0))
    }

    /// Color for `value` within `range`, clamping out-of-range values.
    #[must_use]
    pub fn color_for(&self, value: f64, range: &StressRange) -> Rgb {
        self.color_at(range.normalize(value))
    }
}
