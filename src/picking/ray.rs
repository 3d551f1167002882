use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, MathError, Result};
use crate::math::matrix::{invert, multiply, transform_point};
use crate::math::{normalize, Matrix4, Point2, Point3, Vector3};

/// A half-line with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Point3,
    direction: Vector3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::NonFinite`] for a NaN/inf origin or direction and
    /// [`MathError::ZeroVector`] for a zero-length direction.
    pub fn new(origin: Point3, direction: Vector3) -> Result<Self> {
        if !origin.coords.iter().all(|c| c.is_finite()) {
            return Err(MathError::NonFinite("ray origin").into());
        }
        let direction = normalize(&direction)?;
        Ok(Self { origin, direction })
    }

    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Unit direction.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }

    /// Point at distance `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

/// The canvas area, in pixels, that the camera renders into.
///
/// `(x, y)` is the top-left corner; screen `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// A viewport of the given size at the screen origin.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// The same viewport moved to `(x, y)`.
    #[must_use]
    pub fn with_offset(self, x: f64, y: f64) -> Self {
        Self { x, y, ..self }
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] unless the size is positive and
    /// every field is finite.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if finite && self.width > 0.0 && self.height > 0.0 {
            Ok(())
        } else {
            tracing::warn!(viewport = ?self, "rejected viewport");
            Err(GeometryError::InvalidInput(format!(
                "viewport {}x{} at ({}, {}) must have a finite, positive size",
                self.width, self.height, self.x, self.y
            ))
            .into())
        }
    }
}

/// Converts a pixel position to normalized device coordinates.
///
/// The viewport's top-left corner maps to `(-1, 1)` and its bottom-right corner
/// to `(1, -1)`. Positions outside the viewport map outside `[-1, 1]`.
///
/// # Errors
///
/// Returns an error if the viewport is invalid or a coordinate is NaN/inf.
pub fn screen_to_ndc(x: f64, y: f64, viewport: &Viewport) -> Result<Point2> {
    viewport.validate()?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(MathError::NonFinite("screen coordinate").into());
    }
    let ndc_x = 2.0 * (x - viewport.x) / viewport.width - 1.0;
    let ndc_y = 1.0 - 2.0 * (y - viewport.y) / viewport.height;
    Ok(Point2::new(ndc_x, ndc_y))
}

/// Converts normalized device coordinates back to a pixel position.
#[must_use]
pub fn ndc_to_screen(ndc: &Point2, viewport: &Viewport) -> Point2 {
    Point2::new(
        viewport.x + (ndc.x + 1.0) * 0.5 * viewport.width,
        viewport.y + (1.0 - ndc.y) * 0.5 * viewport.height,
    )
}

/// Projects a world-space point to its pixel position.
///
/// # Errors
///
/// Returns [`MathError::DegenerateProjection`] for points on the camera plane.
pub fn world_to_screen(
    point: &Point3,
    viewport: &Viewport,
    view: &Matrix4,
    projection: &Matrix4,
) -> Result<Point2> {
    let clip = transform_point(&multiply(projection, view), point)?;
    Ok(ndc_to_screen(&Point2::new(clip.x, clip.y), viewport))
}

/// Builds the world-space pick ray through a pixel.
///
/// The near (`z = -1`) and far (`z = 1`) NDC points under the pixel are
/// unprojected through `(projection · view)⁻¹`; the ray starts at the near
/// point and heads toward the far one.
///
/// # Errors
///
/// Returns an error for an invalid viewport, NaN input, a singular camera
/// matrix, or a pixel whose near and far points coincide.
pub fn screen_to_ray(
    x: f64,
    y: f64,
    viewport: &Viewport,
    view: &Matrix4,
    projection: &Matrix4,
) -> Result<Ray> {
    let ndc = screen_to_ndc(x, y, viewport)?;
    let inverse = invert(&multiply(projection, view))?;
    let near = transform_point(&inverse, &Point3::new(ndc.x, ndc.y, -1.0))?;
    let far = transform_point(&inverse, &Point3::new(ndc.x, ndc.y, 1.0))?;
    let ray = Ray::new(near, far - near)?;
    tracing::trace!(x, y, origin = ?ray.origin, direction = ?ray.direction, "screen ray");
    Ok(ray)
}
