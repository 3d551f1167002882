use crate::error::{MathError, Result};

use super::{Matrix4, Point3, Vector4, TOLERANCE};

/// Determinant threshold, relative to the fourth power of the largest entry,
/// below which a matrix is treated as singular.
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Returns the product `a · b`.
#[must_use]
pub fn multiply(a: &Matrix4, b: &Matrix4) -> Matrix4 {
    a * b
}

/// Inverts a general 4x4 matrix.
///
/// The singularity test is scale-relative, so a uniformly tiny but well-conditioned
/// matrix still inverts.
///
/// # Errors
///
/// Returns [`MathError::NonFinite`] if any entry is NaN/inf and
/// [`MathError::SingularMatrix`] if the determinant is (near) zero.
pub fn invert(m: &Matrix4) -> Result<Matrix4> {
    if !m.iter().all(|v| v.is_finite()) {
        return Err(MathError::NonFinite("matrix").into());
    }

    let determinant = m.determinant();
    let scale = m.amax();
    if scale == 0.0 || determinant.abs() <= SINGULAR_TOLERANCE * scale.powi(4) {
        return Err(MathError::SingularMatrix { determinant }.into());
    }

    m.try_inverse()
        .ok_or_else(|| MathError::SingularMatrix { determinant }.into())
}

/// Transforms a point by `m` with the perspective divide.
///
/// # Errors
///
/// Returns [`MathError::DegenerateProjection`] if the resulting `w` is zero.
pub fn transform_point(m: &Matrix4, p: &Point3) -> Result<Point3> {
    let h = m * Vector4::new(p.x, p.y, p.z, 1.0);
    if h.w.abs() < TOLERANCE {
        return Err(MathError::DegenerateProjection.into());
    }
    Ok(Point3::new(h.x / h.w, h.y / h.w, h.z / h.w))
}
