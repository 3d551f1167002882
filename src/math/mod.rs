pub mod bounds;
pub mod intersect_3d;
pub mod matrix;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Homogeneous 4D vector type.
pub type Vector4 = nalgebra::Vector4<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Normalizes `v`, failing on zero or non-finite length.
///
/// # Errors
///
/// Returns [`MathError::ZeroVector`](crate::error::MathError::ZeroVector) if the
/// vector is shorter than [`TOLERANCE`], or `NonFinite` if any component is NaN/inf.
pub fn normalize(v: &Vector3) -> crate::Result<Vector3> {
    if !v.iter().all(|c| c.is_finite()) {
        return Err(crate::error::MathError::NonFinite("vector").into());
    }
    let len = v.norm();
    if len < TOLERANCE {
        return Err(crate::error::MathError::ZeroVector.into());
    }
    Ok(v / len)
}
