use thiserror::Error;

/// Top-level error type for tank mesh generation, colouring and picking.
#[derive(Debug, Error)]
pub enum TankMeshError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Color(#[from] ColorError),
}

/// Out-of-domain tank geometry input.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid geometry input: {0}")]
    InvalidInput(String),
}

/// Numeric degeneracies that have no sensible empty answer.
#[derive(Debug, Error)]
pub enum MathError {
    #[error("matrix is not invertible (determinant = {determinant})")]
    SingularMatrix { determinant: f64 },

    #[error("zero-length vector")]
    ZeroVector,

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("point unprojects to infinity (w = 0)")]
    DegenerateProjection,
}

/// Malformed mesh buffers.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("{normals} normals for {positions} positions")]
    NormalCountMismatch { positions: usize, normals: usize },

    #[error("triangle {triangle} references vertex {index}, but there are only {vertex_count}")]
    IndexOutOfBounds {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("non-finite {buffer} value at vertex {index}")]
    NonFinite { buffer: &'static str, index: usize },

    #[error("normal at vertex {index} has length {length}, expected 1")]
    NonUnitNormal { index: usize, length: f64 },
}

/// Errors raised at the colouring boundary.
#[derive(Debug, Error)]
pub enum ColorError {
    #[error("unknown colormap: {0:?}")]
    UnknownColormap(String),

    #[error("stress field has {actual} values, mesh has {expected} vertices")]
    StressCountMismatch { expected: usize, actual: usize },

    #[error("non-finite stress value at index {index}")]
    NonFiniteStress { index: usize },

    #[error("stress field is empty")]
    EmptyStressField,

    #[error("invalid stress range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },
}

/// Convenience type alias for results using [`TankMeshError`].
pub type Result<T> = std::result::Result<T, TankMeshError>;
