pub mod coloring;
pub mod error;
pub mod geometry;
pub mod math;
pub mod picking;
pub mod tessellation;

pub use error::{Result, TankMeshError};
