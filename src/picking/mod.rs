//! Pointer picking: screen-to-ray conversion and ray-mesh intersection.

mod intersect;
mod ray;

pub use intersect::{pick_layered, IntersectMesh, Intersection, MeshPicker, SurfaceHit};
pub use ray::{ndc_to_screen, screen_to_ndc, screen_to_ray, world_to_screen, Ray, Viewport};
