pub mod params;
pub mod profile;

pub use params::{BossParameters, CompositeLayer, LayerKind, TankParameters};
pub use profile::{
    mirror_profile, natural_dome_height, offset_profile, GenerateProfile, ProfilePoint,
};
