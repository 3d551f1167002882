mod colormap;
mod nearest;
mod stress;

pub use colormap::{ColorStop, Colormap, ColormapName, Rgb, StressRange};
pub use stress::{ApplyStressColors, ColorOptions, ColoredMesh, FeaNode, StressField};
