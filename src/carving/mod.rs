//! Carving channels into a terrain with solid boolean operations.

pub use self::carve_error::CarveError;
pub use self::volumetric_carver::{
    build_cutter, carve_channel, subtract_solids, thicken_terrain, CarveConfig, CarveReport,
};

mod carve_error;
mod volumetric_carver;
