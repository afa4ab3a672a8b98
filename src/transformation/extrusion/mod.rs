//! Vertical extrusion of open surfaces into closed solids.

pub use self::extrusion_error::ExtrusionError;
pub use self::vertical_extrusion::{extrude_footprint, extrude_vertically, thicken_downward, Prism};

mod extrusion_error;
mod vertical_extrusion;
