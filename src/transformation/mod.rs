//! Transformation and combination of triangle meshes.

pub use self::extrusion::{
    extrude_footprint, extrude_vertically, thicken_downward, ExtrusionError, Prism,
};
pub use self::mesh_boolean::{subtract_meshes, MeshBooleanError};

pub(crate) mod ear_clipping;
mod extrusion;
mod mesh_boolean;
