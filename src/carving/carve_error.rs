use crate::math::Real;
use crate::shape::MeshError;
use crate::transformation::{ExtrusionError, MeshBooleanError};

/// Errors aborting a carve. The scene is left untouched when one is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CarveError {
    /// A configuration value is out of its allowed range.
    #[error("parameter `{name}` = {value} is out of range [{min}, {max}]")]
    InvalidParameter {
        /// The name of the parameter.
        name: &'static str,
        /// The rejected value.
        value: Real,
        /// The smallest allowed value.
        min: Real,
        /// The largest allowed value.
        max: Real,
    },
    /// No object has the terrain's name.
    #[error("terrain object `{0}` not found")]
    TerrainNotFound(String),
    /// No object has the channel's name.
    #[error("channel object `{0}` not found")]
    ChannelNotFound(String),
    /// The top of the cutter does not rise above the terrain surface.
    #[error("the cutter top at z = {cap_z} does not clear the terrain surface at z = {terrain_z}")]
    CutterTooShort {
        /// Elevation of the lowest point of the cutter's top.
        cap_z: Real,
        /// Elevation of the terrain below that point.
        terrain_z: Real,
    },
    /// The terrain's pose cannot be inverted, so the carved mesh cannot be expressed in its
    /// local space.
    #[error("the terrain pose is not invertible")]
    SingularTerrainPose,
    /// The channel or the terrain could not be extruded.
    #[error(transparent)]
    Extrusion(#[from] ExtrusionError),
    /// The boolean difference failed.
    #[error(transparent)]
    Boolean(#[from] MeshBooleanError),
    /// The channel or the terrain mesh is malformed.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
