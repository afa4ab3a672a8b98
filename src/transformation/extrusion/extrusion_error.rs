use crate::math::Real;
use crate::shape::{MeshError, TopologyError};

/// Errors raised while extruding a surface into a solid.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExtrusionError {
    /// The extrusion depth is zero, negative, or not finite.
    #[error("invalid extrusion depth {0}")]
    InvalidDepth(Real),
    /// The surface has no horizontal extent or no boundary to build side walls from.
    #[error("the surface to extrude is degenerate")]
    DegenerateFootprint,
    /// The surface is not an oriented manifold, possibly with boundary.
    #[error("the surface to extrude is not manifold: {0}")]
    NonManifoldSurface(TopologyError),
    /// The surface mesh is malformed.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
