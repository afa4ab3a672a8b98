pub use self::mesh_boolean::subtract_meshes;
pub use self::mesh_boolean_error::MeshBooleanError;

use crate::math::Real;

mod mesh_boolean;
mod mesh_boolean_error;
mod triangle_triangle_intersection;

/// Tolerance of the boolean operations, relative to the size of the operands.
const EPS: Real = 1.0e-6;
