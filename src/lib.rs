/*!
terracarve
==========

**terracarve** places 3D objects on a triangulated terrain and carves solid trenches into it.

- [`query`]: elevations of a terrain, read by vertical rays on a BVH of its triangles.
- [`placement`]: drops the objects of a collection onto the terrain by their lowest vertex.
- [`carving`]: thickens the terrain into a slab and subtracts a vertically extruded channel
  footprint from it.

The scalar type is [`math::Real`], `f64` for the `terracarve3d` crate and `f32` for
`terracarve3d-f32`.
*/

#![deny(non_camel_case_types)]
#![deny(non_upper_case_globals)]
#![deny(unused_parens)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::type_complexity)]

#[cfg(all(feature = "f32", feature = "f64"))]
std::compile_error!("Enable exactly one of the `f32` and `f64` features.");

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[cfg(test)]
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod carving;
pub mod partitioning;
pub mod placement;
pub mod query;
pub mod scene;
pub mod shape;
pub mod transformation;
pub mod utils;

/// Geometric types, specialized to the scalar type of the crate.
pub mod math {
    /// The scalar type of every coordinate.
    #[cfg(feature = "f64")]
    pub type Real = f64;

    /// The scalar type of every coordinate.
    #[cfg(feature = "f32")]
    pub type Real = f32;

    pub use na::{Matrix4, Point2};

    /// The smallest norm of a vector that can be normalized.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// Number of coordinates of a point.
    pub const DIM: usize = 3;

    /// A point in space.
    pub use na::Point3 as Point;

    /// A vector in space.
    pub use na::Vector3 as Vector;

    /// A rigid motion.
    pub use na::Isometry3 as Isometry;

    /// A translation.
    pub use na::Translation3 as Translation;

    /// The pose of a scene object: any invertible affine map, shears and non-uniform scaling
    /// included.
    pub use na::Affine3 as Affine;
}
