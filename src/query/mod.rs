//! Non-persistent geometric queries.
//!
//! Ray-casting is achieved by importing the [`query::RayCast`](RayCast) trait. Terrain elevation
//! queries are answered by a [`TerrainHeightQuery`] built once per terrain snapshot.

pub use self::height::{HeightQueryError, TerrainHeightQuery, TerrainHit, RAY_ORIGIN_MARGIN};
pub use self::ray::{local_ray_intersection_with_triangle, Ray, RayCast, RayIntersection};

pub mod height;
mod ray;
