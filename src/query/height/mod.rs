//! Elevation queries on triangulated terrain surfaces.

pub use self::height_query_error::HeightQueryError;
pub use self::terrain_height_query::{TerrainHeightQuery, TerrainHit, RAY_ORIGIN_MARGIN};

mod height_query_error;
mod terrain_height_query;
