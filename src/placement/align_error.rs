use crate::query::HeightQueryError;

/// Errors preventing an alignment from running. Nothing is moved when one is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// No object has the terrain's name.
    #[error("terrain object `{0}` not found")]
    TerrainNotFound(String),
    /// No collection has the given name.
    #[error("collection `{0}` not found")]
    CollectionNotFound(String),
    /// The collection exists but holds no object.
    #[error("collection `{0}` is empty")]
    EmptyCollection(String),
    /// The terrain cannot be queried.
    #[error("invalid terrain: {0}")]
    Terrain(#[from] HeightQueryError),
}
