use crate::shape::MeshError;

/// Errors raised while indexing a terrain for height queries.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HeightQueryError {
    /// The terrain mesh has no triangle to query.
    #[error("the terrain mesh has no triangle")]
    EmptyTerrain,
    /// The terrain mesh is malformed.
    #[error("invalid terrain mesh: {0}")]
    Mesh(#[from] MeshError),
}
