use crate::shape::TopologyError;

/// Errors raised by the boolean operations on triangle meshes.
///
/// Both operands of a boolean operation must be closed and consistently oriented, see
/// [`TriMesh::check_manifold`](crate::shape::TriMesh::check_manifold).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MeshBooleanError {
    /// One of the operands is not a closed, consistently oriented mesh.
    #[error("the {operand} operand is not a closed manifold: {error}")]
    NonManifoldOperand {
        /// Which operand is invalid, `"first"` or `"second"`.
        operand: &'static str,
        /// The topology defect that was found.
        error: TopologyError,
    },
    /// A triangle crossed by the other mesh could not be re-triangulated.
    #[error("failed to re-triangulate the cut triangle {triangle}: {error:?}")]
    Triangulation {
        /// The triangle being split.
        triangle: u32,
        /// The triangulation failure.
        error: spade::InsertionError,
    },
    /// The result of the operation is not a closed, consistently oriented mesh.
    #[error("the boolean result is not a closed manifold: {0}")]
    NonManifoldResult(TopologyError),
    /// The result of the operation has no triangle.
    #[error("the boolean result is empty")]
    EmptyResult,
}
