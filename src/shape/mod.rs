//! Meshes and primitive shapes.

pub use self::mesh::{Mesh, MeshError, Polygon};
pub use self::triangle::Triangle;
pub use self::trimesh::{TopologyError, TriMesh};

pub(crate) use self::trimesh::weld_tolerance;

mod mesh;
mod triangle;
mod trimesh;
