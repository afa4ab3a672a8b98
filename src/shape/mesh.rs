//! Polygonal meshes, as handed over by a host application.

use crate::bounding_volume::Aabb;
use crate::math::{Affine, Point, Real};
use crate::shape::TriMesh;
use crate::transformation::ear_clipping::triangulate_polygon;
use smallvec::SmallVec;

/// The vertex indices of one polygonal face, in winding order.
pub type Polygon = SmallVec<[u32; 4]>;

/// Error raised when a mesh's index buffer is inconsistent with its vertex buffer.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references the vertex {index} but the mesh only has {num_vertices} vertices")]
    InvalidIndex {
        /// The offending face.
        face: usize,
        /// The out-of-bounds vertex index.
        index: u32,
        /// The number of vertices of the mesh.
        num_vertices: usize,
    },
    /// A face has fewer than three vertices.
    #[error("face {face} has {len} vertices, at least 3 are required")]
    DegenerateFace {
        /// The offending face.
        face: usize,
        /// The number of vertices of the face.
        len: usize,
    },
    /// A triangle mesh must contain at least one triangle.
    #[error("a triangle mesh must contain at least one triangle")]
    EmptyIndices,
}

/// A polygonal mesh: a vertex buffer and faces made of three or more vertex indices.
///
/// Every face index is guaranteed to be valid within the vertex buffer.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Mesh {
    vertices: Vec<Point<Real>>,
    faces: Vec<Polygon>,
}

impl Mesh {
    /// Creates a mesh, checking that every face has at least three valid vertex indices.
    pub fn new(vertices: Vec<Point<Real>>, faces: Vec<Polygon>) -> Result<Self, MeshError> {
        for (face_id, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshError::DegenerateFace {
                    face: face_id,
                    len: face.len(),
                });
            }

            if let Some(index) = face.iter().find(|i| **i as usize >= vertices.len()) {
                return Err(MeshError::InvalidIndex {
                    face: face_id,
                    index: *index,
                    num_vertices: vertices.len(),
                });
            }
        }

        Ok(Self { vertices, faces })
    }

    /// Creates a mesh made only of triangles.
    pub fn from_triangles(
        vertices: Vec<Point<Real>>,
        triangles: &[[u32; 3]],
    ) -> Result<Self, MeshError> {
        let faces = triangles.iter().map(|t| Polygon::from_slice(t)).collect();
        Self::new(vertices, faces)
    }

    /// A mesh with a single polygonal face going through all the given points in order.
    pub fn from_polygon(vertices: Vec<Point<Real>>) -> Result<Self, MeshError> {
        let face = (0..vertices.len() as u32).collect();
        Self::new(vertices, vec![face])
    }

    /// The vertex buffer of this mesh.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// Mutable access to the vertex positions.
    ///
    /// The number of vertices cannot change, so the faces stay valid.
    #[inline]
    pub fn vertices_mut(&mut self) -> &mut [Point<Real>] {
        &mut self.vertices
    }

    /// The faces of this mesh.
    #[inline]
    pub fn faces(&self) -> &[Polygon] {
        &self.faces
    }

    /// Does this mesh have no vertex?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The bounding box of the vertices of this mesh.
    ///
    /// This is invalid (see [`Aabb::new_invalid`]) if the mesh has no vertex.
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_points_ref(&self.vertices)
    }

    /// The triangles obtained by triangulating every face of this mesh.
    ///
    /// Triangles keep the face's winding. Faces are processed in order, so triangle indices are
    /// deterministic.
    pub fn triangle_indices(&self) -> Vec<[u32; 3]> {
        let mut result = Vec::with_capacity(self.faces.len());
        let mut polygon = Vec::new();

        for face in &self.faces {
            if face.len() == 3 {
                result.push([face[0], face[1], face[2]]);
                continue;
            }

            polygon.clear();
            polygon.extend(face.iter().map(|i| self.vertices[*i as usize]));
            result.extend(
                triangulate_polygon(&polygon)
                    .into_iter()
                    .map(|t| t.map(|i| face[i as usize])),
            );
        }

        result
    }

    /// Triangulates this mesh into an indexed triangle mesh.
    ///
    /// Fails with [`MeshError::EmptyIndices`] if the mesh has no face.
    pub fn triangulate(&self) -> Result<TriMesh, MeshError> {
        TriMesh::new(self.vertices.clone(), self.triangle_indices())
    }

    /// Triangulates this mesh, with all its vertices transformed by `pose`.
    pub fn triangulate_transformed(&self, pose: &Affine<Real>) -> Result<TriMesh, MeshError> {
        let vertices = self.vertices.iter().map(|pt| pose * pt).collect();
        TriMesh::new(vertices, self.triangle_indices())
    }
}

impl From<&TriMesh> for Mesh {
    fn from(trimesh: &TriMesh) -> Self {
        Self {
            vertices: trimesh.vertices().to_vec(),
            faces: trimesh
                .indices()
                .iter()
                .map(|t| Polygon::from_slice(t))
                .collect(),
        }
    }
}
