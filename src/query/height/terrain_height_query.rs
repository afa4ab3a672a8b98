use super::HeightQueryError;
use crate::bounding_volume::Aabb;
use crate::math::{Affine, Real};
use crate::query::Ray;
use crate::shape::{Mesh, MeshError, TriMesh};

/// Height above the terrain's bounding box from which vertical query rays are cast.
pub const RAY_ORIGIN_MARGIN: Real = 1.0;

/// The terrain surface found below a query position.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TerrainHit {
    /// World-space elevation of the surface.
    pub height: Real,
    /// Index of the terrain triangle that was hit.
    pub triangle: u32,
}

/// Answers "what is the terrain elevation below `(x, y)`?" for a fixed terrain snapshot.
///
/// The terrain is triangulated and transformed to world space once, at construction, and
/// indexed with a BVH. Queries cast a ray straight down from above the terrain and keep the
/// highest hit. The structure is read-only after construction and can be shared across threads.
#[derive(Clone, Debug)]
pub struct TerrainHeightQuery {
    mesh: TriMesh,
}

impl TerrainHeightQuery {
    /// Indexes the terrain `mesh` placed in the world by `pose`.
    pub fn new(mesh: &Mesh, pose: &Affine<Real>) -> Result<Self, HeightQueryError> {
        let world = mesh.triangulate_transformed(pose).map_err(|e| match e {
            MeshError::EmptyIndices => HeightQueryError::EmptyTerrain,
            e => HeightQueryError::Mesh(e),
        })?;
        Self::from_world_trimesh(world)
    }

    /// Indexes a terrain already triangulated and expressed in world space.
    pub fn from_world_trimesh(mesh: TriMesh) -> Result<Self, HeightQueryError> {
        if mesh.num_triangles() == 0 {
            return Err(HeightQueryError::EmptyTerrain);
        }

        log::debug!(
            "indexed terrain with {} triangles, bounds {:?}",
            mesh.num_triangles(),
            mesh.local_aabb()
        );
        Ok(Self { mesh })
    }

    /// The world-space bounding box of the terrain.
    #[inline]
    pub fn aabb(&self) -> &Aabb {
        self.mesh.local_aabb()
    }

    /// The number of indexed triangles.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.mesh.num_triangles()
    }

    /// The world-space triangle mesh being queried.
    #[inline]
    pub fn trimesh(&self) -> &TriMesh {
        &self.mesh
    }

    /// The terrain elevation below `(x, y)`, if any.
    #[inline]
    pub fn height_at(&self, x: Real, y: Real) -> Option<Real> {
        self.hit_at(x, y).map(|hit| hit.height)
    }

    /// The terrain elevation below `(x, y)` together with the triangle it was read from.
    ///
    /// Returns `None` outside of the terrain's horizontal extent, or if the vertical line
    /// through `(x, y)` misses every triangle (holes in the terrain). When several
    /// triangles are hit at the same height, the lowest triangle index wins.
    pub fn hit_at(&self, x: Real, y: Real) -> Option<TerrainHit> {
        let aabb = self.aabb();
        if !aabb.contains_xy(x, y) {
            return None;
        }

        let ray = Ray::downward(x, y, aabb.maxs.z + RAY_ORIGIN_MARGIN);
        let (triangle, inter) = self.mesh.cast_local_ray(&ray, Real::MAX)?;
        let tri = self.mesh.triangle(triangle);

        let height = match inter.barycentric {
            Some(bcoords) => bcoords.x * tri.a.z + bcoords.y * tri.b.z + bcoords.z * tri.c.z,
            None => ray.point_at(inter.time_of_impact).z,
        };
        let [zmin, zmax] = tri.z_range();

        Some(TerrainHit {
            height: height.clamp(zmin, zmax),
            triangle,
        })
    }
}
