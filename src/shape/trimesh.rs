use crate::bounding_volume::Aabb;
use crate::math::{Affine, Point, Real, Vector};
use crate::partitioning::Bvh;
use crate::query::{local_ray_intersection_with_triangle, Ray, RayIntersection};
use crate::shape::{MeshError, Triangle};
use crate::utils::{PointKey, SortedPair};
use core::fmt;
use ordered_float::OrderedFloat;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Why a triangle mesh does not bound a volume.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// A triangle uses the same vertex more than once.
    #[error("the triangle {0} repeats one of its vertices")]
    DegenerateTriangle(u32),
    /// An edge is used by a single triangle: the mesh has a hole.
    #[error("the edge {edge:?} of triangle {triangle} is not shared with any other triangle")]
    BoundaryEdge {
        /// The only triangle using the edge.
        triangle: u32,
        /// The boundary edge.
        edge: (u32, u32),
    },
    /// An edge is used by more than two triangles.
    #[error("the edge {edge:?} is shared by {count} triangles")]
    NonManifoldEdge {
        /// The edge shared by too many triangles.
        edge: (u32, u32),
        /// The number of triangles using the edge.
        count: usize,
    },
    /// Two triangles sharing an edge run along it in the same direction, so one of them is
    /// flipped.
    #[error("the triangles {first} and {second} are flipped relative to each other across the edge {edge:?}")]
    InconsistentOrientation {
        /// The triangle seen first.
        first: u32,
        /// The triangle flipped relative to `first`.
        second: u32,
        /// The shared edge.
        edge: (u32, u32),
    },
}

/// Directions of the rays used for point containment. Skewed so they rarely graze the axis
/// aligned features typical of terrain slabs and extruded prisms.
const CONTAINMENT_RAY_DIRS: [[Real; 3]; 3] = [
    [0.802_706, 0.293_514, 0.519_164],
    [-0.371_902, 0.857_381, 0.355_731],
    [0.213_547, -0.422_618, 0.880_770],
];

/// A triangle mesh with an acceleration structure over its triangles.
///
/// The BVH is built at construction and rebuilt after every operation moving vertices, so it
/// always matches the current geometry.
#[derive(Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TriMesh {
    bvh: Bvh,
    aabb: Aabb,
    vertices: Vec<Point<Real>>,
    indices: Vec<[u32; 3]>,
}

impl fmt::Debug for TriMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriMesh")
            .field("num_vertices", &self.vertices.len())
            .field("num_triangles", &self.indices.len())
            .field("aabb", &self.aabb)
            .finish()
    }
}

impl TriMesh {
    /// Builds a mesh from its vertices and the vertex indices of its triangles.
    ///
    /// Fails on an empty index buffer or on out-of-range indices.
    pub fn new(vertices: Vec<Point<Real>>, indices: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        if indices.is_empty() {
            return Err(MeshError::EmptyIndices);
        }

        for (face, idx) in indices.iter().enumerate() {
            if let Some(index) = idx.iter().find(|i| **i as usize >= vertices.len()) {
                return Err(MeshError::InvalidIndex {
                    face,
                    index: *index,
                    num_vertices: vertices.len(),
                });
            }
        }

        let mut result = Self {
            bvh: Bvh::new(),
            aabb: Aabb::new_invalid(),
            vertices,
            indices,
        };
        result.rebuild_bvh();
        Ok(result)
    }

    fn rebuild_bvh(&mut self) {
        let leaves: Vec<_> = self.triangles().map(|tri| tri.local_aabb()).collect();
        self.bvh = Bvh::from_leaves(&leaves);
        self.aabb = self.bvh.root_aabb();
    }

    /// The vertices of this mesh.
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The vertex indices of each triangle.
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// Consumes this mesh, returning its vertex and index buffers.
    pub fn into_parts(self) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        (self.vertices, self.indices)
    }

    /// The number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// The BVH over the triangles, leaf `i` bounding triangle `i`.
    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// The bounding box of the mesh in its own frame.
    pub fn local_aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// The triangle with index `i`.
    pub fn triangle(&self, i: u32) -> Triangle {
        self.triangle_at(&self.indices[i as usize])
    }

    fn triangle_at(&self, idx: &[u32; 3]) -> Triangle {
        Triangle::from(idx.map(|k| self.vertices[k as usize]))
    }

    /// The triangles, in index order.
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = Triangle> + '_ {
        self.indices.iter().map(move |idx| self.triangle_at(idx))
    }

    /// Moves every vertex by `transform`.
    ///
    /// If `transform` mirrors space (negative determinant), the triangles are reversed so that
    /// their orientation relative to the enclosed volume is preserved.
    pub fn transform_vertices(&mut self, transform: &Affine<Real>) {
        for pt in &mut self.vertices {
            *pt = transform * *pt;
        }

        if transform.matrix().fixed_view::<3, 3>(0, 0).determinant() < 0.0 {
            self.indices.iter_mut().for_each(|idx| idx.swap(0, 1));
        }

        self.rebuild_bvh();
    }

    /// Flips every triangle, turning the mesh inside out.
    pub fn reverse(&mut self) {
        // The BVH does not depend on triangle orientation.
        self.indices.iter_mut().for_each(|idx| idx.swap(0, 1));
    }

    /// The signed volume enclosed by this mesh.
    ///
    /// This is positive for a closed mesh with outward-facing triangles, and meaningless for an
    /// open mesh.
    pub fn signed_volume(&self) -> Real {
        // Shifting to the AABB center reduces cancellation for meshes far from the origin.
        let shift = self.aabb.center().coords;
        self.triangles()
            .map(|tri| {
                Triangle::new(tri.a - shift, tri.b - shift, tri.c - shift)
                    .signed_volume_from_origin()
            })
            .sum()
    }

    /// The edges used by a single triangle, with the index of that triangle.
    ///
    /// Edges are directed as they appear in their triangle, and listed in triangle order.
    /// Fails if the mesh has a degenerate triangle, an edge shared by more than two triangles,
    /// or two adjacent triangles with opposite orientations.
    pub fn boundary_edges(&self) -> Result<Vec<(u32, [u32; 2])>, TopologyError> {
        let mut edges: HashMap<SortedPair<u32>, (u32, usize, bool)> = HashMap::new();

        for (tri_id, idx) in self.indices.iter().enumerate() {
            let tri_id = tri_id as u32;
            if idx[0] == idx[1] || idx[0] == idx[2] || idx[1] == idx[2] {
                return Err(TopologyError::DegenerateTriangle(tri_id));
            }

            for k in 0..3 {
                let (a, b) = (idx[k], idx[(k + 1) % 3]);
                let forward = SortedPair::is_sorted(&a, &b);

                match edges.entry(SortedPair::new(a, b)) {
                    Entry::Vacant(entry) => {
                        let _ = entry.insert((tri_id, 1, forward));
                    }
                    Entry::Occupied(mut entry) => {
                        let (first_tri, count, first_forward) = entry.get_mut();
                        *count += 1;

                        if *count > 2 {
                            return Err(TopologyError::NonManifoldEdge {
                                edge: (a, b),
                                count: *count,
                            });
                        }

                        if *first_forward == forward {
                            return Err(TopologyError::InconsistentOrientation {
                                first: *first_tri,
                                second: tri_id,
                                edge: (a, b),
                            });
                        }
                    }
                }
            }
        }

        let mut result = vec![];
        for (tri_id, idx) in self.indices.iter().enumerate() {
            for k in 0..3 {
                let (a, b) = (idx[k], idx[(k + 1) % 3]);
                if matches!(edges.get(&SortedPair::new(a, b)), Some((_, 1, _))) {
                    result.push((tri_id as u32, [a, b]));
                }
            }
        }

        Ok(result)
    }

    /// Checks that this mesh is closed and consistently oriented.
    ///
    /// Every undirected edge must be shared by exactly two triangles traversing it in opposite
    /// directions. Adjacency is determined by vertex indices, so duplicate vertices must be
    /// merged beforehand (see [`Self::merge_vertices`]).
    pub fn check_manifold(&self) -> Result<(), TopologyError> {
        match self.boundary_edges()?.first() {
            // Report the boundary edge of the first triangle having one, for determinism.
            Some((triangle, [a, b])) => Err(TopologyError::BoundaryEdge {
                triangle: *triangle,
                edge: (*a, *b),
            }),
            None => Ok(()),
        }
    }

    /// Is this mesh closed and consistently oriented?
    pub fn is_manifold(&self) -> bool {
        self.check_manifold().is_ok()
    }

    /// Casts a ray on this mesh, returning the first triangle hit.
    ///
    /// Ties between triangles hit at the same time of impact are broken in favor of the lowest
    /// triangle index.
    pub fn cast_local_ray(
        &self,
        ray: &Ray,
        max_time_of_impact: Real,
    ) -> Option<(u32, RayIntersection)> {
        self.bvh.closest_leaf(
            max_time_of_impact,
            |node, best_so_far| node.cast_ray(ray, best_so_far),
            |tri_id, _| {
                let tri = self.triangle(tri_id);
                local_ray_intersection_with_triangle(&tri.a, &tri.b, &tri.c, ray)
                    .filter(|inter| inter.time_of_impact <= max_time_of_impact)
            },
        )
    }

    /// Counts the distinct crossings of a ray with this mesh.
    ///
    /// Hits closer to each other than `merge_distance` along the ray count once, so that a ray
    /// going through an edge shared by two triangles is not counted twice.
    fn count_ray_crossings(&self, ray: &Ray, merge_distance: Real) -> usize {
        let mut tois: Vec<Real> = self
            .bvh
            .leaves(|node| node.cast_ray(ray, Real::MAX) != Real::MAX)
            .filter_map(|tri_id| {
                let tri = self.triangle(tri_id);
                local_ray_intersection_with_triangle(&tri.a, &tri.b, &tri.c, ray)
                    .map(|inter| inter.time_of_impact)
            })
            .filter(|toi| *toi > 0.0)
            .collect();
        tois.sort_unstable_by_key(|toi| OrderedFloat(*toi));
        tois.dedup_by(|a, b| (*a - *b).abs() <= merge_distance);
        tois.len()
    }

    /// Tests whether a point lies inside the volume enclosed by this mesh.
    ///
    /// Uses ray parity along three skewed directions, and a majority vote between them. The
    /// result is meaningful only for closed meshes; points on the surface may be classified
    /// either way.
    pub fn contains_point(&self, point: &Point<Real>) -> bool {
        if !self.aabb.contains_local_point(point) {
            return false;
        }

        let merge_distance = self.aabb.diagonal_length() * Real::EPSILON * 100.0;
        let votes = CONTAINMENT_RAY_DIRS
            .iter()
            .filter(|dir| {
                let ray = Ray::new(*point, Vector::new(dir[0], dir[1], dir[2]));
                self.count_ray_crossings(&ray, merge_distance) % 2 == 1
            })
            .count();
        votes >= 2
    }

    /// Merges vertices closer than `tolerance` and adjusts the index buffer accordingly.
    ///
    /// Bit-identical vertices are merged first, then vertices within `tolerance` of an already
    /// kept vertex are snapped onto it (first vertex wins). Triangles that become degenerate are
    /// removed, as well as the vertices no longer referenced. Returns the number of removed
    /// triangles.
    pub fn merge_vertices(&mut self, tolerance: Real) -> usize {
        let mut exact: HashMap<PointKey, u32> = HashMap::new();
        let mut grid: HashMap<[i64; 3], Vec<u32>> = HashMap::new();
        let mut kept: Vec<Point<Real>> = Vec::with_capacity(self.vertices.len());
        let mut remap = Vec::with_capacity(self.vertices.len());
        let cell = if tolerance > 0.0 { tolerance * 2.0 } else { 1.0 };
        let cell_of = |pt: &Point<Real>| pt.coords.map(|c| (c / cell).floor() as i64);

        for pt in &self.vertices {
            let id = match exact.entry(PointKey::new(pt)) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let key = cell_of(pt);
                    let mut found = None;

                    if tolerance > 0.0 {
                        'search: for dx in -1..=1 {
                            for dy in -1..=1 {
                                for dz in -1..=1 {
                                    let neighbor = [key.x + dx, key.y + dy, key.z + dz];
                                    for candidate in grid.get(&neighbor).into_iter().flatten() {
                                        if na::distance(&kept[*candidate as usize], pt)
                                            <= tolerance
                                        {
                                            found = Some(*candidate);
                                            break 'search;
                                        }
                                    }
                                }
                            }
                        }
                    }

                    let id = found.unwrap_or_else(|| {
                        let id = kept.len() as u32;
                        kept.push(*pt);
                        grid.entry([key.x, key.y, key.z]).or_default().push(id);
                        id
                    });
                    *entry.insert(id)
                }
            };
            remap.push(id);
        }

        let num_triangles = self.indices.len();
        let mut indices: Vec<[u32; 3]> = self
            .indices
            .iter()
            .map(|idx| idx.map(|i| remap[i as usize]))
            .filter(|idx| idx[0] != idx[1] && idx[0] != idx[2] && idx[1] != idx[2])
            .collect();
        let removed = num_triangles - indices.len();

        let vertices = compact_vertices(&kept, &mut indices);
        self.vertices = vertices;
        self.indices = indices;
        if !self.indices.is_empty() {
            self.rebuild_bvh();
        } else {
            self.bvh = Bvh::new();
            self.aabb = Aabb::new_invalid();
        }
        removed
    }

    /// Applies `f` to the vertex buffer, then rebuilds the BVH.
    ///
    /// The number of vertices cannot change, so the index buffer stays valid.
    pub fn modify_vertices(&mut self, f: impl FnOnce(&mut [Point<Real>])) {
        f(&mut self.vertices);
        self.rebuild_bvh();
    }

    /// The indices of the triangles whose bounding boxes intersect `aabb`.
    pub(crate) fn triangles_intersecting_aabb<'a>(
        &'a self,
        aabb: &'a Aabb,
    ) -> impl Iterator<Item = u32> + 'a {
        self.bvh.intersect_aabb(aabb)
    }
}

/// Removes the vertices not referenced by `indices`, preserving the relative order of the
/// remaining ones, and rewrites `indices` accordingly.
fn compact_vertices(
    vertices: &[Point<Real>],
    indices: &mut [[u32; 3]],
) -> Vec<Point<Real>> {
    let mut used = vec![false; vertices.len()];
    indices
        .iter()
        .flatten()
        .for_each(|i| used[*i as usize] = true);

    let mut new_ids = vec![u32::MAX; vertices.len()];
    let mut result = Vec::with_capacity(vertices.len());
    for (i, pt) in vertices.iter().enumerate() {
        if used[i] {
            new_ids[i] = result.len() as u32;
            result.push(*pt);
        }
    }

    indices
        .iter_mut()
        .flatten()
        .for_each(|i| *i = new_ids[*i as usize]);
    result
}

/// The distance under which two vertices of a mesh bounded by `aabb` are considered identical.
pub(crate) fn weld_tolerance(aabb: &Aabb) -> Real {
    aabb.diagonal_length() * Real::EPSILON * 1000.0
}

#[cfg(test)]
mod test {
    use super::{TopologyError, TriMesh};
    use crate::math::{Affine, Point, Real, Vector};
    use crate::query::Ray;

    fn unit_cube() -> TriMesh {
        let vertices = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(1.0, 0.0, 1.0),
            Point::new(1.0, 1.0, 1.0),
            Point::new(0.0, 1.0, 1.0),
        ];
        let indices = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [1, 2, 6],
            [1, 6, 5],
            [2, 3, 7],
            [2, 7, 6],
            [3, 0, 4],
            [3, 4, 7],
        ];
        TriMesh::new(vertices, indices).unwrap()
    }

    #[test]
    fn cube_is_manifold_with_unit_volume() {
        let cube = unit_cube();
        assert_eq!(cube.check_manifold(), Ok(()));
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1.0e-6);

        let mut reversed = cube.clone();
        reversed.reverse();
        assert_relative_eq!(reversed.signed_volume(), -1.0, epsilon = 1.0e-6);
        assert_eq!(reversed.check_manifold(), Ok(()));
    }

    #[test]
    fn topology_errors_are_detected() {
        let cube = unit_cube();
        let (vertices, mut indices) = cube.clone().into_parts();

        let mut open = indices.clone();
        let _ = open.pop();
        let open = TriMesh::new(vertices.clone(), open).unwrap();
        assert!(matches!(
            open.check_manifold(),
            Err(TopologyError::BoundaryEdge { .. })
        ));

        indices[0].swap(0, 1);
        let flipped = TriMesh::new(vertices.clone(), indices).unwrap();
        assert!(matches!(
            flipped.check_manifold(),
            Err(TopologyError::InconsistentOrientation { .. })
        ));

        let bad = TriMesh::new(vertices, vec![[0, 0, 1]]).unwrap();
        assert_eq!(bad.check_manifold(), Err(TopologyError::DegenerateTriangle(0)));
    }

    #[test]
    fn cube_contains_inner_points_only() {
        let cube = unit_cube();
        assert!(cube.contains_point(&Point::new(0.5, 0.5, 0.5)));
        assert!(cube.contains_point(&Point::new(0.1, 0.9, 0.2)));
        assert!(!cube.contains_point(&Point::new(1.5, 0.5, 0.5)));
        assert!(!cube.contains_point(&Point::new(0.5, 0.5, -0.01)));
    }

    #[test]
    fn mirroring_transform_preserves_orientation() {
        let mut cube = unit_cube();
        let mirror = Affine::from_matrix_unchecked(na::Matrix4::new_nonuniform_scaling(
            &Vector::new(-2.0, 1.0, 1.0),
        ));
        cube.transform_vertices(&mirror);
        assert_relative_eq!(cube.signed_volume(), 2.0, epsilon = 1.0e-6);
        assert_relative_eq!(cube.local_aabb().mins, Point::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn merging_vertices_welds_split_faces() {
        let cube = unit_cube();
        let (vertices, indices) = cube.into_parts();

        // Give every triangle its own (slightly perturbed) copy of its vertices.
        let mut split_vertices = vec![];
        let mut split_indices = vec![];
        for (k, idx) in indices.iter().enumerate() {
            let base = split_vertices.len() as u32;
            for i in idx {
                let jitter = if k % 2 == 0 { 0.0 } else { 1.0e-9 };
                split_vertices.push(vertices[*i as usize] + Vector::repeat(jitter));
            }
            split_indices.push([base, base + 1, base + 2]);
        }

        let mut mesh = TriMesh::new(split_vertices, split_indices).unwrap();
        assert!(!mesh.is_manifold());
        assert_eq!(mesh.merge_vertices(1.0e-6), 0);
        assert_eq!(mesh.vertices().len(), 8);
        assert_eq!(mesh.check_manifold(), Ok(()));
    }

    #[test]
    fn ray_cast_returns_nearest_triangle() {
        let cube = unit_cube();
        let ray = Ray::downward(0.25, 0.75, 3.0);
        let (tri, inter) = cube.cast_local_ray(&ray, Real::MAX).unwrap();
        assert_relative_eq!(inter.time_of_impact, 2.0, epsilon = 1.0e-6);
        assert!(tri == 2 || tri == 3);
        assert!(cube.cast_local_ray(&ray, 1.0).is_none());
    }
}
