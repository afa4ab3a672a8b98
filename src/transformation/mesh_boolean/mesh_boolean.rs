use super::triangle_triangle_intersection::{
    triangle_triangle_intersection, IndexedTriangle, PointLocation, TriangleTriangleIntersection,
};
use super::{MeshBooleanError, EPS};
use crate::math::{Point, Point2, Real, Vector};
use crate::shape::{weld_tolerance, TopologyError, TriMesh, Triangle};
use crate::utils::{to_spade_point, SortedPair};
use na::{Matrix2, Vector2};
use smallvec::SmallVec;
use spade::handles::FixedVertexHandle;
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Triangulation as _};
use std::collections::{BTreeMap, HashMap};

/// A point of an intersection segment, and where it lies on the triangle being cut.
type CutPoint = (Point<Real>, PointLocation);

/// Corners of a triangle in its normalized frame.
const CORNERS: [[Real; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
/// Outward directions of the edges of a triangle in its normalized frame.
const EDGE_NORMALS: [[Real; 2]; 3] = [[0.0, -1.0], [0.5, 0.5], [-1.0, 0.0]];
/// Distance, in the normalized frame, by which points on an edge are pushed outside of the
/// triangle so that the triangulation splits that edge.
const EDGE_NUDGE: Real = EPS * 10.0;

/// Computes the solid difference `a − b` of two closed triangle meshes.
///
/// Both meshes must be closed and consistently oriented (see [`TriMesh::check_manifold`]);
/// inside-out operands are reversed first. Triangles crossed by the other mesh are split along
/// the intersection curve; the pieces of `a` outside of `b` and the pieces of `b` inside of `a`
/// (reversed) form the result, which is welded and checked to be closed.
///
/// Faces of `a` and `b` lying on the same plane are treated as touching, never cut: the result
/// is only reliable when the two surfaces cross transversally.
pub fn subtract_meshes(a: &TriMesh, b: &TriMesh) -> Result<TriMesh, MeshBooleanError> {
    let a = prepare_operand(a, "first")?;
    let b = prepare_operand(b, "second")?;
    let tolerance = a.local_aabb().merged(b.local_aabb()).diagonal_length() * EPS;

    // 1: intersect all the pairs of triangles with overlapping AABBs.
    let mut cuts_a: BTreeMap<u32, Vec<[CutPoint; 2]>> = BTreeMap::new();
    let mut cuts_b: BTreeMap<u32, Vec<[CutPoint; 2]>> = BTreeMap::new();
    let mut num_coplanar = 0;

    for (tri_a, ids_a) in a.indices().iter().enumerate() {
        let tri_a = tri_a as u32;
        let t1 = IndexedTriangle {
            tri: a.triangle(tri_a),
            ids: *ids_a,
        };
        let query = t1.tri.local_aabb().loosened(tolerance);

        for tri_b in b.triangles_intersecting_aabb(&query) {
            let t2 = IndexedTriangle {
                tri: b.triangle(tri_b),
                ids: b.indices()[tri_b as usize],
            };

            match triangle_triangle_intersection(&t1, &t2, tolerance) {
                Some(TriangleTriangleIntersection::Segment([p, q])) => {
                    cuts_a
                        .entry(tri_a)
                        .or_default()
                        .push([(p.point, p.loc1), (q.point, q.loc1)]);
                    cuts_b
                        .entry(tri_b)
                        .or_default()
                        .push([(p.point, p.loc2), (q.point, q.loc2)]);
                }
                Some(TriangleTriangleIntersection::Coplanar) => num_coplanar += 1,
                None => {}
            }
        }
    }

    if num_coplanar > 0 {
        log::debug!("{num_coplanar} coplanar triangle pairs treated as touching");
    }
    log::debug!(
        "boolean difference cuts {} + {} triangles",
        cuts_a.len(),
        cuts_b.len()
    );

    // 2: split and classify.
    let mut result = vec![];
    collect_pieces(&a, &cuts_a, false, tolerance, |pt| !b.contains_point(pt), &mut result)?;
    collect_pieces(&b, &cuts_b, true, tolerance, |pt| a.contains_point(pt), &mut result)?;

    if result.is_empty() {
        return Err(MeshBooleanError::EmptyResult);
    }

    // 3: weld and validate.
    let vertices = result.iter().flatten().copied().collect();
    let indices = (0..result.len() as u32)
        .map(|i| [i * 3, i * 3 + 1, i * 3 + 2])
        .collect();
    let mut mesh = TriMesh::new(vertices, indices).map_err(|_| MeshBooleanError::EmptyResult)?;
    let removed = mesh.merge_vertices(tolerance);
    if removed > 0 {
        log::debug!("removed {removed} degenerate triangles from the boolean result");
    }

    if mesh.num_triangles() == 0 {
        return Err(MeshBooleanError::EmptyResult);
    }

    mesh.check_manifold()
        .map_err(MeshBooleanError::NonManifoldResult)?;
    Ok(mesh)
}

fn prepare_operand(mesh: &TriMesh, operand: &'static str) -> Result<TriMesh, MeshBooleanError> {
    let mut mesh = mesh.clone();
    let _ = mesh.merge_vertices(weld_tolerance(mesh.local_aabb()));

    if mesh.num_triangles() == 0 {
        return Err(MeshBooleanError::NonManifoldOperand {
            operand,
            error: TopologyError::DegenerateTriangle(0),
        });
    }

    mesh.check_manifold()
        .map_err(|error| MeshBooleanError::NonManifoldOperand { operand, error })?;

    if mesh.signed_volume() < 0.0 {
        log::debug!("the {operand} boolean operand is inside-out, reversing it");
        mesh.reverse();
    }

    Ok(mesh)
}

/// Pushes to `out` the triangles of `mesh`, or the pieces of its cut triangles, whose centers
/// pass the `keep` test.
///
/// Pieces thinner than `tolerance` are dropped: they are the slivers spanning the split edges
/// of a cut triangle.
fn collect_pieces(
    mesh: &TriMesh,
    cuts: &BTreeMap<u32, Vec<[CutPoint; 2]>>,
    reverse: bool,
    tolerance: Real,
    keep: impl Fn(&Point<Real>) -> bool,
    out: &mut Vec<[Point<Real>; 3]>,
) -> Result<(), MeshBooleanError> {
    let mut push = |tri: [Point<Real>; 3]| {
        if reverse {
            out.push([tri[0], tri[2], tri[1]]);
        } else {
            out.push(tri);
        }
    };

    for (tri_id, segments) in cuts {
        let pieces = split_triangle(&mesh.triangle(*tri_id), segments).map_err(|error| {
            MeshBooleanError::Triangulation {
                triangle: *tri_id,
                error,
            }
        })?;

        for piece in pieces {
            let tri = Triangle::from(piece);
            if !tri.is_thinner_than(tolerance) && keep(&tri.center()) {
                push(piece);
            }
        }
    }

    // Triangles that are not cut form regions lying entirely on one side of the other mesh.
    for region in uncut_regions(mesh, cuts) {
        if keep(&mesh.triangle(region[0]).center()) {
            for tri_id in region {
                push(mesh.triangle(tri_id).vertices());
            }
        }
    }

    Ok(())
}

/// Groups the triangles absent from `cuts` into edge-connected regions.
///
/// The first element of each region is its smallest triangle index.
fn uncut_regions<T>(mesh: &TriMesh, cuts: &BTreeMap<u32, T>) -> Vec<Vec<u32>> {
    let num_triangles = mesh.num_triangles();
    let mut adjacency: HashMap<SortedPair<u32>, SmallVec<[u32; 2]>> = HashMap::new();

    for (tri_id, idx) in mesh.indices().iter().enumerate() {
        if !cuts.contains_key(&(tri_id as u32)) {
            for k in 0..3 {
                adjacency
                    .entry(SortedPair::new(idx[k], idx[(k + 1) % 3]))
                    .or_default()
                    .push(tri_id as u32);
            }
        }
    }

    let mut visited: Vec<bool> = (0..num_triangles as u32)
        .map(|i| cuts.contains_key(&i))
        .collect();
    let mut regions = vec![];
    let mut stack = vec![];

    for seed in 0..num_triangles {
        if visited[seed] {
            continue;
        }

        visited[seed] = true;
        stack.push(seed as u32);
        let mut region = vec![];

        while let Some(tri_id) = stack.pop() {
            region.push(tri_id);
            let idx = mesh.indices()[tri_id as usize];

            for k in 0..3 {
                let edge = SortedPair::new(idx[k], idx[(k + 1) % 3]);
                for neighbor in adjacency.get(&edge).into_iter().flatten() {
                    if !visited[*neighbor as usize] {
                        visited[*neighbor as usize] = true;
                        stack.push(*neighbor);
                    }
                }
            }
        }

        regions.push(region);
    }

    regions
}

/// Splits `tri` along the given segments, preserving its orientation.
fn split_triangle(
    tri: &Triangle,
    segments: &[[CutPoint; 2]],
) -> Result<Vec<[Point<Real>; 3]>, InsertionError> {
    let Some(mut split) = TriangleSplit::new(tri)? else {
        return Ok(vec![tri.vertices()]);
    };

    for segment in segments {
        split.add_segment(segment)?;
    }

    Ok(split.pieces())
}

/// Constrained Delaunay triangulation of a triangle, expressed in the frame mapping its
/// vertices to `(0, 0)`, `(1, 0)` and `(0, 1)`.
struct TriangleSplit {
    delaunay: ConstrainedDelaunayTriangulation<spade::Point2<Real>>,
    /// The 3D position of each triangulation vertex, indexed by handle.
    points: Vec<Option<Point<Real>>>,
    origin: Point<Real>,
    ab: Vector<Real>,
    ac: Vector<Real>,
    inv_gram: Matrix2<Real>,
}

impl TriangleSplit {
    /// Returns `None` if the triangle is degenerate.
    fn new(tri: &Triangle) -> Result<Option<Self>, InsertionError> {
        let ab = tri.b - tri.a;
        let ac = tri.c - tri.a;
        let gram = Matrix2::new(ab.dot(&ab), ab.dot(&ac), ab.dot(&ac), ac.dot(&ac));
        let Some(inv_gram) = gram.try_inverse() else {
            return Ok(None);
        };

        let mut result = Self {
            delaunay: ConstrainedDelaunayTriangulation::new(),
            points: vec![],
            origin: tri.a,
            ab,
            ac,
            inv_gram,
        };

        for (corner, pt) in CORNERS.iter().zip(tri.vertices()) {
            let _ = result.insert(&Point2::from(*corner), pt)?;
        }

        Ok(Some(result))
    }

    fn insert(
        &mut self,
        local: &Point2<Real>,
        point: Point<Real>,
    ) -> Result<FixedVertexHandle, InsertionError> {
        let handle = self.delaunay.insert(to_spade_point(local))?;
        let id = handle.index();

        if id >= self.points.len() {
            self.points.resize(id + 1, None);
        }

        // The first point inserted at a location wins.
        if self.points[id].is_none() {
            self.points[id] = Some(point);
        }

        Ok(handle)
    }

    fn to_local(&self, point: &Point<Real>) -> Point2<Real> {
        let ap = point - self.origin;
        Point2::from(self.inv_gram * Vector2::new(self.ab.dot(&ap), self.ac.dot(&ap)))
    }

    fn locate(&self, cut: &CutPoint) -> Point2<Real> {
        match cut.1 {
            PointLocation::Vertex(k) => Point2::from(CORNERS[k as usize]),
            PointLocation::Edge(k, t) => {
                let k = k as usize;
                let a = Vector2::from(CORNERS[k]);
                let b = Vector2::from(CORNERS[(k + 1) % 3]);
                let n = Vector2::from(EDGE_NORMALS[k]);
                Point2::from(a + (b - a) * t + n * EDGE_NUDGE)
            }
            PointLocation::Face => {
                // Keep face points strictly inside, so they never split an edge.
                let local = self.to_local(&cut.0);
                let u = local.x.max(EDGE_NUDGE);
                let v = local.y.max(EDGE_NUDGE);
                let scale = (1.0 - EDGE_NUDGE) / (u + v);
                if scale < 1.0 {
                    Point2::new(u * scale, v * scale)
                } else {
                    Point2::new(u, v)
                }
            }
        }
    }

    fn add_segment(&mut self, segment: &[CutPoint; 2]) -> Result<(), InsertionError> {
        let local0 = self.locate(&segment[0]);
        let local1 = self.locate(&segment[1]);
        let h0 = self.insert(&local0, segment[0].0)?;
        let h1 = self.insert(&local1, segment[1].0)?;

        if h0 != h1 {
            let _ = self.delaunay.add_constraint_and_split(h0, h1, |v| v);
        }

        Ok(())
    }

    fn point_3d(&self, handle: FixedVertexHandle, local: &spade::Point2<Real>) -> Point<Real> {
        self.points
            .get(handle.index())
            .copied()
            .flatten()
            .unwrap_or_else(|| self.origin + self.ab * local.x + self.ac * local.y)
    }

    /// The triangles of the split, with the orientation of the original triangle.
    fn pieces(&self) -> Vec<[Point<Real>; 3]> {
        self.delaunay
            .inner_faces()
            .map(|face| face.vertices().map(|v| self.point_3d(v.fix(), v.data())))
            .collect()
    }
}
