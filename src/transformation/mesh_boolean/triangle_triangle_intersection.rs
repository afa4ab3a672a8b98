use crate::math::{Point, Real, Vector};
use crate::shape::Triangle;
use arrayvec::ArrayVec;

/// Where an intersection point lies on one of the intersected triangles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(super) enum PointLocation {
    /// On the k-th vertex of the triangle.
    Vertex(u8),
    /// On the k-th edge, going from the k-th to the (k+1)-th vertex, at the given parameter.
    Edge(u8, Real),
    /// Inside of the triangle.
    Face,
}

/// An endpoint of the segment where two triangles intersect.
#[derive(Copy, Clone, Debug)]
pub(super) struct IntersectionPoint {
    pub point: Point<Real>,
    pub loc1: PointLocation,
    pub loc2: PointLocation,
}

#[derive(Copy, Clone, Debug)]
pub(super) enum TriangleTriangleIntersection {
    Segment([IntersectionPoint; 2]),
    /// Both triangles lie on the same plane. Such contacts are treated as touching, never cut.
    Coplanar,
}

/// A triangle together with the mesh indices of its vertices.
#[derive(Copy, Clone, Debug)]
pub(super) struct IndexedTriangle {
    pub tri: Triangle,
    pub ids: [u32; 3],
}

struct Plane {
    origin: Point<Real>,
    normal: Vector<Real>,
}

impl Plane {
    fn snapped_distances(&self, tri: &Triangle, tolerance: Real) -> [Real; 3] {
        tri.vertices().map(|pt| {
            let dist = self.normal.dot(&(pt - self.origin));
            if dist.abs() <= tolerance {
                0.0
            } else {
                dist
            }
        })
    }
}

/// Computes the segment along which two triangles intersect.
///
/// Signed distances smaller than `tolerance` are snapped to zero. Points where an edge crosses
/// the other triangle's plane are computed from the edge's endpoints sorted by mesh index, so
/// that two triangles sharing an edge get bit-identical crossing points.
///
/// Returns `None` if the triangles are disjoint or only touch at a single point.
pub(super) fn triangle_triangle_intersection(
    t1: &IndexedTriangle,
    t2: &IndexedTriangle,
    tolerance: Real,
) -> Option<TriangleTriangleIntersection> {
    let plane1 = Plane {
        origin: t1.tri.a,
        normal: t1.tri.normal()?.into_inner(),
    };
    let plane2 = Plane {
        origin: t2.tri.a,
        normal: t2.tri.normal()?.into_inner(),
    };

    let dists1 = plane2.snapped_distances(&t1.tri, tolerance);
    if is_one_sided(&dists1) {
        return None;
    }

    if dists1 == [0.0; 3] {
        return Some(TriangleTriangleIntersection::Coplanar);
    }

    let dists2 = plane1.snapped_distances(&t2.tri, tolerance);
    if is_one_sided(&dists2) {
        return None;
    }

    let line_dir = plane1.normal.cross(&plane2.normal).try_normalize(1.0e-9)?;

    let range1 = plane_crossing_range(t1, &dists1, &line_dir)?;
    let range2 = plane_crossing_range(t2, &dists2, &line_dir)?;

    if range1[1].0.min(range2[1].0) - range1[0].0.max(range2[0].0) <= tolerance {
        // Disjoint, or touching at a single point.
        return None;
    }

    let pick = |end1: &(Real, Point<Real>, PointLocation),
                end2: &(Real, Point<Real>, PointLocation),
                prefer2: bool| {
        if (end1.0 - end2.0).abs() <= tolerance {
            IntersectionPoint {
                point: end1.1,
                loc1: end1.2,
                loc2: end2.2,
            }
        } else if prefer2 {
            IntersectionPoint {
                point: end2.1,
                loc1: PointLocation::Face,
                loc2: end2.2,
            }
        } else {
            IntersectionPoint {
                point: end1.1,
                loc1: end1.2,
                loc2: PointLocation::Face,
            }
        }
    };

    let start = pick(&range1[0], &range2[0], range2[0].0 > range1[0].0);
    let end = pick(&range1[1], &range2[1], range2[1].0 < range1[1].0);

    Some(TriangleTriangleIntersection::Segment([start, end]))
}

fn is_one_sided(dists: &[Real; 3]) -> bool {
    dists.iter().all(|d| *d > 0.0) || dists.iter().all(|d| *d < 0.0)
}

/// The points where a triangle meets the other triangle's plane, sorted along `line_dir`.
fn plane_crossing_range(
    t: &IndexedTriangle,
    dists: &[Real; 3],
    line_dir: &Vector<Real>,
) -> Option<[(Real, Point<Real>, PointLocation); 2]> {
    let vertices = t.tri.vertices();
    let mut crossings = ArrayVec::<_, 3>::new();

    for k in 0..3 {
        let k1 = (k + 1) % 3;

        if dists[k] == 0.0 {
            crossings.push((vertices[k], PointLocation::Vertex(k as u8)));
        }

        if dists[k] * dists[k1] < 0.0 {
            let (point, param) = if t.ids[k] < t.ids[k1] {
                edge_crossing(&vertices[k], &vertices[k1], dists[k], dists[k1])
            } else {
                let (point, param) =
                    edge_crossing(&vertices[k1], &vertices[k], dists[k1], dists[k]);
                (point, 1.0 - param)
            };
            crossings.push((point, PointLocation::Edge(k as u8, param)));
        }
    }

    if crossings.len() != 2 {
        return None;
    }

    let mut range = [
        (line_dir.dot(&crossings[0].0.coords), crossings[0].0, crossings[0].1),
        (line_dir.dot(&crossings[1].0.coords), crossings[1].0, crossings[1].1),
    ];
    if range[0].0 > range[1].0 {
        range.swap(0, 1);
    }
    Some(range)
}

/// The point where the segment `[p, q]` crosses a plane, given the signed distances of its
/// endpoints to that plane, and its parameter along the segment.
fn edge_crossing(p: &Point<Real>, q: &Point<Real>, dp: Real, dq: Real) -> (Point<Real>, Real) {
    let t = dp / (dp - dq);
    (p + (q - p) * t, t)
}
