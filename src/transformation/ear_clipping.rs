//! Polygon triangulation by ear clipping, following
//! <https://github.com/ivanfratric/polypartition>.

use crate::math::{Point, Point2, Real, Vector};
use crate::utils::{corner_direction, is_point_in_triangle, signed_area_2, Orientation};

/// The polygon left to clip, as a doubly linked ring over the input vertices.
struct Ring<'a> {
    points: &'a [Point2<Real>],
    prev: Vec<usize>,
    next: Vec<usize>,
    clipped: Vec<bool>,
    /// The pointiness of each vertex that is currently an ear: the cosine of its angle.
    ears: Vec<Option<Real>>,
}

impl<'a> Ring<'a> {
    fn new(points: &'a [Point2<Real>]) -> Option<Self> {
        let n = points.len();
        let mut ring = Self {
            points,
            prev: (0..n).map(|i| (i + n - 1) % n).collect(),
            next: (0..n).map(|i| (i + 1) % n).collect(),
            clipped: vec![false; n],
            ears: vec![None; n],
        };

        for i in 0..n {
            ring.classify(i)?;
        }

        Some(ring)
    }

    /// Decides whether the vertex `i` is an ear: a convex corner whose triangle with its two
    /// neighbors contains no other vertex.
    ///
    /// Fails on coincident vertices.
    fn classify(&mut self, i: usize) -> Option<()> {
        let (prev, next) = (self.prev[i], self.next[i]);
        let [p0, p1, p2] = [prev, i, next].map(|k| self.points[k]);

        let pointiness = (p0 - p1).normalize().dot(&(p2 - p1).normalize());
        if pointiness.is_nan() {
            return None;
        }

        let mut is_ear = corner_direction(&p0, &p1, &p2) == Orientation::Ccw;
        if is_ear {
            for (k, pt) in self.points.iter().enumerate() {
                if k != prev && k != i && k != next && is_point_in_triangle(pt, &p0, &p1, &p2)? {
                    is_ear = false;
                    break;
                }
            }
        }

        self.ears[i] = is_ear.then_some(pointiness);
        Some(())
    }

    /// Removes the pointiest ear, returning its triangle.
    fn clip_pointiest_ear(&mut self) -> Option<[u32; 3]> {
        let (tip, _) = self
            .ears
            .iter()
            .enumerate()
            .filter(|(k, _)| !self.clipped[*k])
            .filter_map(|(k, ear)| ear.map(|pointiness| (k, pointiness)))
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        let (prev, next) = (self.prev[tip], self.next[tip]);
        self.clipped[tip] = true;
        self.next[prev] = next;
        self.prev[next] = prev;

        Some([prev as u32, tip as u32, next as u32])
    }
}

/// Triangulates a counterclockwise simple polygon by ear clipping.
///
/// Returns `None` for clockwise or self-intersecting polygons, and polygons with repeated
/// vertices.
pub fn triangulate_ear_clipping(vertices: &[Point2<Real>]) -> Option<Vec<[u32; 3]>> {
    let n = vertices.len();

    match n {
        0..=2 => return None,
        3 => {
            let ccw = corner_direction(&vertices[0], &vertices[1], &vertices[2]) == Orientation::Ccw;
            return ccw.then(|| vec![[0, 1, 2]]);
        }
        _ => {}
    }

    let mut ring = Ring::new(vertices)?;
    let mut triangles = Vec::with_capacity(n - 2);

    for remaining in (4..=n).rev() {
        let tri = ring.clip_pointiest_ear()?;
        triangles.push(tri);

        // The last three vertices always form a valid triangle.
        if remaining > 4 {
            ring.classify(tri[0] as usize)?;
            ring.classify(tri[2] as usize)?;
        }
    }

    let last = (0..n).find(|k| !ring.clipped[*k])?;
    triangles.push([ring.prev[last] as u32, last as u32, ring.next[last] as u32]);

    Some(triangles)
}

/// The normal of a planar 3D polygon by Newell's method.
///
/// It follows the winding of the polygon (right-hand rule) and its norm is twice the area of
/// the polygon. Concave and slightly warped polygons are fine.
pub fn newell_normal(polygon: &[Point<Real>]) -> Vector<Real> {
    polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .fold(Vector::zeros(), |acc, (p, q)| {
            acc + Vector::new(
                (p.y - q.y) * (p.z + q.z),
                (p.z - q.z) * (p.x + q.x),
                (p.x - q.x) * (p.y + q.y),
            )
        })
}

/// Drops the `axis`-th coordinate of `point`.
///
/// The two others are kept in cyclic order, so a polygon whose normal points toward `+axis`
/// projects to a counterclockwise polygon.
#[inline]
pub fn project_dropping_axis(point: &Point<Real>, axis: usize) -> Point2<Real> {
    Point2::new(point[(axis + 1) % 3], point[(axis + 2) % 3])
}

/// Triangulates a simple 3D polygon without changing its winding.
///
/// The polygon is ear-clipped in the coordinate plane closest to its own plane. Polygons that
/// cannot be ear-clipped are fanned around their first vertex. Indices refer to `polygon`.
pub fn triangulate_polygon(polygon: &[Point<Real>]) -> Vec<[u32; 3]> {
    let n = polygon.len();
    match n {
        0..=2 => return vec![],
        3 => return vec![[0, 1, 2]],
        _ => {}
    }

    let axis = newell_normal(polygon).iamax();
    let mut projected: Vec<_> = polygon
        .iter()
        .map(|pt| project_dropping_axis(pt, axis))
        .collect();

    // Ear clipping wants a counterclockwise polygon.
    let flipped = signed_area_2(&projected) < 0.0;
    if flipped {
        projected.reverse();
    }

    let Some(triangles) = triangulate_ear_clipping(&projected) else {
        log::debug!("ear clipping failed on a polygon with {n} vertices, using a fan");
        return (1..n as u32 - 1).map(|i| [0, i, i + 1]).collect();
    };

    if flipped {
        let last = n as u32 - 1;
        triangles
            .into_iter()
            .map(|[a, b, c]| [last - a, last - c, last - b])
            .collect()
    } else {
        triangles
    }
}
