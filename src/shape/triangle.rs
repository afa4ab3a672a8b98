//! Definition of the triangle shape.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use na::Unit;

/// A triangle, counterclockwise when seen from the side its normal points to.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Triangle {
    /// First vertex.
    pub a: Point<Real>,
    /// Second vertex.
    pub b: Point<Real>,
    /// Third vertex.
    pub c: Point<Real>,
}

impl From<[Point<Real>; 3]> for Triangle {
    fn from([a, b, c]: [Point<Real>; 3]) -> Self {
        Triangle::new(a, b, c)
    }
}

impl Triangle {
    /// Creates a triangle from its three vertices.
    #[inline]
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>) -> Triangle {
        Triangle { a, b, c }
    }

    /// The vertices `[a, b, c]`.
    #[inline]
    pub fn vertices(&self) -> [Point<Real>; 3] {
        [self.a, self.b, self.c]
    }

    /// `AB × AC`, whose norm is twice the area of the triangle.
    #[inline]
    pub fn scaled_normal(&self) -> Vector<Real> {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    /// The unit normal, `None` for degenerate triangles.
    #[inline]
    pub fn normal(&self) -> Option<Unit<Vector<Real>>> {
        Unit::try_new(self.scaled_normal(), DEFAULT_EPSILON)
    }

    /// The centroid of the triangle.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        Point::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }

    /// The bounding box of the three vertices.
    #[inline]
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_points(self.vertices())
    }

    /// Is the height of this triangle over its longest edge at most `eps`?
    ///
    /// Triangles with coincident vertices are always thin.
    pub fn is_thinner_than(&self, eps: Real) -> bool {
        let longest = [self.b - self.a, self.c - self.b, self.a - self.c]
            .iter()
            .map(|edge| edge.norm())
            .fold(0.0, Real::max);
        self.scaled_normal().norm() <= eps * longest
    }

    /// The lowest and highest elevations of the vertices.
    #[inline]
    pub fn z_range(&self) -> [Real; 2] {
        let [a, b, c] = [self.a.z, self.b.z, self.c.z];
        [a.min(b).min(c), a.max(b).max(c)]
    }

    /// The signed volume of the tetrahedron joining this triangle to the origin.
    ///
    /// Summing it over a closed mesh whose normals point outward gives the enclosed volume.
    #[inline]
    pub fn signed_volume_from_origin(&self) -> Real {
        self.a.coords.dot(&self.b.coords.cross(&self.c.coords)) / 6.0
    }
}
