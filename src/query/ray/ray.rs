//! Rays and ray-casting results.

use crate::math::{Point, Real, Vector};
use crate::partitioning::BvhLeafCost;

/// A half-line starting at `origin` and going along `dir`.
///
/// The point at time `t ≥ 0` is `origin + dir * t`. With a non-unit `dir`, times of impact are
/// not distances.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct Ray {
    /// Starting point of the ray.
    pub origin: Point<Real>,
    /// Direction of the ray.
    pub dir: Vector<Real>,
}

impl Ray {
    /// Creates a ray starting at `origin` and going along `dir`.
    pub fn new(origin: Point<Real>, dir: Vector<Real>) -> Ray {
        Ray { origin, dir }
    }

    /// The unit ray going straight down (`-Z`) from `(x, y, z)`.
    ///
    /// Its times of impact are the drops in elevation from `z`.
    #[inline]
    pub fn downward(x: Real, y: Real, z: Real) -> Ray {
        Ray::new(Point::new(x, y, z), -Vector::z())
    }

    /// The point of this ray at time `t`.
    #[inline]
    pub fn point_at(&self, t: Real) -> Point<Real> {
        self.origin + self.dir * t
    }
}

/// Where a ray hits a shape.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RayIntersection {
    /// The time at which the ray hits the shape, see [`Ray::point_at`].
    pub time_of_impact: Real,

    /// The unit normal of the shape at the hit point, facing the ray's origin.
    pub normal: Vector<Real>,

    /// Barycentric coordinates of the hit point, relative to the vertices of the triangle that
    /// was hit. `None` for other shapes.
    pub barycentric: Option<Vector<Real>>,
}

impl RayIntersection {
    /// A hit at `time_of_impact` on a surface of normal `normal`, without barycentric
    /// coordinates.
    #[inline]
    pub fn new(time_of_impact: Real, normal: Vector<Real>) -> RayIntersection {
        RayIntersection {
            time_of_impact,
            normal,
            barycentric: None,
        }
    }
}

impl BvhLeafCost for RayIntersection {
    #[inline]
    fn cost(&self) -> Real {
        self.time_of_impact
    }
}

/// Shapes that can be hit by a ray expressed in their local frame.
pub trait RayCast {
    /// The time of impact of `ray` with this shape, if it is at most `max_time_of_impact`.
    ///
    /// With `solid` set, a ray starting inside a solid shape hits it at time zero.
    fn cast_local_ray(&self, ray: &Ray, max_time_of_impact: Real, solid: bool) -> Option<Real> {
        self.cast_local_ray_and_get_normal(ray, max_time_of_impact, solid)
            .map(|inter| inter.time_of_impact)
    }

    /// Same as [`RayCast::cast_local_ray`], also returning the normal at the hit point.
    fn cast_local_ray_and_get_normal(
        &self,
        ray: &Ray,
        max_time_of_impact: Real,
        solid: bool,
    ) -> Option<RayIntersection>;
}
