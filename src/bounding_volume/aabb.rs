//! Axis Aligned Bounding Box.

use crate::math::{Point, Real, Vector};

/// An Axis-Aligned Bounding Box (AABB).
///
/// A box is valid when `mins[i] <= maxs[i]` on every axis. The box returned by
/// [`Aabb::new_invalid`] is the empty box: merging it with any other box yields that other box.
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct Aabb {
    /// The point with the smallest coordinates on each axis.
    pub mins: Point<Real>,
    /// The point with the largest coordinates on each axis.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a box from its two extreme corners.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// The empty box, with `mins` at `Real::MAX` and `maxs` at `-Real::MAX`.
    #[inline]
    pub fn new_invalid() -> Self {
        let far = Vector::repeat(Real::MAX);
        Self::new(far.into(), (-far).into())
    }

    /// The box centered at `center`, extending by `half_extents` on each side.
    #[inline]
    pub fn from_half_extents(center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// The smallest box enclosing every point yielded by `pts`.
    ///
    /// Empty inputs give [`Aabb::new_invalid`].
    pub fn from_points<I>(pts: I) -> Self
    where
        I: IntoIterator<Item = Point<Real>>,
    {
        pts.into_iter().fold(Self::new_invalid(), |mut aabb, pt| {
            aabb.take_point(pt);
            aabb
        })
    }

    /// Same as [`Aabb::from_points`], from borrowed points.
    pub fn from_points_ref<'a, I>(pts: I) -> Self
    where
        I: IntoIterator<Item = &'a Point<Real>>,
    {
        Self::from_points(pts.into_iter().copied())
    }

    /// Is this box non-empty?
    #[inline]
    pub fn is_valid(&self) -> bool {
        na::partial_le(&self.mins, &self.maxs)
    }

    /// The center of this box.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The side lengths of this box.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// Half the side lengths of this box.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        self.extents() * 0.5
    }

    /// Half of the surface area of this box.
    ///
    /// This is the cost measure of the BVH builder. It stays meaningful for the flat boxes of
    /// horizontal terrain triangles, which have no volume.
    #[inline]
    pub fn half_area(&self) -> Real {
        let e = self.extents();
        e.x * e.y + e.y * e.z + e.z * e.x
    }

    /// The length of the diagonal of this box.
    #[inline]
    pub fn diagonal_length(&self) -> Real {
        self.extents().norm()
    }

    /// Grows this box so it also encloses `pt`.
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.inf(&pt);
        self.maxs = self.maxs.sup(&pt);
    }

    /// Grows this box so it also encloses `other`.
    #[inline]
    pub fn merge(&mut self, other: &Aabb) {
        *self = self.merged(other);
    }

    /// The smallest box enclosing both `self` and `other`.
    #[inline]
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.mins.inf(&other.mins), self.maxs.sup(&other.maxs))
    }

    /// This box grown by `margin` on every side.
    #[inline]
    pub fn loosened(&self, margin: Real) -> Aabb {
        debug_assert!(margin >= 0.0, "negative loosening margin");
        let delta = Vector::repeat(margin);
        Aabb::new(self.mins - delta, self.maxs + delta)
    }

    /// Do `self` and `other` overlap, boundaries included?
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.maxs) && na::partial_ge(&self.maxs, &other.mins)
    }

    /// Is `other` entirely inside `self`?
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.mins) && na::partial_ge(&self.maxs, &other.maxs)
    }

    /// Is `point` inside this box, boundary included?
    #[inline]
    pub fn contains_local_point(&self, point: &Point<Real>) -> bool {
        na::partial_le(&self.mins, point) && na::partial_ge(&self.maxs, point)
    }

    /// Does the vertical line through `(x, y)` cross this box?
    #[inline]
    pub fn contains_xy(&self, x: Real, y: Real) -> bool {
        (self.mins.x..=self.maxs.x).contains(&x) && (self.mins.y..=self.maxs.y).contains(&y)
    }
}
