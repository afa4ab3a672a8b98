//! Orientation predicates on the plane.

use crate::math::{Point2, Real};

/// The turn made when walking along three points, or the winding of a polygon.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum Orientation {
    /// Counter-clockwise, a left turn.
    Ccw,
    /// Clockwise, a right turn.
    Cw,
    /// The points are aligned, or some coordinate is NaN.
    None,
}

/// The turn made at `p2` when walking from `p1` to `p3`.
pub fn corner_direction(p1: &Point2<Real>, p2: &Point2<Real>, p3: &Point2<Real>) -> Orientation {
    let turn = (p2 - p1).perp(&(p3 - p2));

    if turn > 0.0 {
        Orientation::Ccw
    } else if turn < 0.0 {
        Orientation::Cw
    } else {
        Orientation::None
    }
}

/// Twice the signed area of a polygon, positive when it is counter-clockwise.
pub fn signed_area_2(polygon: &[Point2<Real>]) -> Real {
    polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(p, q)| p.x * q.y - q.x * p.y)
        .sum()
}

/// Is `p` inside the triangle `v1 v2 v3`, boundary included, whatever its winding?
///
/// Returns `None` when `p` is aligned with every edge, which only happens for triangles
/// collapsed to a segment or a point.
pub fn is_point_in_triangle(
    p: &Point2<Real>,
    v1: &Point2<Real>,
    v2: &Point2<Real>,
    v3: &Point2<Real>,
) -> Option<bool> {
    let turns = [
        corner_direction(p, v1, v2),
        corner_direction(p, v2, v3),
        corner_direction(p, v3, v1),
    ];

    if turns.iter().all(|turn| *turn == Orientation::None) {
        return None;
    }

    let straddles = turns.contains(&Orientation::Cw) && turns.contains(&Orientation::Ccw);
    Some(!straddles)
}
