use crate::math::{Point2, Real};

/// Clamps a coordinate to the range of values spade accepts.
///
/// Returns 0.0 if the coordinate magnitude is below `spade::MIN_ALLOWED_VALUE`, and saturates at
/// `spade::MAX_ALLOWED_VALUE`.
pub fn sanitize_spade_coord(coord: Real) -> Real {
    let abs = coord.abs();

    #[allow(clippy::unnecessary_cast)]
    if abs as f64 <= spade::MIN_ALLOWED_VALUE {
        return 0.0;
    }

    #[cfg(feature = "f64")]
    if abs > spade::MAX_ALLOWED_VALUE {
        // Unreachable in f32 since its max is 3.40282347E+38.
        return spade::MAX_ALLOWED_VALUE * coord.signum();
    }

    coord
}

/// Converts a point to spade's point type, with coordinates sanitized by
/// [`sanitize_spade_coord`].
pub fn to_spade_point(point: &Point2<Real>) -> spade::Point2<Real> {
    spade::Point2::new(sanitize_spade_coord(point.x), sanitize_spade_coord(point.y))
}
