use crate::math::{Point, Real};

/// A point compared and hashed through the bit patterns of its coordinates.
///
/// Two keys are equal iff the points are bit-identical, `-0.0` and `0.0` being identified.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct PointKey([u64; 3]);

impl PointKey {
    /// The key of `point`.
    #[allow(clippy::unnecessary_cast)]
    pub fn new(point: &Point<Real>) -> Self {
        // Adding zero turns -0.0 into 0.0.
        Self([0, 1, 2].map(|i| (point[i] + 0.0).to_bits() as u64))
    }
}
