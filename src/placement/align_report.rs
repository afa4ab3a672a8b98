use crate::math::Real;
use core::fmt;

/// Why an object was left in place by an alignment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum SkipReason {
    /// The object's mesh has no vertex.
    NoVertices,
    /// There is no terrain below the object's lowest vertex, at `(x, y)`.
    OutsideTerrain {
        /// World `X` coordinate of the lowest vertex.
        x: Real,
        /// World `Y` coordinate of the lowest vertex.
        y: Real,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVertices => write!(f, "no vertices"),
            Self::OutsideTerrain { x, y } => {
                write!(f, "no terrain below ({x:.3}, {y:.3}), outside terrain bounds")
            }
        }
    }
}

/// An object moved by an alignment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MovedObject {
    /// The object's name.
    pub name: String,
    /// The vertical translation applied to the object.
    pub delta: Real,
}

/// An object left in place by an alignment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SkippedObject {
    /// The object's name.
    pub name: String,
    /// Why it was not moved.
    pub reason: SkipReason,
}

/// The outcome of an alignment, in the order the objects were processed.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct AlignReport {
    /// The objects that were moved.
    pub moved: Vec<MovedObject>,
    /// The objects that were left in place.
    pub skipped: Vec<SkippedObject>,
}

impl AlignReport {
    /// The number of objects moved.
    #[inline]
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    /// The number of objects left in place.
    #[inline]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// One human-readable line per skipped object.
    pub fn messages(&self) -> Vec<String> {
        self.skipped
            .iter()
            .map(|skipped| format!("Skipped '{}' ({})", skipped.name, skipped.reason))
            .collect()
    }
}

impl fmt::Display for AlignReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Buildings moved: {}, skipped: {}",
            self.moved_count(),
            self.skipped_count()
        )
    }
}

#[cfg(test)]
mod test {
    use super::{AlignReport, MovedObject, SkipReason, SkippedObject};

    #[test]
    fn report_summarizes_moves_and_skips() {
        let report = AlignReport {
            moved: vec![MovedObject {
                name: "house".to_string(),
                delta: -5.0,
            }],
            skipped: vec![
                SkippedObject {
                    name: "far".to_string(),
                    reason: SkipReason::OutsideTerrain { x: 200.0, y: 200.0 },
                },
                SkippedObject {
                    name: "empty".to_string(),
                    reason: SkipReason::NoVertices,
                },
            ],
        };

        assert_eq!(report.to_string(), "Buildings moved: 1, skipped: 2");
        assert_eq!(
            report.messages(),
            [
                "Skipped 'far' (no terrain below (200.000, 200.000), outside terrain bounds)",
                "Skipped 'empty' (no vertices)",
            ]
        );
    }
}
