//! Dropping objects onto a terrain.

pub use self::align_error::AlignError;
pub use self::align_report::{AlignReport, MovedObject, SkipReason, SkippedObject};
pub use self::building_aligner::{align_buildings, align_objects, alignment_delta, AlignConfig};

mod align_error;
mod align_report;
mod building_aligner;
