//! Spatial partitioning tools.

pub use self::bvh::{Bvh, BvhLeafCost, BvhNode};

pub mod bvh;
