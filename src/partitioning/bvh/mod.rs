//! Binned-SAH bounding volume hierarchy over indexed boxes.

pub use bvh_traverse::{BvhLeafCost, Leaves};
pub use bvh_tree::{Bvh, BvhNode};

mod bvh_build;
mod bvh_traverse;
mod bvh_tree;

#[cfg(test)]
mod bvh_tests;
