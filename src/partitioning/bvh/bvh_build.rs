use super::{Bvh, BvhNode};
use crate::bounding_volume::Aabb;
use crate::math::Real;

const BIN_COUNT: usize = 8;

impl Bvh {
    /// Splits `leaves` in two and stores both halves, built recursively, at `pair_id`.
    pub(super) fn build_pair(&mut self, pair_id: u32, leaves: &mut [BvhNode]) {
        debug_assert!(leaves.len() > 1);
        let mid = sah_split(leaves);
        let (left, right) = leaves.split_at_mut(mid);
        let pair = [self.build_subtree(left), self.build_subtree(right)];
        self.pairs[pair_id as usize] = pair;
    }

    fn build_subtree(&mut self, leaves: &mut [BvhNode]) -> BvhNode {
        if let [leaf] = leaves {
            return *leaf;
        }

        let pair_id = self.pairs.len() as u32;
        self.pairs.push([BvhNode::unused(); 2]);
        self.build_pair(pair_id, leaves);
        BvhNode::parent_of(&self.pairs[pair_id as usize], pair_id)
    }
}

/// Reorders `leaves` so that `leaves[..mid]` and `leaves[mid..]` are the two halves of the
/// cheapest binned split, and returns `mid`.
///
/// Leaves are binned by centroid along the axis where centroids spread the most. The split
/// minimizes the surface area heuristic among the `BIN_COUNT - 1` planes between bins, see
/// "On fast Construction of SAH-based Bounding Volume Hierarchies", Ingo Wald.
fn sah_split(leaves: &mut [BvhNode]) -> usize {
    let centroids = Aabb::from_points(leaves.iter().map(|leaf| leaf.aabb.center()));
    let axis = centroids.extents().imax();
    let origin = centroids.mins[axis];
    let width = centroids.extents()[axis];

    if width <= 0.0 {
        // Every centroid is at the same place.
        return leaves.len() / 2;
    }

    let scale = BIN_COUNT as Real * (1.0 - 1.0e-5) / width;
    let bin_of = |leaf: &BvhNode| {
        (((leaf.aabb.center()[axis] - origin) * scale) as usize).min(BIN_COUNT - 1)
    };

    let mut bins = [Bin::default(); BIN_COUNT];
    for leaf in leaves.iter() {
        bins[bin_of(leaf)].add_leaf(&leaf.aabb);
    }

    // Cost of the right half when the split happens just before bin `i`.
    let mut right_costs = [0.0; BIN_COUNT];
    let mut right = Bin::default();
    for i in (1..BIN_COUNT).rev() {
        right.add_bin(&bins[i]);
        right_costs[i] = right.cost();
    }

    let mut left = Bin::default();
    let mut best_cost = Real::MAX;
    let mut best_plane = 0;
    let mut mid = 0;
    for i in 0..BIN_COUNT - 1 {
        left.add_bin(&bins[i]);
        let cost = left.cost() + right_costs[i + 1];
        if cost < best_cost {
            best_cost = cost;
            best_plane = i;
            mid = left.count;
        }
    }

    if mid == 0 || mid == leaves.len() {
        return leaves.len() / 2;
    }

    leaves.sort_unstable_by_key(|leaf| bin_of(leaf) > best_plane);
    mid
}

#[derive(Copy, Clone, Debug)]
struct Bin {
    aabb: Aabb,
    count: usize,
}

impl Default for Bin {
    fn default() -> Self {
        Self {
            aabb: Aabb::new_invalid(),
            count: 0,
        }
    }
}

impl Bin {
    fn add_leaf(&mut self, aabb: &Aabb) {
        self.aabb.merge(aabb);
        self.count += 1;
    }

    fn add_bin(&mut self, other: &Bin) {
        self.aabb.merge(&other.aabb);
        self.count += other.count;
    }

    fn cost(&self) -> Real {
        if self.count == 0 {
            0.0
        } else {
            self.aabb.half_area() * self.count as Real
        }
    }
}
