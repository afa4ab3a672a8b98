use super::{Bvh, BvhNode};
use crate::bounding_volume::Aabb;
use crate::math::Real;
use crate::query::Ray;
use smallvec::SmallVec;

const STACK_SIZE: usize = 32;

/// Iterator over the leaves of a [`Bvh`] reached without failing a node check.
///
/// Created by [`Bvh::leaves`].
pub struct Leaves<'a, Check: Fn(&BvhNode) -> bool> {
    bvh: &'a Bvh,
    stack: SmallVec<[&'a BvhNode; STACK_SIZE]>,
    check: Check,
}

impl<'a, Check: Fn(&BvhNode) -> bool> Iterator for Leaves<'a, Check> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while let Some(node) = self.stack.pop() {
            if !(self.check)(node) {
                continue;
            }

            if node.is_leaf() {
                return Some(node.target);
            }

            let [left, right] = &self.bvh.pairs[node.target as usize];
            self.stack.push(right);
            self.stack.push(left);
        }

        None
    }
}

/// The value minimized by [`Bvh::closest_leaf`].
pub trait BvhLeafCost {
    /// The cost of the leaf this value was computed for.
    fn cost(&self) -> Real;
}

impl BvhLeafCost for Real {
    #[inline]
    fn cost(&self) -> Real {
        *self
    }
}

impl Bvh {
    /// The indices of the leaves whose every ancestor, and the leaf itself, pass `check`.
    ///
    /// A node failing the check prunes its whole subtree. Leaves come in depth-first order.
    pub fn leaves<Check: Fn(&BvhNode) -> bool>(&self, check: Check) -> Leaves<'_, Check> {
        let mut stack = SmallVec::new();
        stack.extend(self.root_nodes().rev());
        Leaves {
            bvh: self,
            stack,
            check,
        }
    }

    /// The indices of the leaves whose box intersects `aabb`.
    pub fn intersect_aabb<'a>(&'a self, aabb: &'a Aabb) -> impl Iterator<Item = u32> + 'a {
        self.leaves(move |node| node.aabb.intersects(aabb))
    }

    /// Finds the leaf of lowest cost.
    ///
    /// `node_bound` gives a lower bound of the cost of every leaf below a node, or `Real::MAX`
    /// if none of them can beat the best cost found so far, passed as its second argument.
    /// `leaf_cost` evaluates a leaf, returning `None` to ignore it.
    ///
    /// Only costs strictly smaller than `max_cost` are considered. Among leaves of equal cost,
    /// the one with the smallest index wins, whatever the shape of the tree.
    pub fn closest_leaf<C: BvhLeafCost>(
        &self,
        max_cost: Real,
        node_bound: impl Fn(&BvhNode, Real) -> Real,
        leaf_cost: impl Fn(u32, Real) -> Option<C>,
    ) -> Option<(u32, C)> {
        let mut best: Option<(u32, C)> = None;
        let mut best_cost = max_cost;
        let mut stack: SmallVec<[(Real, &BvhNode); STACK_SIZE]> = SmallVec::new();

        for node in self.root_nodes().rev() {
            stack.push((node_bound(node, best_cost), node));
        }

        while let Some((bound, node)) = stack.pop() {
            // A subtree bounded exactly by the best cost may still hold a smaller leaf index.
            let reachable = bound != Real::MAX
                && (bound < best_cost || (bound == best_cost && best.is_some()));
            if !reachable {
                continue;
            }

            if node.is_leaf() {
                let Some(value) = leaf_cost(node.target, best_cost) else {
                    continue;
                };
                let cost = value.cost();
                let wins = match &best {
                    None => cost < best_cost,
                    Some((best_id, _)) => {
                        cost < best_cost || (cost == best_cost && node.target < *best_id)
                    }
                };

                if wins {
                    best_cost = cost;
                    best = Some((node.target, value));
                }
            } else {
                let [left, right] = &self.pairs[node.target as usize];
                let left = (node_bound(left, best_cost), left);
                let right = (node_bound(right, best_cost), right);

                // The most promising child is popped first.
                if left.0 <= right.0 {
                    stack.push(right);
                    stack.push(left);
                } else {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }

        best
    }

    /// Casts `ray` on the leaves, `leaf_toi` computing the time of impact with a single leaf.
    ///
    /// The second argument of `leaf_toi` is the time of impact of the closest hit found so far,
    /// or `max_time_of_impact`. Returns the index of the leaf hit first, ties going to the
    /// smallest index.
    pub fn cast_ray(
        &self,
        ray: &Ray,
        max_time_of_impact: Real,
        leaf_toi: impl Fn(u32, Real) -> Option<Real>,
    ) -> Option<(u32, Real)> {
        self.closest_leaf(
            max_time_of_impact,
            |node, best_so_far| node.cast_ray(ray, best_so_far),
            leaf_toi,
        )
    }
}
