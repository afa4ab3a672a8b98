use crate::bounding_volume::Aabb;
use crate::math::Real;
use crate::query::{Ray, RayCast};

/// A node of a [`Bvh`], either a leaf or the root of a subtree.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BvhNode {
    pub(super) aabb: Aabb,
    /// The index given to the leaf at construction, or the index of the pair of children of
    /// an internal node.
    pub(super) target: u32,
    /// Number of leaves below this node. Zero marks the unused slot of a single-leaf tree.
    pub(super) leaf_count: u32,
}

impl BvhNode {
    #[inline]
    pub(super) fn unused() -> Self {
        Self {
            aabb: Aabb::new_invalid(),
            target: u32::MAX,
            leaf_count: 0,
        }
    }

    #[inline]
    pub(super) fn leaf(aabb: Aabb, index: u32) -> Self {
        Self {
            aabb,
            target: index,
            leaf_count: 1,
        }
    }

    /// The node whose children are `pair`, stored at `pair_id`.
    #[inline]
    pub(super) fn parent_of(pair: &[BvhNode; 2], pair_id: u32) -> Self {
        Self {
            aabb: pair[0].aabb.merged(&pair[1].aabb),
            target: pair_id,
            leaf_count: pair[0].leaf_count + pair[1].leaf_count,
        }
    }

    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.leaf_count == 1
    }

    /// The number of leaves below this node.
    #[inline]
    pub fn leaf_count(&self) -> u32 {
        self.leaf_count
    }

    /// The bounding box of every leaf below this node.
    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// The time at which `ray` enters this node's box, or `Real::MAX` if it misses it before
    /// `max_time_of_impact`.
    pub fn cast_ray(&self, ray: &Ray, max_time_of_impact: Real) -> Real {
        self.aabb
            .cast_local_ray(ray, max_time_of_impact, true)
            .unwrap_or(Real::MAX)
    }
}

/// A bounding volume hierarchy over a fixed set of boxes, each identified by its index.
///
/// Nodes are stored by pairs of siblings, the pair at index 0 holding the children of the root.
/// The tree cannot be updated: rebuild it when the indexed geometry changes.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Bvh {
    pub(super) pairs: Vec<[BvhNode; 2]>,
}

impl Bvh {
    /// A tree without any leaf.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree over `leaves`, the leaf `leaves[i]` getting the index `i`.
    pub fn from_leaves(leaves: &[Aabb]) -> Self {
        let mut nodes: Vec<_> = leaves
            .iter()
            .enumerate()
            .map(|(i, aabb)| BvhNode::leaf(*aabb, i as u32))
            .collect();
        let mut result = Self::new();

        match nodes.as_slice() {
            [] => {}
            [single] => result.pairs.push([*single, BvhNode::unused()]),
            [a, b] => result.pairs.push([*a, *b]),
            _ => {
                result.pairs.reserve(nodes.len() - 1);
                result.pairs.push([BvhNode::unused(); 2]);
                result.build_pair(0, &mut nodes);
            }
        }

        result
    }

    /// The non-empty children of the root.
    pub(super) fn root_nodes(&self) -> impl DoubleEndedIterator<Item = &BvhNode> {
        self.pairs
            .first()
            .into_iter()
            .flatten()
            .filter(|node| node.leaf_count > 0)
    }

    /// The box enclosing every leaf, or an invalid box if the tree is empty.
    pub fn root_aabb(&self) -> Aabb {
        self.root_nodes()
            .fold(Aabb::new_invalid(), |acc, node| acc.merged(&node.aabb))
    }

    /// Does this tree have no leaf?
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The number of leaves of this tree.
    pub fn leaf_count(&self) -> u32 {
        self.root_nodes().map(|node| node.leaf_count).sum()
    }
}
