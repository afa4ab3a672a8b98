use super::{Bvh, BvhNode};
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::query::{Ray, RayCast};
use std::collections::HashSet;

fn diagonal_aabbs(len: usize) -> Vec<Aabb> {
    (0..len)
        .map(|i| Aabb::from_half_extents(Vector::repeat(i as Real).into(), Vector::repeat(1.0)))
        .collect()
}

/// Flat boxes laid out like the triangles of a terrain patch, ten per row.
fn grid_aabbs(len: usize) -> Vec<Aabb> {
    (0..len)
        .map(|i| {
            let center = Point::new((i % 10) as Real, (i / 10) as Real, 0.0);
            Aabb::from_half_extents(center, Vector::new(0.5, 0.5, 0.0))
        })
        .collect()
}

/// Checks that every pair is reached once, every leaf index appears once, and every internal
/// node encloses its children. Returns the number of leaves below `node`.
fn check_subtree(
    bvh: &Bvh,
    node: &BvhNode,
    pairs: &mut HashSet<u32>,
    leaves: &mut HashSet<u32>,
) -> u32 {
    if node.is_leaf() {
        assert!(leaves.insert(node.target), "leaf {} found twice", node.target);
        return 1;
    }

    assert!(pairs.insert(node.target), "pair {} reached twice", node.target);
    let mut count = 0;
    for child in &bvh.pairs[node.target as usize] {
        assert!(node.aabb.contains(&child.aabb));
        count += check_subtree(bvh, child, pairs, leaves);
    }
    assert_eq!(count, node.leaf_count);
    count
}

fn assert_well_formed(bvh: &Bvh, len: usize) {
    let mut pairs = HashSet::from([0]);
    let mut leaves = HashSet::new();
    let count: u32 = bvh
        .root_nodes()
        .map(|node| check_subtree(bvh, node, &mut pairs, &mut leaves))
        .sum();

    assert_eq!(count as usize, len);
    assert_eq!(bvh.leaf_count() as usize, len);
    if len > 0 {
        assert_eq!(pairs.len(), bvh.pairs.len());
    }
}

#[test]
fn bvh_build_is_well_formed() {
    for len in 0..=100 {
        for leaves in [diagonal_aabbs(len), grid_aabbs(len)] {
            let bvh = Bvh::from_leaves(&leaves);
            assert_well_formed(&bvh, len);

            let mut all_leaves: Vec<_> = bvh.leaves(|_| true).collect();
            all_leaves.sort_unstable();
            assert_eq!(all_leaves, (0..len as u32).collect::<Vec<_>>());
        }
    }
}

#[test]
fn bvh_build_with_coincident_centroids() {
    let leaves = vec![Aabb::from_half_extents(Point::origin(), Vector::repeat(1.0)); 13];
    let bvh = Bvh::from_leaves(&leaves);
    assert_well_formed(&bvh, 13);
}

#[test]
fn bvh_root_aabb_encloses_all_leaves() {
    let leaves = grid_aabbs(37);
    let bvh = Bvh::from_leaves(&leaves);
    let root = bvh.root_aabb();

    for leaf in &leaves {
        assert!(root.contains(leaf));
    }
    assert!(!Bvh::new().root_aabb().is_valid());
}

#[test]
fn bvh_intersect_aabb() {
    let leaves = grid_aabbs(100);
    let bvh = Bvh::from_leaves(&leaves);
    let query = Aabb::new(Point::new(2.2, 3.2, -1.0), Point::new(3.8, 3.8, 1.0));

    let mut found: Vec<_> = bvh.intersect_aabb(&query).collect();
    found.sort_unstable();
    // Columns 2 to 4 of rows 3 and 4.
    assert_eq!(found, vec![32, 33, 34, 42, 43, 44]);
}

#[test]
fn bvh_closest_leaf_breaks_ties_with_lowest_index() {
    // Every leaf is stacked at the same place, so all of them are hit at the same time.
    let leaves = vec![diagonal_aabbs(4)[3]; 17];
    let bvh = Bvh::from_leaves(&leaves);
    let ray = Ray::new(Point::new(3.0, 3.0, 10.0), -Vector::z());

    let hit = bvh.cast_ray(&ray, Real::MAX, |leaf, _| {
        if leaf < 5 {
            None
        } else {
            leaves[leaf as usize].cast_local_ray(&ray, Real::MAX, true)
        }
    });
    assert_eq!(hit.map(|h| h.0), Some(5));
    assert_relative_eq!(hit.unwrap().1, 6.0, epsilon = 1.0e-6);
}

#[test]
fn bvh_cast_ray_respects_max_time_of_impact() {
    let leaves = grid_aabbs(100);
    let bvh = Bvh::from_leaves(&leaves);
    let ray = Ray::new(Point::new(4.1, 4.1, 10.0), -Vector::z());
    let leaf_toi = |leaf: u32, _: Real| leaves[leaf as usize].cast_local_ray(&ray, Real::MAX, true);

    assert_eq!(bvh.cast_ray(&ray, Real::MAX, leaf_toi).map(|h| h.0), Some(44));
    assert!(bvh.cast_ray(&ray, 5.0, leaf_toi).is_none());
}
