use crate::common::{grid_terrain, random_terrain, translation};
use oorandom::Rand64;
use terracarve3d::math::{Affine, Real};
use terracarve3d::query::TerrainHeightQuery;

#[test]
fn height_stays_within_terrain_range() {
    for seed in 0..8 {
        let mut rng = Rand64::new(seed);
        let mesh = random_terrain(&mut rng, 12, 100.0, [-20.0, 30.0]);
        let pose = translation(-50.0, 10.0, 5.0);
        let terrain = TerrainHeightQuery::new(&mesh, &pose).unwrap();
        let aabb = *terrain.aabb();

        for _ in 0..200 {
            let x = -50.0 + 100.0 * rng.rand_float() as Real;
            let y = 10.0 + 100.0 * rng.rand_float() as Real;
            let height = terrain
                .height_at(x, y)
                .unwrap_or_else(|| panic!("no terrain below ({x}, {y}), seed {seed}"));
            assert!(
                height >= aabb.mins.z && height <= aabb.maxs.z,
                "height {height} at ({x}, {y}) outside of [{}, {}]",
                aabb.mins.z,
                aabb.maxs.z
            );
        }
    }
}

#[test]
fn no_height_outside_the_footprint() {
    let mut rng = Rand64::new(42);
    let mesh = random_terrain(&mut rng, 6, 100.0, [0.0, 10.0]);
    let terrain = TerrainHeightQuery::new(&mesh, &Affine::identity()).unwrap();

    for _ in 0..100 {
        let along = 100.0 * rng.rand_float() as Real;
        let away = 1.0e-3 + 50.0 * rng.rand_float() as Real;
        assert_eq!(terrain.height_at(-away, along), None);
        assert_eq!(terrain.height_at(100.0 + away, along), None);
        assert_eq!(terrain.height_at(along, -away), None);
        assert_eq!(terrain.height_at(along, 100.0 + away), None);
    }
}

#[test]
fn height_follows_planar_terrain() {
    let mesh = grid_terrain(10, 100.0, |x, y| 0.3 * x - 0.1 * y + 7.0);
    let terrain = TerrainHeightQuery::new(&mesh, &Affine::identity()).unwrap();
    let mut rng = Rand64::new(7);

    for _ in 0..200 {
        let x = 100.0 * rng.rand_float() as Real;
        let y = 100.0 * rng.rand_float() as Real;
        assert_relative_eq!(
            terrain.height_at(x, y).unwrap(),
            0.3 * x - 0.1 * y + 7.0,
            epsilon = 1.0e-9
        );
    }
}

#[test]
fn repeated_queries_are_bit_identical() {
    let mut rng = Rand64::new(3);
    let mesh = random_terrain(&mut rng, 9, 90.0, [-5.0, 5.0]);
    let first = TerrainHeightQuery::new(&mesh, &Affine::identity()).unwrap();
    let second = TerrainHeightQuery::new(&mesh, &Affine::identity()).unwrap();

    // Grid vertices and cell edges are shared by several triangles.
    for i in 0..=90 {
        let (x, y) = (i as Real, (i * 7 % 91) as Real);
        let hit = first.hit_at(x, y);
        assert_eq!(hit, first.hit_at(x, y));
        assert_eq!(hit, second.hit_at(x, y));
    }
}
