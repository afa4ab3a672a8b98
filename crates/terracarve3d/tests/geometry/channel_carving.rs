use crate::common::{grid_terrain, shoelace, square, translation};
use terracarve3d::carving::{carve_channel, CarveConfig, CarveError};
use terracarve3d::math::{Point, Real};
use terracarve3d::query::TerrainHeightQuery;
use terracarve3d::scene::{Object, Scene, SurfaceConform};
use terracarve3d::shape::Mesh;

fn slope(x: Real, y: Real) -> Real {
    0.1 * x + 0.05 * y + 3.0
}

/// A channel footprint following the sloped terrain half a unit above it.
fn footprint(outline: &[[Real; 2]]) -> Mesh {
    let vertices = outline
        .iter()
        .map(|[x, y]| Point::new(*x, *y, slope(*x, *y) + 0.5))
        .collect();
    Mesh::from_polygon(vertices).unwrap()
}

fn sloped_scene() -> Scene {
    let mut scene = Scene::new();
    let _ = scene.insert(Object::new("srtm", grid_terrain(8, 100.0, slope)));
    scene
}

const PENTAGON: [[Real; 2]; 5] = [
    [12.3, 17.1],
    [41.7, 9.8],
    [55.2, 33.4],
    [38.9, 52.6],
    [15.4, 44.2],
];

const RECTANGLE: [[Real; 2]; 4] = [[62.1, 61.3], [83.7, 61.3], [83.7, 88.9], [62.1, 88.9]];

#[test]
fn slab_through_hole_matches_the_footprint() {
    let mut scene = Scene::new();
    let _ = scene.insert(Object::new(
        "srtm",
        square([-100.0, -100.0], [100.0, 100.0], 0.0),
    ));
    let _ = scene.insert(Object::new("water", square([0.0, 0.0], [10.0, 10.0], 0.0)));

    let config = CarveConfig::default().with_depth(40.0);
    let report = carve_channel(&mut scene, &config).unwrap();
    assert!(report.thickened);
    assert_relative_eq!(
        report.volume_before - report.volume_after,
        10.0 * 10.0 * 50.0,
        epsilon = 1.0e-3
    );

    let terrain = scene.get("srtm").unwrap();
    let carved = terrain.mesh.triangulate().unwrap();
    assert_eq!(carved.check_manifold(), Ok(()));
    assert_relative_eq!(carved.local_aabb().mins.z, -50.0);
    assert_relative_eq!(carved.local_aabb().maxs.z, 0.0);

    let heights = TerrainHeightQuery::new(&terrain.mesh, &terrain.pose).unwrap();
    for (x, y) in [(0.5, 0.5), (5.0, 5.0), (9.5, 2.0), (2.0, 9.5)] {
        assert_eq!(heights.height_at(x, y), None, "terrain left at ({x}, {y})");
    }
    for (x, y) in [(-0.5, 5.0), (10.5, 5.0), (5.0, -0.5), (5.0, 10.5)] {
        assert_relative_eq!(heights.height_at(x, y).unwrap(), 0.0);
    }
}

#[test]
fn carved_volume_is_footprint_area_times_thickness() {
    let mut scene = sloped_scene();
    let _ = scene.insert(
        Object::new("water", footprint(&PENTAGON))
            .with_surface_conform(SurfaceConform::new("srtm").with_offset(0.5)),
    );

    let report = carve_channel(&mut scene, &CarveConfig::default()).unwrap();
    let area = shoelace(&PENTAGON).abs() / 2.0;
    assert_relative_eq!(
        report.volume_before - report.volume_after,
        area * 50.0,
        max_relative = 1.0e-6
    );

    let carved = scene.get("srtm").unwrap().mesh.triangulate().unwrap();
    assert_eq!(carved.check_manifold(), Ok(()));
    assert_relative_eq!(carved.signed_volume(), report.volume_after, max_relative = 1.0e-9);
}

#[test]
fn several_channels_share_one_slab() {
    let mut scene = sloped_scene();
    let _ = scene.insert(Object::new("lake", footprint(&PENTAGON)));
    let _ = scene.insert(Object::new("pond", footprint(&RECTANGLE)));

    let first = carve_channel(&mut scene, &CarveConfig::default().with_channel("lake")).unwrap();
    let second = carve_channel(&mut scene, &CarveConfig::default().with_channel("pond")).unwrap();

    assert!(first.thickened);
    assert!(!second.thickened);
    assert_relative_eq!(second.volume_before, first.volume_after, max_relative = 1.0e-9);
    assert_relative_eq!(
        second.volume_before - second.volume_after,
        shoelace(&RECTANGLE).abs() / 2.0 * 50.0,
        max_relative = 1.0e-6
    );

    let terrain = scene.get("srtm").unwrap();
    assert_eq!(terrain.solid_depth, Some(50.0));
    assert_eq!(terrain.mesh.triangulate().unwrap().check_manifold(), Ok(()));

    for name in ["lake", "pond"] {
        assert_relative_eq!(scene.get(name).unwrap().translation().z, 1.0);
    }
}

#[test]
fn translated_terrain_is_carved_in_its_local_space() {
    let mut scene = Scene::new();
    let _ = scene.insert(
        Object::new("srtm", square([0.0, 0.0], [50.0, 50.0], 0.0))
            .with_pose(translation(100.0, -20.0, 30.0)),
    );
    let _ = scene.insert(
        Object::new("water", square([0.0, 0.0], [7.3, 4.1], 0.0))
            .with_pose(translation(117.9, -8.7, 30.0)),
    );

    let _ = carve_channel(&mut scene, &CarveConfig::default()).unwrap();

    // The stored mesh stays local: the slab spans [-50, 0] in local `z`.
    let terrain = scene.get("srtm").unwrap();
    let local = terrain.mesh.local_aabb();
    assert_relative_eq!(local.mins.z, -50.0, epsilon = 1.0e-9);
    assert_relative_eq!(local.maxs.z, 0.0, epsilon = 1.0e-9);

    let heights = TerrainHeightQuery::new(&terrain.mesh, &terrain.pose).unwrap();
    assert_eq!(heights.height_at(120.0, -7.0), None);
    assert_relative_eq!(heights.height_at(110.0, -10.0).unwrap(), 30.0, epsilon = 1.0e-9);
}

#[test]
fn missing_objects_abort_the_carve() {
    let mut scene = sloped_scene();
    assert_eq!(
        carve_channel(&mut scene, &CarveConfig::default()),
        Err(CarveError::ChannelNotFound("water".to_string()))
    );
    assert!(scene.get("srtm").unwrap().solid_depth.is_none());
}
