use crate::common::{box_building, random_terrain, square, translation};
use oorandom::Rand64;
use terracarve3d::math::{Affine, Isometry, Matrix4, Real, Vector};
use terracarve3d::placement::{align_buildings, AlignConfig, SkipReason};
use terracarve3d::scene::{Object, Scene};

fn flat_scene() -> Scene {
    let mut scene = Scene::new();
    let _ = scene.insert(Object::new(
        "Terrain",
        square([-100.0, -100.0], [100.0, 100.0], 0.0),
    ));
    scene
}

fn random_pose(rng: &mut Rand64) -> Affine<Real> {
    let mut rand = |min: Real, max: Real| min + (max - min) * rng.rand_float() as Real;
    let iso = Isometry::new(
        Vector::new(rand(5.0, 80.0), rand(5.0, 80.0), rand(-50.0, 50.0)),
        Vector::new(rand(-0.3, 0.3), rand(-0.3, 0.3), rand(-3.0, 3.0)),
    );
    let scale = Matrix4::new_nonuniform_scaling(&Vector::new(
        rand(0.5, 2.0),
        rand(0.5, 2.0),
        rand(0.5, 2.0),
    ));
    Affine::from_matrix_unchecked(iso.to_homogeneous() * scale)
}

fn random_scene(seed: u128) -> Scene {
    let mut rng = Rand64::new(seed);
    let mut scene = Scene::new();
    let terrain = random_terrain(&mut rng, 10, 100.0, [0.0, 25.0]);
    let _ = scene.insert(Object::new("Terrain", terrain));

    for i in 0..20 {
        let pose = random_pose(&mut rng);
        let building = Object::new(format!("building.{i:03}"), box_building(4.0, 6.0, 9.0))
            .with_pose(pose)
            .with_collection("Buildings");
        let _ = scene.insert(building);
    }

    scene
}

#[test]
fn building_above_terrain_is_lowered() {
    let mut scene = flat_scene();
    let _ = scene.insert(
        Object::new("house", box_building(2.0, 2.0, 3.0))
            .with_pose(translation(10.0, 10.0, 5.0))
            .with_collection("Buildings"),
    );

    let report = align_buildings(&mut scene, &AlignConfig::default()).unwrap();
    assert_eq!(report.moved_count(), 1);
    assert_eq!(report.skipped_count(), 0);
    assert_relative_eq!(report.moved[0].delta, -5.0);
    assert_relative_eq!(scene.get("house").unwrap().translation().z, 0.0);
}

#[test]
fn building_off_the_terrain_is_skipped() {
    let mut scene = flat_scene();
    let _ = scene.insert(
        Object::new("far", box_building(2.0, 2.0, 3.0))
            .with_pose(translation(200.0, 200.0, 3.0))
            .with_collection("Buildings"),
    );

    let report = align_buildings(&mut scene, &AlignConfig::default()).unwrap();
    assert_eq!(report.moved_count(), 0);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(
        report.skipped[0].reason,
        SkipReason::OutsideTerrain { x: 200.0, y: 200.0 }
    );
    assert_eq!(report.messages().len(), 1);
    assert_relative_eq!(scene.get("far").unwrap().translation().z, 3.0);
}

#[test]
fn offset_is_kept_above_the_terrain() {
    let mut scene = flat_scene();
    let _ = scene.insert(
        Object::new("house", box_building(2.0, 2.0, 3.0))
            .with_pose(translation(-30.0, 12.0, -8.0))
            .with_collection("Buildings"),
    );

    let config = AlignConfig::default().with_offset(0.75);
    let _ = align_buildings(&mut scene, &config).unwrap();
    let lowest = scene.get("house").unwrap().lowest_world_vertex().unwrap();
    assert_relative_eq!(lowest.z, 0.75);
}

#[test]
fn alignment_is_idempotent() {
    for seed in 0..4 {
        let mut scene = random_scene(seed);
        let first = align_buildings(&mut scene, &AlignConfig::default()).unwrap();
        assert_eq!(first.moved_count() + first.skipped_count(), 20);

        let second = align_buildings(&mut scene, &AlignConfig::default()).unwrap();
        assert_eq!(second.moved_count(), first.moved_count());
        for moved in &second.moved {
            assert!(
                moved.delta.abs() <= 1.0e-9,
                "{} moved again by {}",
                moved.name,
                moved.delta
            );
        }
    }
}

#[test]
fn alignment_only_changes_vertical_translation() {
    let mut scene = random_scene(11);
    let before: Vec<Affine<Real>> = scene
        .objects_in_collection("Buildings")
        .map(|obj| obj.pose)
        .collect();

    let report = align_buildings(&mut scene, &AlignConfig::default()).unwrap();
    assert!(report.moved_count() > 0);

    let after = scene.objects_in_collection("Buildings").map(|obj| obj.pose);
    for (before, after) in before.iter().zip(after) {
        let mut diff = after.matrix() - before.matrix();
        diff[(2, 3)] = 0.0;
        assert_eq!(diff, Matrix4::zeros());
    }
}
