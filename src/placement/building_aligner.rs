use super::{AlignError, AlignReport, MovedObject, SkipReason, SkippedObject};
use crate::math::Real;
use crate::query::TerrainHeightQuery;
use crate::scene::{Object, Scene};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Parameters of [`align_buildings`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(default))]
pub struct AlignConfig {
    /// Name of the terrain object.
    pub terrain: String,
    /// Name of the collection holding the objects to align.
    pub collection: String,
    /// Height of each object's lowest vertex above the terrain after alignment.
    pub offset: Real,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            terrain: "Terrain".to_string(),
            collection: "Buildings".to_string(),
            offset: 0.0,
        }
    }
}

impl AlignConfig {
    /// Sets the name of the terrain object.
    pub fn with_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrain = terrain.into();
        self
    }

    /// Sets the name of the collection to align.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Sets the height kept between the objects and the terrain.
    pub fn with_offset(mut self, offset: Real) -> Self {
        self.offset = offset;
        self
    }
}

/// The vertical translation putting the lowest world-space vertex of `object` at `offset`
/// above the terrain.
pub fn alignment_delta(
    object: &Object,
    terrain: &TerrainHeightQuery,
    offset: Real,
) -> Result<Real, SkipReason> {
    let lowest = object
        .lowest_world_vertex()
        .ok_or(SkipReason::NoVertices)?;
    let height = terrain
        .height_at(lowest.x, lowest.y)
        .ok_or(SkipReason::OutsideTerrain {
            x: lowest.x,
            y: lowest.y,
        })?;
    Ok(height - lowest.z + offset)
}

/// Moves every object vertically so its lowest vertex rests `offset` above the terrain.
///
/// Objects without terrain below their lowest vertex, or without vertices, are left in place
/// and reported as skipped. Only the `Z` translation of the poses is modified.
pub fn align_objects(
    objects: &mut [&mut Object],
    terrain: &TerrainHeightQuery,
    offset: Real,
) -> AlignReport {
    #[cfg(feature = "parallel")]
    let deltas: Vec<_> = objects
        .par_iter()
        .map(|object| alignment_delta(object, terrain, offset))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let deltas: Vec<_> = objects
        .iter()
        .map(|object| alignment_delta(object, terrain, offset))
        .collect();

    let mut report = AlignReport::default();

    for (object, delta) in objects.iter_mut().zip(deltas) {
        match delta {
            Ok(delta) => {
                object.translate_z(delta);
                log::info!("Moved '{}' by {delta:.3} to match terrain", object.name);
                report.moved.push(MovedObject {
                    name: object.name.clone(),
                    delta,
                });
            }
            Err(reason) => {
                match reason {
                    SkipReason::NoVertices => log::debug!("Skipped '{}' ({reason})", object.name),
                    SkipReason::OutsideTerrain { .. } => {
                        log::warn!("Skipped '{}' ({reason})", object.name)
                    }
                }
                report.skipped.push(SkippedObject {
                    name: object.name.clone(),
                    reason,
                });
            }
        }
    }

    report
}

/// Drops every object of a collection onto the terrain, as configured by `config`.
///
/// The terrain is evaluated with its surface-following behavior (see
/// [`Scene::evaluated_mesh`]), indexed, and discarded once the objects are moved. Nothing is
/// moved if the terrain or the collection is missing, or if the collection is empty.
pub fn align_buildings(scene: &mut Scene, config: &AlignConfig) -> Result<AlignReport, AlignError> {
    let Some(terrain) = scene.get(&config.terrain) else {
        return Err(AlignError::TerrainNotFound(config.terrain.clone()));
    };
    let terrain_pose = terrain.pose;

    if !scene.has_collection(&config.collection) {
        return Err(AlignError::CollectionNotFound(config.collection.clone()));
    }

    if scene
        .objects_in_collection(&config.collection)
        .next()
        .is_none()
    {
        return Err(AlignError::EmptyCollection(config.collection.clone()));
    }

    let terrain_mesh = scene
        .evaluated_mesh(&config.terrain)
        .ok_or_else(|| AlignError::TerrainNotFound(config.terrain.clone()))?;
    let engine = TerrainHeightQuery::new(&terrain_mesh, &terrain_pose)?;

    let mut objects: Vec<&mut Object> = scene
        .objects_in_collection_mut(&config.collection)
        .collect();
    let report = align_objects(&mut objects, &engine, config.offset);
    log::info!("{report}");

    Ok(report)
}

#[cfg(test)]
mod test {
    use super::{align_buildings, alignment_delta, AlignConfig};
    use crate::math::{Affine, Point, Real, Translation};
    use crate::placement::{AlignError, SkipReason};
    use crate::query::{HeightQueryError, TerrainHeightQuery};
    use crate::scene::{Object, Scene};
    use crate::shape::Mesh;

    fn flat_terrain() -> Object {
        let mesh = Mesh::from_polygon(vec![
            Point::new(-100.0, -100.0, 0.0),
            Point::new(100.0, -100.0, 0.0),
            Point::new(100.0, 100.0, 0.0),
            Point::new(-100.0, 100.0, 0.0),
        ])
        .unwrap();
        Object::new("Terrain", mesh)
    }

    fn building(name: &str, at: [Real; 3]) -> Object {
        let mesh = Mesh::from_polygon(vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 2.0),
            Point::new(0.0, 1.0, 2.0),
        ])
        .unwrap();
        Object::new(name, mesh)
            .with_pose(Affine::from_matrix_unchecked(
                Translation::new(at[0], at[1], at[2]).to_homogeneous(),
            ))
            .with_collection("Buildings")
    }

    #[test]
    fn delta_brings_lowest_vertex_to_terrain() {
        let terrain = flat_terrain();
        let engine = TerrainHeightQuery::new(&terrain.mesh, &terrain.pose).unwrap();

        let inside = building("inside", [10.0, 10.0, 5.0]);
        assert_relative_eq!(alignment_delta(&inside, &engine, 0.0).unwrap(), -5.0);
        assert_relative_eq!(alignment_delta(&inside, &engine, 0.25).unwrap(), -4.75);

        let outside = building("outside", [200.0, 200.0, 3.0]);
        assert_eq!(
            alignment_delta(&outside, &engine, 0.0),
            Err(SkipReason::OutsideTerrain { x: 200.0, y: 200.0 })
        );

        let empty = Object::new("empty", Mesh::default());
        assert_eq!(
            alignment_delta(&empty, &engine, 0.0),
            Err(SkipReason::NoVertices)
        );
    }

    #[test]
    fn alignment_moves_and_skips() {
        let mut scene = Scene::new();
        let _ = scene.insert(flat_terrain());
        let _ = scene.insert(building("inside", [10.0, 10.0, 5.0]));
        let _ = scene.insert(building("outside", [200.0, 200.0, 3.0]));

        let report = align_buildings(&mut scene, &AlignConfig::default()).unwrap();
        assert_eq!(report.moved_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].name, "outside");

        assert_relative_eq!(scene.get("inside").unwrap().translation().z, 0.0);
        assert_relative_eq!(scene.get("outside").unwrap().translation().z, 3.0);
    }

    #[test]
    fn missing_inputs_abort_without_mutation() {
        let mut scene = Scene::new();
        let _ = scene.insert(building("inside", [10.0, 10.0, 5.0]));
        let config = AlignConfig::default();

        assert_eq!(
            align_buildings(&mut scene, &config),
            Err(AlignError::TerrainNotFound("Terrain".to_string()))
        );

        let _ = scene.insert(flat_terrain());
        assert_eq!(
            align_buildings(&mut scene, &config.clone().with_collection("Houses")),
            Err(AlignError::CollectionNotFound("Houses".to_string()))
        );

        scene.add_collection("Houses");
        assert_eq!(
            align_buildings(&mut scene, &config.clone().with_collection("Houses")),
            Err(AlignError::EmptyCollection("Houses".to_string()))
        );

        let _ = scene.insert(Object::new("Flat", Mesh::default()));
        assert_eq!(
            align_buildings(&mut scene, &config.clone().with_terrain("Flat")),
            Err(AlignError::Terrain(HeightQueryError::EmptyTerrain))
        );

        assert_relative_eq!(scene.get("inside").unwrap().translation().z, 5.0);
    }
}
