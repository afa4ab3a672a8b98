use super::CarveError;
use crate::math::Real;
use crate::query::{Ray, RAY_ORIGIN_MARGIN};
use crate::scene::{Object, Scene};
use crate::shape::{Mesh, TriMesh};
use crate::transformation::{extrude_footprint, subtract_meshes, thicken_downward, Prism};
use core::fmt;

/// Parameters of [`carve_channel`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(default))]
pub struct CarveConfig {
    /// Name of the terrain object to carve.
    pub terrain: String,
    /// Name of the channel object whose footprint is carved.
    pub channel: String,
    /// Height of the cutter extruded from the channel's footprint.
    pub depth: Real,
    /// Thickness given to the terrain surface to turn it into a solid.
    pub terrain_depth: Real,
    /// Distance between the bottom of the cutter and the bottom of the terrain solid.
    pub cutter_clearance: Real,
    /// Elevation of the channel object once the carve is done.
    pub rest_height: Real,
}

impl Default for CarveConfig {
    fn default() -> Self {
        Self {
            terrain: "srtm".to_string(),
            channel: "water".to_string(),
            depth: 25.0,
            terrain_depth: 50.0,
            cutter_clearance: 10.0,
            rest_height: 1.0,
        }
    }
}

impl CarveConfig {
    /// Allowed range of [`Self::depth`].
    pub const DEPTH_RANGE: [Real; 2] = [0.1, 100.0];
    /// Allowed range of [`Self::terrain_depth`].
    pub const TERRAIN_DEPTH_RANGE: [Real; 2] = [0.1, 500.0];
    /// Allowed range of [`Self::cutter_clearance`].
    pub const CUTTER_CLEARANCE_RANGE: [Real; 2] = [0.1, Real::MAX];

    /// Sets the name of the terrain object.
    pub fn with_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrain = terrain.into();
        self
    }

    /// Sets the name of the channel object.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Sets the height of the cutter.
    pub fn with_depth(mut self, depth: Real) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the thickness given to the terrain.
    pub fn with_terrain_depth(mut self, terrain_depth: Real) -> Self {
        self.terrain_depth = terrain_depth;
        self
    }

    /// Sets the distance kept below the terrain solid by the cutter.
    pub fn with_cutter_clearance(mut self, cutter_clearance: Real) -> Self {
        self.cutter_clearance = cutter_clearance;
        self
    }

    /// Sets the elevation of the channel after the carve.
    pub fn with_rest_height(mut self, rest_height: Real) -> Self {
        self.rest_height = rest_height;
        self
    }

    /// Checks that every numeric parameter is within its allowed range.
    pub fn validate(&self) -> Result<(), CarveError> {
        check_range("depth", self.depth, Self::DEPTH_RANGE)?;
        check_range("terrain_depth", self.terrain_depth, Self::TERRAIN_DEPTH_RANGE)?;
        check_range(
            "cutter_clearance",
            self.cutter_clearance,
            Self::CUTTER_CLEARANCE_RANGE,
        )?;
        check_range("rest_height", self.rest_height, [-Real::MAX, Real::MAX])
    }
}

fn check_range(name: &'static str, value: Real, [min, max]: [Real; 2]) -> Result<(), CarveError> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(CarveError::InvalidParameter {
            name,
            value,
            min,
            max,
        })
    }
}

/// Statistics about a carve.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CarveReport {
    /// Was the terrain turned into a solid by this carve?
    pub thickened: bool,
    /// Triangle count of the terrain solid before the carve.
    pub triangles_before: usize,
    /// Triangle count of the carved terrain.
    pub triangles_after: usize,
    /// Volume of the terrain solid before the carve.
    pub volume_before: Real,
    /// Volume of the carved terrain.
    pub volume_after: Real,
}

impl fmt::Display for CarveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Carved {:.3} cubic units out of the terrain ({} -> {} triangles)",
            self.volume_before - self.volume_after,
            self.triangles_before,
            self.triangles_after
        )
    }
}

/// Extrudes the footprint of `channel` upward by `depth` into a world-space prism.
///
/// The channel is not modified: the prism is built from a copy of it, stripped of its
/// surface-following behavior, with its pose baked into the vertices.
pub fn build_cutter(channel: &Object, depth: Real) -> Result<Prism, CarveError> {
    let mut cutter = channel.clone();
    if cutter.strip_surface_conform().is_some() {
        log::debug!("stripped the surface conform of the `{}` cutter", channel.name);
    }

    let footprint = cutter.mesh.triangulate_transformed(&cutter.pose)?;
    Ok(extrude_footprint(&footprint, depth)?)
}

/// Turns the surface of the terrain object `name` into a closed slab, `depth` units thick.
///
/// Returns `false` and leaves the terrain untouched if it already is a solid.
pub fn thicken_terrain(scene: &mut Scene, name: &str, depth: Real) -> Result<bool, CarveError> {
    check_range("terrain_depth", depth, CarveConfig::TERRAIN_DEPTH_RANGE)?;

    let terrain = scene
        .get(name)
        .ok_or_else(|| CarveError::TerrainNotFound(name.to_string()))?;
    if terrain.solid_depth.is_some() {
        log::debug!("`{name}` is already a solid");
        return Ok(false);
    }

    let (solid, _) = world_solid(terrain, depth)?;
    let mesh = to_local_mesh(solid, terrain)?;

    if let Some(terrain) = scene.get_mut(name) {
        terrain.mesh = mesh;
        terrain.solid_depth = Some(depth);
    }

    log::info!("`{name}` now has a thickness of {depth}");
    Ok(true)
}

/// Computes `terrain_solid − cutter`, checking that the result is a closed manifold.
pub fn subtract_solids(terrain_solid: &TriMesh, cutter: &Prism) -> Result<TriMesh, CarveError> {
    let carved = subtract_meshes(terrain_solid, cutter.solid())?;
    log::debug!(
        "boolean difference: {} - {} triangles -> {} triangles",
        terrain_solid.num_triangles(),
        cutter.solid().num_triangles(),
        carved.num_triangles()
    );
    Ok(carved)
}

/// Carves the footprint of a channel object into a terrain object.
///
/// The terrain is thickened into a slab unless it already is a solid, then the channel's
/// footprint, extruded by `config.depth` and stretched below the slab, is subtracted from it.
/// Finally the channel object loses its surface-following behavior and is moved to
/// `config.rest_height`.
///
/// The scene is only modified once the carved terrain is computed and validated: on error,
/// nothing changes.
pub fn carve_channel(scene: &mut Scene, config: &CarveConfig) -> Result<CarveReport, CarveError> {
    config.validate()?;

    let terrain = scene
        .get(&config.terrain)
        .ok_or_else(|| CarveError::TerrainNotFound(config.terrain.clone()))?;
    let channel = scene
        .get(&config.channel)
        .ok_or_else(|| CarveError::ChannelNotFound(config.channel.clone()))?;

    log::info!("Step 1: preparing the cutter from `{}`", channel.name);
    let mut cutter = build_cutter(channel, config.depth)?;

    log::info!("Step 2: adding thickness to `{}`", terrain.name);
    let (terrain_solid, thickened) = world_solid(terrain, config.terrain_depth)?;

    cutter.lower_base_to(terrain_solid.local_aabb().mins.z - config.cutter_clearance)?;
    check_cutter_clearance(&cutter, &terrain_solid)?;

    log::info!("Step 3: boolean difference");
    let carved = subtract_solids(&terrain_solid, &cutter)?;
    let report = CarveReport {
        thickened,
        triangles_before: terrain_solid.num_triangles(),
        triangles_after: carved.num_triangles(),
        volume_before: terrain_solid.signed_volume().abs(),
        volume_after: carved.signed_volume(),
    };
    let carved = to_local_mesh(carved, terrain)?;

    log::info!("Step 4: resetting `{}`", channel.name);
    if let Some(terrain) = scene.get_mut(&config.terrain) {
        terrain.mesh = carved;
        if thickened {
            terrain.solid_depth = Some(config.terrain_depth);
        }
    }

    if let Some(channel) = scene.get_mut(&config.channel) {
        let _ = channel.strip_surface_conform();
        channel.set_translation_z(config.rest_height);
    }

    log::info!("{report}");
    Ok(report)
}

/// The world-space solid of `terrain`, thickening its surface downward by `depth` unless it
/// already is a solid. The boolean tells whether it was thickened.
fn world_solid(terrain: &Object, depth: Real) -> Result<(TriMesh, bool), CarveError> {
    let mesh = terrain.mesh.triangulate_transformed(&terrain.pose)?;

    if terrain.solid_depth.is_some() {
        Ok((mesh, false))
    } else {
        Ok((thicken_downward(&mesh, depth)?, true))
    }
}

fn to_local_mesh(mut solid: TriMesh, terrain: &Object) -> Result<Mesh, CarveError> {
    let inv_pose = terrain
        .pose
        .try_inverse()
        .ok_or(CarveError::SingularTerrainPose)?;
    solid.transform_vertices(&inv_pose);
    Ok(Mesh::from(&solid))
}

/// Checks that the top of the cutter lies above the terrain everywhere, so the carve opens a
/// trench instead of a buried cavity.
fn check_cutter_clearance(cutter: &Prism, terrain_solid: &TriMesh) -> Result<(), CarveError> {
    let ray_z = terrain_solid.local_aabb().maxs.z + RAY_ORIGIN_MARGIN;

    for pt in cutter.cap_vertices() {
        let ray = Ray::downward(pt.x, pt.y, ray_z);
        if let Some((_, hit)) = terrain_solid.cast_local_ray(&ray, Real::MAX) {
            let terrain_z = ray.point_at(hit.time_of_impact).z;
            if pt.z <= terrain_z {
                return Err(CarveError::CutterTooShort {
                    cap_z: pt.z,
                    terrain_z,
                });
            }
        }
    }

    Ok(())
}
