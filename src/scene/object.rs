use crate::math::{Affine, Point, Real, Vector};
use crate::shape::Mesh;

/// Makes the vertices of an object follow the surface of another object.
///
/// When a scene evaluates an object carrying this marker, every vertex lying over the target's
/// surface is moved vertically onto that surface, `offset` units above it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SurfaceConform {
    /// Name of the object whose surface is followed.
    pub target: String,
    /// Vertical distance kept between the vertices and the surface.
    pub offset: Real,
}

impl SurfaceConform {
    /// Follows the surface of `target` with no offset.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            offset: 0.0,
        }
    }

    /// Sets the vertical offset kept above the surface.
    pub fn with_offset(mut self, offset: Real) -> Self {
        self.offset = offset;
        self
    }
}

/// A named mesh placed in the world.
///
/// Buildings, terrains and channels are all objects. The mesh is expressed in local space and
/// mapped to world space by `pose`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Object {
    /// The unique name of this object in its scene.
    pub name: String,
    /// The local-space geometry.
    pub mesh: Mesh,
    /// The local-to-world transform.
    pub pose: Affine<Real>,
    /// The collection this object belongs to, if any.
    pub collection: Option<String>,
    /// Surface-following behavior applied when the scene evaluates this object.
    pub surface_conform: Option<SurfaceConform>,
    /// The depth this object's surface was thickened by, if it was turned into a solid.
    pub solid_depth: Option<Real>,
}

impl Object {
    /// An object at the world origin, in no collection.
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            pose: Affine::identity(),
            collection: None,
            surface_conform: None,
            solid_depth: None,
        }
    }

    /// Sets the local-to-world transform.
    pub fn with_pose(mut self, pose: Affine<Real>) -> Self {
        self.pose = pose;
        self
    }

    /// Moves this object into the collection `collection`.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Makes this object follow a surface.
    pub fn with_surface_conform(mut self, conform: SurfaceConform) -> Self {
        self.surface_conform = Some(conform);
        self
    }

    /// Does this object belong to `collection`?
    #[inline]
    pub fn is_in_collection(&self, collection: &str) -> bool {
        self.collection.as_deref() == Some(collection)
    }

    /// The translational part of the pose.
    pub fn translation(&self) -> Vector<Real> {
        self.pose.matrix().fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Moves this object along the world `Z` axis, leaving the rest of its pose untouched.
    pub fn translate_z(&mut self, dz: Real) {
        self.pose.matrix_mut_unchecked()[(2, 3)] += dz;
    }

    /// Sets the `Z` component of the pose's translation.
    pub fn set_translation_z(&mut self, z: Real) {
        self.pose.matrix_mut_unchecked()[(2, 3)] = z;
    }

    /// Removes and returns the surface-following behavior of this object.
    pub fn strip_surface_conform(&mut self) -> Option<SurfaceConform> {
        self.surface_conform.take()
    }

    /// The mesh's vertices in world space.
    pub fn world_vertices(&self) -> impl ExactSizeIterator<Item = Point<Real>> + '_ {
        self.mesh.vertices().iter().map(|pt| self.pose * pt)
    }

    /// The world-space vertex with the smallest `z`.
    ///
    /// The first one in vertex order wins ties. Returns `None` if the mesh has no vertex.
    pub fn lowest_world_vertex(&self) -> Option<Point<Real>> {
        self.world_vertices()
            .fold(None, |lowest: Option<Point<Real>>, pt| match lowest {
                Some(low) if low.z <= pt.z => Some(low),
                _ => Some(pt),
            })
    }
}
