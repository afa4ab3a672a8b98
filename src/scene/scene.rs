use super::Object;
use crate::query::TerrainHeightQuery;
use crate::shape::Mesh;
use indexmap::{IndexMap, IndexSet};

/// A set of uniquely named objects and collections.
///
/// Objects are kept in insertion order, so iterating over a scene or one of its collections is
/// deterministic.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Scene {
    objects: IndexMap<String, Object>,
    collections: IndexSet<String>,
}

impl Scene {
    /// An empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object to this scene, replacing and returning any object with the same name.
    ///
    /// The object's collection is declared if it was not already.
    pub fn insert(&mut self, object: Object) -> Option<Object> {
        if let Some(collection) = &object.collection {
            self.add_collection(collection.clone());
        }
        self.objects.insert(object.name.clone(), object)
    }

    /// Removes the object named `name`, preserving the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Object> {
        self.objects.shift_remove(name)
    }

    /// Declares a collection, possibly empty.
    pub fn add_collection(&mut self, name: impl Into<String>) {
        let _ = self.collections.insert(name.into());
    }

    /// Was a collection named `name` declared?
    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains(name)
    }

    /// The object named `name`.
    pub fn get(&self, name: &str) -> Option<&Object> {
        self.objects.get(name)
    }

    /// The object named `name`, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Object> {
        self.objects.get_mut(name)
    }

    /// The number of objects in this scene.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Does this scene have no object?
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All the objects, in insertion order.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    /// The objects of the collection `collection`, in insertion order.
    pub fn objects_in_collection<'a>(
        &'a self,
        collection: &'a str,
    ) -> impl Iterator<Item = &'a Object> + 'a {
        self.objects
            .values()
            .filter(move |obj| obj.is_in_collection(collection))
    }

    /// The objects of the collection `collection`, mutably, in insertion order.
    pub fn objects_in_collection_mut<'a>(
        &'a mut self,
        collection: &'a str,
    ) -> impl Iterator<Item = &'a mut Object> + 'a {
        self.objects
            .values_mut()
            .filter(move |obj| obj.is_in_collection(collection))
    }

    /// The local-space mesh of the object named `name`, with its surface-following behavior
    /// applied.
    ///
    /// Vertices lying over the target's surface are moved vertically onto it, in world space,
    /// then mapped back to local space. Other vertices are left untouched. The target is
    /// evaluated without its own surface-following behavior, so evaluation never recurses.
    /// The raw mesh is returned if the object has no such behavior, if its target does not
    /// exist or has no surface, or if the object's pose cannot be inverted.
    pub fn evaluated_mesh(&self, name: &str) -> Option<Mesh> {
        let object = self.get(name)?;
        let Some(conform) = &object.surface_conform else {
            return Some(object.mesh.clone());
        };

        let Some(target) = self.get(&conform.target) else {
            log::debug!(
                "surface of `{}` followed by `{name}` does not exist",
                conform.target
            );
            return Some(object.mesh.clone());
        };

        let surface = match TerrainHeightQuery::new(&target.mesh, &target.pose) {
            Ok(surface) => surface,
            Err(err) => {
                log::debug!("`{}` has no surface to follow: {err}", conform.target);
                return Some(object.mesh.clone());
            }
        };

        let Some(inv_pose) = object.pose.try_inverse() else {
            log::debug!("the pose of `{name}` is not invertible");
            return Some(object.mesh.clone());
        };

        let mut mesh = object.mesh.clone();
        for pt in mesh.vertices_mut() {
            let mut world = object.pose * *pt;
            if let Some(height) = surface.height_at(world.x, world.y) {
                world.z = height + conform.offset;
                *pt = inv_pose * world;
            }
        }

        Some(mesh)
    }
}
