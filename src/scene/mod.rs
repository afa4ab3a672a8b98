//! Named objects placed in the world, and the scene that owns them.

pub use self::object::{Object, SurfaceConform};
pub use self::scene::Scene;

mod object;
mod scene;
