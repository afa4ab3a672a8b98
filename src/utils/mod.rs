//! Various unsorted geometrical and logical operators.

pub use self::orientation::{corner_direction, is_point_in_triangle, signed_area_2, Orientation};
pub use self::point_key::PointKey;
pub use self::sorted_pair::SortedPair;
pub use self::spade::to_spade_point;

mod orientation;
mod point_key;
mod sorted_pair;
mod spade;
