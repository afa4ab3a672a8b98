#[macro_use]
extern crate approx;

mod building_alignment;
mod channel_carving;
mod common;
mod terrain_height;
