pub mod point;

pub use glam::{DVec2, DVec3, DVec4};
pub use point::ControlPoint;

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Point4 = DVec4;
