//! NURBS evaluation: basis functions, rational curves, and tensor-product surfaces.

pub mod curve;
pub mod nurbs;
pub mod surface;
pub mod tessellate;

pub use curve::{CurveOptions, NurbsCurve};
pub use surface::{NurbsSurface, SurfaceOptions};
pub use tessellate::{curve_to_polyline, surface_to_grid, surface_to_triangles, CurveSamples};
