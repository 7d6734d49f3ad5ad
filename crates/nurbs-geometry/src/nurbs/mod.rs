//! NURBS core algorithms: knot vector utilities and rational blending.

pub mod knot;
pub mod rational;

pub use knot::{
    basis_functions, check_finite, check_parameter, default_knots, default_weight_grid, default_weights,
    find_span, knot_range, SpanCursor,
};
pub use rational::{rational_curve_point, rational_surface_point};
