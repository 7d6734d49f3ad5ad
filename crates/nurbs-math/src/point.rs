//! The control point abstraction shared by curves and surfaces.

use std::fmt::Debug;
use std::ops::{Add, Mul};

use glam::{DVec2, DVec3, DVec4};

/// A point in a fixed-dimension space that can be blended by NURBS evaluation.
///
/// Rational evaluation only ever forms weighted sums of control points, so all
/// that is required is a zero, addition, and scaling by an `f64` factor.
pub trait ControlPoint:
    Copy + Debug + PartialEq + Send + Sync + Add<Output = Self> + Mul<f64, Output = Self>
{
    /// The additive identity.
    const ZERO: Self;
}

impl ControlPoint for f64 {
    const ZERO: Self = 0.0;
}

impl ControlPoint for DVec2 {
    const ZERO: Self = DVec2::ZERO;
}

impl ControlPoint for DVec3 {
    const ZERO: Self = DVec3::ZERO;
}

impl ControlPoint for DVec4 {
    const ZERO: Self = DVec4::ZERO;
}

/// Weighted sum `sum(points[i] * factors[i])` over the shorter of the two slices.
pub fn weighted_sum<P: ControlPoint>(points: &[P], factors: &[f64]) -> P {
    points
        .iter()
        .zip(factors)
        .fold(P::ZERO, |acc, (&p, &f)| acc + p * f)
}
