//! Rational (NURBS) curves.

use nurbs_core::{NurbsError, Result, Validate};
use nurbs_math::{ControlPoint, Point3};
use serde::{Deserialize, Serialize};

use crate::nurbs::knot::{
    check_finite, check_parameter, default_knots, default_weights, derived_degree, find_span, knot_range,
};
use crate::nurbs::rational;
use crate::tessellate::CurveSamples;

/// Construction options for [`NurbsCurve`].
///
/// Unset fields take their defaults: degree `points - 1`, all weights 1, and a
/// clamped knot vector with unit interior spans. Explicit `knots` take precedence
/// over `degree`, since the degree is implied by the knot vector length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveOptions {
    pub degree: Option<usize>,
    pub weights: Option<Vec<f64>>,
    pub knots: Option<Vec<f64>>,
}

/// A NURBS curve over control points of type `P`.
///
/// The knot vector and degree are fixed at construction. Points and weights can
/// be replaced afterwards as long as their count does not change.
///
/// Weights are expected to be positive. This is not enforced; a zero weight sum
/// over a knot span makes the evaluated point non-finite. See [`Validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NurbsCurve<P = Point3> {
    points: Vec<P>,
    weights: Vec<f64>,
    knots: Vec<f64>,
    degree: usize,
}

impl<P: ControlPoint> NurbsCurve<P> {
    /// Curve of degree `points.len() - 1` with uniform weights.
    pub fn new(points: Vec<P>) -> Result<Self> {
        Self::from_options(points, CurveOptions::default())
    }

    pub fn with_degree(points: Vec<P>, degree: usize) -> Result<Self> {
        Self::from_options(
            points,
            CurveOptions {
                degree: Some(degree),
                ..Default::default()
            },
        )
    }

    pub fn with_weights(points: Vec<P>, weights: Vec<f64>) -> Result<Self> {
        Self::from_options(
            points,
            CurveOptions {
                weights: Some(weights),
                ..Default::default()
            },
        )
    }

    pub fn with_weights_and_degree(points: Vec<P>, weights: Vec<f64>, degree: usize) -> Result<Self> {
        Self::from_options(
            points,
            CurveOptions {
                degree: Some(degree),
                weights: Some(weights),
                knots: None,
            },
        )
    }

    pub fn from_options(points: Vec<P>, options: CurveOptions) -> Result<Self> {
        let weights = options
            .weights
            .unwrap_or_else(|| default_weights(points.len()));
        let knots = match options.knots {
            Some(knots) => knots,
            None => {
                let degree = options.degree.unwrap_or(points.len().saturating_sub(1));
                default_knots(points.len(), degree)
            }
        };
        Self::from_knots(points, weights, knots)
    }

    /// Curve with explicit weights and knot vector; the degree is
    /// `knots.len() - points.len() - 1`.
    pub fn from_knots(points: Vec<P>, weights: Vec<f64>, knots: Vec<f64>) -> Result<Self> {
        if points.is_empty() {
            return Err(NurbsError::ShapeMismatch {
                what: "control points",
                expected: 1,
                found: 0,
            });
        }
        if points.len() != weights.len() {
            return Err(NurbsError::ShapeMismatch {
                what: "weights",
                expected: points.len(),
                found: weights.len(),
            });
        }

        let degree = derived_degree(&knots, points.len());
        if degree < 1 {
            return Err(NurbsError::InvalidDegree {
                axis: "curve",
                degree,
            });
        }

        log::debug!(
            "NURBS curve: {} points, degree {}, knots {:?}",
            points.len(),
            degree,
            knots
        );

        Ok(Self {
            points,
            weights,
            knots,
            degree: degree as usize,
        })
    }

    /// Evaluate the curve at parameter `t`.
    ///
    /// Outside the knot range the first or last control point is returned as is,
    /// without blending. NaN and infinite parameters are rejected.
    pub fn evaluate(&self, t: f64) -> Result<P> {
        check_finite(t)?;
        let (first, last) = self.domain();
        if t < first {
            return Ok(self.points[0]);
        }
        if t > last {
            return Ok(self.points[self.points.len() - 1]);
        }

        let span = find_span(&self.knots, t)?;
        self.evaluate_in_span(t, span)
    }

    /// Evaluate the curve at `t` in a knot span the caller already knows.
    ///
    /// `t` must lie in `[knots[span], knots[span + 1]]` and the span must not
    /// be degenerate.
    pub fn evaluate_in_span(&self, t: f64, span: usize) -> Result<P> {
        check_parameter(span, t, &self.knots)?;
        rational::rational_curve_point(
            self.degree,
            &self.knots,
            &self.points,
            &self.weights,
            span,
            t,
        )
    }

    /// Lazily sample `steps + 1` evenly spaced points over the full knot range.
    pub fn samples(&self, steps: usize) -> CurveSamples<'_, P> {
        CurveSamples::new(self, steps)
    }

    pub fn point(&self, index: usize) -> Result<P> {
        self.points
            .get(index)
            .copied()
            .ok_or(NurbsError::IndexOutOfBounds {
                index,
                len: self.points.len(),
            })
    }

    pub fn set_point(&mut self, index: usize, point: P) -> Result<()> {
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(NurbsError::IndexOutOfBounds { index, len })?;
        *slot = point;
        Ok(())
    }

    /// Replace all control points. The count must match the current one.
    pub fn set_points(&mut self, points: Vec<P>) -> Result<()> {
        if points.len() != self.points.len() {
            return Err(NurbsError::ShapeMismatch {
                what: "control points",
                expected: self.points.len(),
                found: points.len(),
            });
        }
        log::debug!("NURBS curve: replaced {} points", points.len());
        self.points = points;
        Ok(())
    }

    pub fn set_weight(&mut self, index: usize, weight: f64) -> Result<()> {
        let len = self.weights.len();
        let slot = self
            .weights
            .get_mut(index)
            .ok_or(NurbsError::IndexOutOfBounds { index, len })?;
        *slot = weight;
        Ok(())
    }

    /// Replace all weights. The count must match the current one.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(NurbsError::ShapeMismatch {
                what: "weights",
                expected: self.weights.len(),
                found: weights.len(),
            });
        }
        log::debug!("NURBS curve: replaced {} weights", weights.len());
        self.weights = weights;
        Ok(())
    }
}

impl<P> NurbsCurve<P> {
    pub fn points(&self) -> &[P] {
        &self.points
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Full knot range `(knots[0], knots[last])`.
    pub fn domain(&self) -> (f64, f64) {
        knot_range(&self.knots)
    }
}

impl<P> Validate for NurbsCurve<P> {
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    fn validate(&self) -> Result<()> {
        validate_knots(&self.knots)?;
        if let Some(index) = self.weights.iter().position(|&w| !(w > 0.0)) {
            return Err(NurbsError::NonPositiveWeight { index });
        }
        Ok(())
    }
}

/// Check that a knot vector never decreases.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub(crate) fn validate_knots(knots: &[f64]) -> Result<()> {
    match knots.windows(2).position(|pair| !(pair[0] <= pair[1])) {
        Some(i) => Err(NurbsError::KnotsNotMonotonic { index: i + 1 }),
        None => Ok(()),
    }
}
