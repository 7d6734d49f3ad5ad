//! Rational (NURBS) tensor-product surfaces.

use nurbs_core::{NurbsError, Result, Validate};
use nurbs_math::{ControlPoint, Point3};
use serde::{Deserialize, Serialize};

use crate::curve::validate_knots;
use crate::nurbs::knot::{
    check_finite, check_parameter, default_knots, default_weight_grid, derived_degree, find_span, knot_range,
};
use crate::nurbs::rational;

/// Construction options for [`NurbsSurface`], resolved independently per axis.
///
/// The `s` axis runs along rows and the `t` axis along columns. Explicit knots
/// take precedence over a degree for the same axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceOptions {
    pub s_degree: Option<usize>,
    pub t_degree: Option<usize>,
    pub weights: Option<Vec<Vec<f64>>>,
    pub s_knots: Option<Vec<f64>>,
    pub t_knots: Option<Vec<f64>>,
}

/// A NURBS surface over a rectangular grid of control points.
///
/// `points[row][col]` is the control point at row `row` (s-direction) and
/// column `col` (t-direction). Knot vectors and degrees are fixed at
/// construction; points and weights can be replaced if the grid shape is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NurbsSurface<P = Point3> {
    points: Vec<Vec<P>>,
    weights: Vec<Vec<f64>>,
    s_knots: Vec<f64>,
    t_knots: Vec<f64>,
    s_degree: usize,
    t_degree: usize,
}

impl<P: ControlPoint> NurbsSurface<P> {
    /// Surface of degrees `rows - 1` and `cols - 1` with uniform weights.
    pub fn new(points: Vec<Vec<P>>) -> Result<Self> {
        Self::from_options(points, SurfaceOptions::default())
    }

    pub fn with_degrees(points: Vec<Vec<P>>, s_degree: usize, t_degree: usize) -> Result<Self> {
        Self::from_options(
            points,
            SurfaceOptions {
                s_degree: Some(s_degree),
                t_degree: Some(t_degree),
                ..Default::default()
            },
        )
    }

    pub fn with_weights(points: Vec<Vec<P>>, weights: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_options(
            points,
            SurfaceOptions {
                weights: Some(weights),
                ..Default::default()
            },
        )
    }

    pub fn with_weights_and_degrees(
        points: Vec<Vec<P>>,
        weights: Vec<Vec<f64>>,
        s_degree: usize,
        t_degree: usize,
    ) -> Result<Self> {
        Self::from_options(
            points,
            SurfaceOptions {
                s_degree: Some(s_degree),
                t_degree: Some(t_degree),
                weights: Some(weights),
                ..Default::default()
            },
        )
    }

    pub fn from_options(points: Vec<Vec<P>>, options: SurfaceOptions) -> Result<Self> {
        let rows = points.len();
        let cols = points.first().map_or(0, Vec::len);

        let weights = options
            .weights
            .unwrap_or_else(|| default_weight_grid(rows, cols));
        let s_knots = options.s_knots.unwrap_or_else(|| {
            default_knots(rows, options.s_degree.unwrap_or(rows.saturating_sub(1)))
        });
        let t_knots = options.t_knots.unwrap_or_else(|| {
            default_knots(cols, options.t_degree.unwrap_or(cols.saturating_sub(1)))
        });

        Self::from_knots(points, weights, s_knots, t_knots)
    }

    /// Surface with explicit weights and knot vectors; degrees are implied by
    /// the knot vector lengths.
    pub fn from_knots(
        points: Vec<Vec<P>>,
        weights: Vec<Vec<f64>>,
        s_knots: Vec<f64>,
        t_knots: Vec<f64>,
    ) -> Result<Self> {
        let cols = points.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(NurbsError::ShapeMismatch {
                what: "control point columns",
                expected: 1,
                found: 0,
            });
        }
        check_grid_shape("control point row", &points, points.len(), cols)?;
        check_grid_shape("weight row", &weights, points.len(), cols)?;

        let s_degree = derived_degree(&s_knots, points.len());
        if s_degree < 1 {
            return Err(NurbsError::InvalidDegree {
                axis: "s",
                degree: s_degree,
            });
        }
        let t_degree = derived_degree(&t_knots, cols);
        if t_degree < 1 {
            return Err(NurbsError::InvalidDegree {
                axis: "t",
                degree: t_degree,
            });
        }

        log::debug!(
            "NURBS surface: {}x{} points, degrees ({}, {}), s knots {:?}, t knots {:?}",
            points.len(),
            cols,
            s_degree,
            t_degree,
            s_knots,
            t_knots
        );

        Ok(Self {
            points,
            weights,
            s_knots,
            t_knots,
            s_degree: s_degree as usize,
            t_degree: t_degree as usize,
        })
    }

    /// Evaluate the surface at `(s, t)`.
    ///
    /// Parameters outside the knot ranges are clamped into them and then
    /// evaluated normally. Unlike [`NurbsCurve::evaluate`](crate::NurbsCurve::evaluate),
    /// there is no shortcut returning a raw corner control point. NaN and
    /// infinite parameters are rejected before clamping.
    pub fn evaluate(&self, s: f64, t: f64) -> Result<P> {
        check_finite(s)?;
        check_finite(t)?;
        let (s_min, s_max) = self.s_domain();
        let (t_min, t_max) = self.t_domain();
        let s = s.min(s_max).max(s_min);
        let t = t.min(t_max).max(t_min);

        let s_span = find_span(&self.s_knots, s)?;
        let t_span = find_span(&self.t_knots, t)?;
        self.evaluate_in_spans(s, s_span, t, t_span)
    }

    /// Evaluate the surface at `(s, t)` in knot spans the caller already knows.
    pub fn evaluate_in_spans(&self, s: f64, s_span: usize, t: f64, t_span: usize) -> Result<P> {
        check_parameter(s_span, s, &self.s_knots)?;
        check_parameter(t_span, t, &self.t_knots)?;
        rational::rational_surface_point(
            self.s_degree,
            self.t_degree,
            &self.s_knots,
            &self.t_knots,
            &self.points,
            &self.weights,
            (s, s_span),
            (t, t_span),
        )
    }

    pub fn point(&self, row: usize, col: usize) -> Result<P> {
        self.check_cell(row, col)?;
        Ok(self.points[row][col])
    }

    pub fn set_point(&mut self, row: usize, col: usize, point: P) -> Result<()> {
        self.check_cell(row, col)?;
        self.points[row][col] = point;
        Ok(())
    }

    /// Replace the whole control grid. The shape must match the current one.
    pub fn set_points(&mut self, points: Vec<Vec<P>>) -> Result<()> {
        check_grid_shape("control point row", &points, self.rows(), self.cols())?;
        log::debug!("NURBS surface: replaced {}x{} points", self.rows(), self.cols());
        self.points = points;
        Ok(())
    }

    pub fn set_weight(&mut self, row: usize, col: usize, weight: f64) -> Result<()> {
        self.check_cell(row, col)?;
        self.weights[row][col] = weight;
        Ok(())
    }

    /// Replace the whole weight grid. The shape must match the current one.
    pub fn set_weights(&mut self, weights: Vec<Vec<f64>>) -> Result<()> {
        check_grid_shape("weight row", &weights, self.rows(), self.cols())?;
        log::debug!("NURBS surface: replaced {}x{} weights", self.rows(), self.cols());
        self.weights = weights;
        Ok(())
    }

    fn check_cell(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows() {
            return Err(NurbsError::IndexOutOfBounds {
                index: row,
                len: self.rows(),
            });
        }
        if col >= self.cols() {
            return Err(NurbsError::IndexOutOfBounds {
                index: col,
                len: self.cols(),
            });
        }
        Ok(())
    }
}

impl<P> NurbsSurface<P> {
    pub fn points(&self) -> &[Vec<P>] {
        &self.points
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    pub fn rows(&self) -> usize {
        self.points.len()
    }

    pub fn cols(&self) -> usize {
        self.points.first().map_or(0, Vec::len)
    }

    pub fn s_knots(&self) -> &[f64] {
        &self.s_knots
    }

    pub fn t_knots(&self) -> &[f64] {
        &self.t_knots
    }

    pub fn s_degree(&self) -> usize {
        self.s_degree
    }

    pub fn t_degree(&self) -> usize {
        self.t_degree
    }

    /// Full s knot range.
    pub fn s_domain(&self) -> (f64, f64) {
        knot_range(&self.s_knots)
    }

    /// Full t knot range.
    pub fn t_domain(&self) -> (f64, f64) {
        knot_range(&self.t_knots)
    }
}

impl<P> Validate for NurbsSurface<P> {
    /// Weight indices in errors are row-major: `row * cols + col`.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    fn validate(&self) -> Result<()> {
        validate_knots(&self.s_knots)?;
        validate_knots(&self.t_knots)?;
        if let Some(index) = self.weights.iter().flatten().position(|&w| !(w > 0.0)) {
            return Err(NurbsError::NonPositiveWeight { index });
        }
        Ok(())
    }
}

/// Check that `grid` has exactly `rows` rows of `cols` entries each.
fn check_grid_shape<T>(what: &'static str, grid: &[Vec<T>], rows: usize, cols: usize) -> Result<()> {
    if grid.len() != rows {
        return Err(NurbsError::ShapeMismatch {
            what: "rows",
            expected: rows,
            found: grid.len(),
        });
    }
    match grid.iter().find(|row| row.len() != cols) {
        Some(row) => Err(NurbsError::ShapeMismatch {
            what,
            expected: cols,
            found: row.len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nurbs_math::DVec3;

    fn bilinear_grid() -> Vec<Vec<DVec3>> {
        vec![
            vec![DVec3::new(0.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0)],
            vec![DVec3::new(0.0, 1.0, 0.0), DVec3::new(1.0, 1.0, 0.0)],
        ]
    }

    fn saddle() -> NurbsSurface {
        NurbsSurface::with_weights(
            vec![
                vec![DVec3::new(0.0, 0.0, 0.0), DVec3::new(0.0, 1.0, 1.0), DVec3::new(0.0, 2.0, 0.0)],
                vec![DVec3::new(1.0, 0.0, 1.0), DVec3::new(1.0, 1.0, 0.0), DVec3::new(1.0, 2.0, 1.0)],
            ],
            vec![vec![1.0, 2.0, 1.0], vec![1.0, 0.5, 1.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_points_only_defaults() {
        let surf = NurbsSurface::new(bilinear_grid()).unwrap();
        assert_eq!((surf.rows(), surf.cols()), (2, 2));
        assert_eq!((surf.s_degree(), surf.t_degree()), (1, 1));
        assert_eq!(surf.s_knots(), &[0.0, 0.0, 1.0, 1.0]);
        assert_eq!(surf.weights(), &[vec![1.0, 1.0], vec![1.0, 1.0]]);
    }

    #[test]
    fn test_bilinear_center() {
        let surf = NurbsSurface::new(bilinear_grid()).unwrap();
        let p = surf.evaluate(0.5, 0.5).unwrap();
        assert_abs_diff_eq!(p, DVec3::new(0.5, 0.5, 0.0), epsilon = 1e-10);
    }

    #[test]
    fn test_with_degrees_per_axis() {
        let grid = vec![vec![DVec3::ZERO; 4]; 3];
        let surf = NurbsSurface::with_degrees(grid, 1, 2).unwrap();
        assert_eq!(surf.s_knots(), &[0.0, 0.0, 1.0, 2.0, 2.0]);
        assert_eq!(surf.t_knots(), &[0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0]);
        assert_eq!(surf.s_domain(), (0.0, 2.0));
        assert_eq!(surf.t_domain(), (0.0, 2.0));
    }

    #[test]
    fn test_with_weights_and_degrees() {
        let grid = vec![vec![DVec3::ZERO; 3]; 3];
        let weights = vec![vec![2.0; 3]; 3];
        let surf = NurbsSurface::with_weights_and_degrees(grid, weights, 1, 1).unwrap();
        assert_eq!((surf.s_degree(), surf.t_degree()), (1, 1));
        assert_eq!(surf.weights()[1][1], 2.0);
    }

    #[test]
    fn test_non_rectangular_grid() {
        let grid = vec![vec![DVec3::ZERO; 3], vec![DVec3::ZERO; 2]];
        let weights = vec![vec![1.0; 3], vec![1.0; 2]];
        let err = NurbsSurface::with_weights(grid, weights).unwrap_err();
        assert_eq!(
            err,
            NurbsError::ShapeMismatch {
                what: "control point row",
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn test_weight_grid_shape_mismatch() {
        let err = NurbsSurface::with_weights(bilinear_grid(), vec![vec![1.0; 2]]).unwrap_err();
        assert_eq!(
            err,
            NurbsError::ShapeMismatch {
                what: "rows",
                expected: 2,
                found: 1,
            }
        );

        let err =
            NurbsSurface::with_weights(bilinear_grid(), vec![vec![1.0; 2], vec![1.0; 3]])
                .unwrap_err();
        assert!(matches!(
            err,
            NurbsError::ShapeMismatch { what: "weight row", expected: 2, found: 3 }
        ));
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(matches!(
            NurbsSurface::<DVec3>::new(vec![]),
            Err(NurbsError::ShapeMismatch { found: 0, .. })
        ));
        assert!(matches!(
            NurbsSurface::<DVec3>::new(vec![vec![]]),
            Err(NurbsError::ShapeMismatch { found: 0, .. })
        ));
    }

    #[test]
    fn test_degree_below_one_per_axis() {
        let err = NurbsSurface::new(vec![vec![DVec3::ZERO, DVec3::X]]).unwrap_err();
        assert_eq!(err, NurbsError::InvalidDegree { axis: "s", degree: 0 });

        let err = NurbsSurface::new(vec![vec![DVec3::ZERO], vec![DVec3::X]]).unwrap_err();
        assert_eq!(err, NurbsError::InvalidDegree { axis: "t", degree: 0 });
    }

    #[test]
    fn test_out_of_range_parameters_are_clamped() {
        let surf = saddle();
        let (s_max, t_max) = (surf.s_domain().1, surf.t_domain().1);

        let below = surf.evaluate(-3.0, -1.0).unwrap();
        assert_eq!(below, surf.evaluate(0.0, 0.0).unwrap());

        let mixed = surf.evaluate(10.0, 0.25).unwrap();
        assert_eq!(mixed, surf.evaluate(s_max, 0.25).unwrap());

        let above = surf.evaluate(7.0, 9.0).unwrap();
        assert_eq!(above, surf.evaluate(s_max, t_max).unwrap());
    }

    #[test]
    fn test_clamped_edge_blends_boundary_row() {
        // Clamping to s = 0 evaluates the first row as a rational curve in t
        let surf = saddle();
        let p = surf.evaluate(-1.0, 0.5).unwrap();
        // Row 0 at t = 0.5: basis (0.25, 0.5, 0.25), weights (1, 2, 1)
        let expected = (DVec3::new(0.0, 0.0, 0.0) * 0.25
            + DVec3::new(0.0, 1.0, 1.0) * 1.0
            + DVec3::new(0.0, 2.0, 0.0) * 0.25)
            / 1.5;
        assert_abs_diff_eq!(p, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_evaluate_in_spans_errors() {
        let surf = saddle();
        assert!(matches!(
            surf.evaluate_in_spans(0.5, 1, 0.5, 9),
            Err(NurbsError::SpanOutOfRange { span: 9, .. })
        ));
        assert!(matches!(
            surf.evaluate_in_spans(0.5, 3, 0.5, 2),
            Err(NurbsError::SpanOutOfRange { span: 3, max: 2 })
        ));
        assert!(matches!(
            surf.evaluate_in_spans(0.5, 1, 0.5, 3),
            Err(NurbsError::ParameterOutOfSpan { span: 3, .. })
        ));
        assert!(matches!(
            surf.evaluate_in_spans(0.0, 0, 0.5, 2),
            Err(NurbsError::DegenerateSpan { span: 0, .. })
        ));
    }

    #[test]
    fn test_evaluate_rejects_non_finite() {
        let surf = saddle();
        assert!(matches!(
            surf.evaluate(f64::NAN, 0.5),
            Err(NurbsError::NonFiniteParameter { .. })
        ));
        assert!(matches!(
            surf.evaluate(0.5, f64::NAN),
            Err(NurbsError::NonFiniteParameter { .. })
        ));
        assert_eq!(
            surf.evaluate(f64::INFINITY, 0.5),
            Err(NurbsError::NonFiniteParameter {
                parameter: f64::INFINITY,
            })
        );
        assert!(matches!(
            surf.evaluate_in_spans(f64::NAN, 1, 0.5, 2),
            Err(NurbsError::ParameterOutOfSpan { span: 1, .. })
        ));
        assert!(matches!(
            surf.evaluate_in_spans(0.5, 1, f64::NAN, 2),
            Err(NurbsError::ParameterOutOfSpan { span: 2, .. })
        ));
    }

    #[test]
    fn test_cell_mutators() {
        let mut surf = NurbsSurface::new(bilinear_grid()).unwrap();
        surf.set_point(1, 1, DVec3::new(1.0, 1.0, 4.0)).unwrap();
        assert_eq!(surf.point(1, 1).unwrap(), DVec3::new(1.0, 1.0, 4.0));
        assert_abs_diff_eq!(
            surf.evaluate(0.5, 0.5).unwrap(),
            DVec3::new(0.5, 0.5, 1.0),
            epsilon = 1e-12
        );

        surf.set_weight(0, 0, 3.0).unwrap();
        assert_eq!(surf.weights()[0][0], 3.0);

        assert_eq!(
            surf.set_point(2, 0, DVec3::ZERO),
            Err(NurbsError::IndexOutOfBounds { index: 2, len: 2 })
        );
        assert_eq!(
            surf.set_weight(0, 5, 1.0),
            Err(NurbsError::IndexOutOfBounds { index: 5, len: 2 })
        );
        assert!(surf.point(0, 2).is_err());
    }

    #[test]
    fn test_grid_replacement_requires_same_shape() {
        let mut surf = NurbsSurface::new(bilinear_grid()).unwrap();
        let before = surf.clone();

        assert!(surf.set_points(vec![vec![DVec3::ZERO; 2]; 3]).is_err());
        assert!(surf.set_points(vec![vec![DVec3::ZERO; 3]; 2]).is_err());
        assert!(surf.set_weights(vec![vec![1.0; 2], vec![1.0]]).is_err());
        assert_eq!(surf, before);

        surf.set_points(vec![vec![DVec3::ONE; 2]; 2]).unwrap();
        surf.set_weights(vec![vec![2.0; 2]; 2]).unwrap();
        assert_abs_diff_eq!(surf.evaluate(0.3, 0.8).unwrap(), DVec3::ONE, epsilon = 1e-12);
    }

    #[test]
    fn test_validate() {
        let mut surf = saddle();
        assert!(surf.validate().is_ok());
        surf.set_weight(1, 2, -1.0).unwrap();
        assert_eq!(
            surf.validate(),
            Err(NurbsError::NonPositiveWeight { index: 5 })
        );
    }

    #[test]
    fn test_options_from_json() {
        let options: SurfaceOptions =
            serde_json::from_str(r#"{ "s_degree": 1, "t_knots": [0, 0, 0, 1, 1, 1] }"#).unwrap();
        let grid = vec![vec![DVec3::ZERO; 3]; 2];
        let surf = NurbsSurface::from_options(grid, options).unwrap();
        assert_eq!((surf.s_degree(), surf.t_degree()), (1, 2));
        assert_eq!(surf.s_knots(), &[0.0, 0.0, 1.0, 1.0]);
    }
}
