//! Rational (weighted) blending of control points over one knot span.

use nurbs_core::Result;
use nurbs_math::point::weighted_sum;
use nurbs_math::ControlPoint;

use super::knot::basis_functions;

/// Global indices of the control points active in `span`, as `(first_local, first_global, count)`.
///
/// Local indices below `degree - span` would map before the first control point and
/// indices at or past `point_count` after the last one; both are dropped.
fn active_range(span: usize, degree: usize, point_count: usize) -> (usize, usize, usize) {
    let first_local = degree.saturating_sub(span);
    let first_global = first_local + span - degree;
    let count = (degree + 1 - first_local).min(point_count.saturating_sub(first_global));
    (first_local, first_global, count)
}

fn normalize(factors: &mut [f64]) {
    let sum: f64 = factors.iter().sum();
    if sum == 0.0 {
        log::warn!("rational blend has zero weight sum; weights must be positive");
    }
    for f in factors.iter_mut() {
        *f /= sum;
    }
}

/// Evaluate a rational curve point at `t` inside knot span `span`.
///
/// The span is assumed to have been validated against `t` by the caller.
pub fn rational_curve_point<P: ControlPoint>(
    degree: usize,
    knots: &[f64],
    points: &[P],
    weights: &[f64],
    span: usize,
    t: f64,
) -> Result<P> {
    let basis = basis_functions(span, t, degree, knots)?;
    let (first_local, first_global, count) = active_range(span, degree, points.len());

    let mut factors: Vec<f64> = (0..count)
        .map(|i| basis[first_local + i] * weights[first_global + i])
        .collect();
    normalize(&mut factors);

    Ok(weighted_sum(&points[first_global..], &factors))
}

/// Evaluate a rational tensor-product surface point at `(s, t)` inside spans `(s_span, t_span)`.
///
/// `points[row][col]`: rows follow `s`, columns follow `t`.
#[allow(clippy::too_many_arguments)]
pub fn rational_surface_point<P: ControlPoint>(
    s_degree: usize,
    t_degree: usize,
    s_knots: &[f64],
    t_knots: &[f64],
    points: &[Vec<P>],
    weights: &[Vec<f64>],
    (s, s_span): (f64, usize),
    (t, t_span): (f64, usize),
) -> Result<P> {
    let s_basis = basis_functions(s_span, s, s_degree, s_knots)?;
    let t_basis = basis_functions(t_span, t, t_degree, t_knots)?;

    let col_count = points.first().map_or(0, Vec::len);
    let (s_local, row0, rows) = active_range(s_span, s_degree, points.len());
    let (t_local, col0, cols) = active_range(t_span, t_degree, col_count);

    let mut factors: Vec<f64> = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        let sb = s_basis[s_local + i];
        let weight_row = &weights[row0 + i];
        for j in 0..cols {
            factors.push(sb * t_basis[t_local + j] * weight_row[col0 + j]);
        }
    }
    normalize(&mut factors);

    Ok(factors
        .chunks(cols.max(1))
        .zip(&points[row0..])
        .fold(P::ZERO, |acc, (row_factors, row)| {
            acc + weighted_sum(&row[col0..], row_factors)
        }))
}
