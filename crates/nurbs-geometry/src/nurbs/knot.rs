//! Knot vector utilities for NURBS evaluation.

use nurbs_core::{NurbsError, Result};

/// Compute the non-vanishing basis functions of knot span `span` at parameter `t`.
///
/// Returns `degree + 1` values: N_{span-degree,degree}(t) through N_{span,degree}(t).
/// Entries whose basis function would reach outside the knot vector are left at zero.
///
/// Ratios `(t - knots[j]) / (knots[j+n] - knots[j])` over a zero-length interval are
/// taken as 1, which is what makes repeated knots behave.
///
/// # Arguments
/// * `span` - The knot span index, `knots[span] <= t <= knots[span + 1]`
/// * `t` - Parameter value
/// * `degree` - Degree of the basis functions
/// * `knots` - The knot vector
///
/// # Errors
/// `SpanOutOfRange` if `span + 1` is not a valid knot index, `DegenerateSpan` if the
/// span has zero length.
pub fn basis_functions(span: usize, t: f64, degree: usize, knots: &[f64]) -> Result<Vec<f64>> {
    check_span(span, knots)?;
    if knots[span + 1] <= knots[span] {
        return Err(NurbsError::DegenerateSpan {
            span,
            knot: knots[span],
        });
    }

    let ratio = |n: usize, j: usize| {
        let width = knots[j + n] - knots[j];
        if width <= 0.0 {
            1.0
        } else {
            (t - knots[j]) / width
        }
    };

    // table[n][i] holds N_{i+span-degree, n}(t)
    let mut table = vec![vec![0.0; degree + 1]; degree + 1];

    for n in 0..=degree {
        let first = (degree - n).max(degree.saturating_sub(span));
        for i in first..=degree {
            let j = i + span - degree;
            if j + n + 1 >= knots.len() {
                break;
            }
            if n == 0 {
                table[0][i] = 1.0;
                continue;
            }

            let left = if i <= degree - n { 0.0 } else { table[n - 1][i] };
            let right = if i + 1 > degree { 0.0 } else { table[n - 1][i + 1] };

            table[n][i] = left * ratio(n, j) + right * (1.0 - ratio(n, j + 1));
        }
    }

    Ok(table.swap_remove(degree))
}

/// Default knot vector for `point_count` control points of the given degree.
///
/// Every nontrivial span has length 1, with `degree` zero-length spans at each end.
pub fn default_knots(point_count: usize, degree: usize) -> Vec<f64> {
    (0..point_count + degree + 1)
        .map(|i| i.min(point_count).saturating_sub(degree) as f64)
        .collect()
}

/// Default (uniform) weights.
pub fn default_weights(len: usize) -> Vec<f64> {
    vec![1.0; len]
}

/// Default (uniform) weight grid of `rows` x `cols`.
pub fn default_weight_grid(rows: usize, cols: usize) -> Vec<Vec<f64>> {
    vec![default_weights(cols); rows]
}

/// Degree implied by a knot vector for `point_count` control points.
///
/// Signed, since a short knot vector implies a negative degree.
pub fn derived_degree(knots: &[f64], point_count: usize) -> isize {
    knots.len() as isize - point_count as isize - 1
}

/// Find the knot span to evaluate parameter `t` in.
///
/// Returns the smallest non-degenerate span `k` with `knots[k + 1] >= t`. The
/// caller is expected to have brought `t` into `[knots[0], knots[last]]`.
pub fn find_span(knots: &[f64], t: f64) -> Result<usize> {
    (0..knots.len().saturating_sub(1))
        .find(|&k| knots[k + 1] > knots[k] && knots[k + 1] >= t)
        .ok_or(NurbsError::DegenerateSpan {
            span: 0,
            knot: knots.first().copied().unwrap_or_default(),
        })
}

/// Check that `span` is a valid span index and `t` lies within it.
pub fn check_parameter(span: usize, t: f64, knots: &[f64]) -> Result<()> {
    check_span(span, knots)?;
    let (lower, upper) = (knots[span], knots[span + 1]);
    if !(lower <= t && t <= upper) {
        return Err(NurbsError::ParameterOutOfSpan {
            parameter: t,
            span,
            lower,
            upper,
        });
    }
    Ok(())
}

/// Reject NaN and infinite parameters.
pub fn check_finite(t: f64) -> Result<()> {
    if !t.is_finite() {
        return Err(NurbsError::NonFiniteParameter { parameter: t });
    }
    Ok(())
}

fn check_span(span: usize, knots: &[f64]) -> Result<()> {
    if span + 1 >= knots.len() {
        return Err(NurbsError::SpanOutOfRange {
            span,
            max: knots.len().saturating_sub(2),
        });
    }
    Ok(())
}

/// Full parameter range `(knots[0], knots[last])`.
pub fn knot_range(knots: &[f64]) -> (f64, f64) {
    match (knots.first(), knots.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => (0.0, 0.0),
    }
}

/// Forward-only knot span tracker for parameters visited in increasing order.
///
/// Sampling many nearby parameters this way avoids a linear scan per sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanCursor {
    span: usize,
}

impl SpanCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current span index.
    pub fn span(&self) -> usize {
        self.span
    }

    /// Move forward to the span containing `t` and return it.
    ///
    /// `t` must not be smaller than any parameter passed previously.
    pub fn advance(&mut self, knots: &[f64], t: f64) -> usize {
        let (_, last) = knot_range(knots);
        if knots.len() < 2 {
            return self.span;
        }

        while self.span + 2 < knots.len() && knots[self.span + 1] <= t && t < last {
            self.span += 1;
        }

        // At the last knot settle on the first span that reaches it
        if t >= last {
            while self.span + 2 < knots.len() && knots[self.span + 1] < last {
                self.span += 1;
            }
        }

        self.span
    }
}
