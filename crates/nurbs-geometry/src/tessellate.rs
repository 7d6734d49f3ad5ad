//! Sampling of curves and surfaces into discrete point sets.
//!
//! Parameters are visited in increasing order with a forward-only [`SpanCursor`],
//! so every sample goes through the explicit-span evaluation path without a
//! span lookup of its own.

use std::iter::FusedIterator;

use nurbs_core::{NurbsError, Result};
use nurbs_math::ControlPoint;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::curve::NurbsCurve;
use crate::nurbs::knot::{knot_range, SpanCursor};
use crate::surface::NurbsSurface;

/// Parameter of sample `index` out of `steps`, spread evenly over `(lo, hi)`.
fn parameter_at((lo, hi): (f64, f64), index: usize, steps: usize) -> f64 {
    if index >= steps {
        hi
    } else {
        lo + (hi - lo) * index as f64 / steps as f64
    }
}

/// `steps + 1` evenly spaced parameters over the full knot range, each with its span.
fn parameter_spans(knots: &[f64], steps: usize) -> Vec<(f64, usize)> {
    let range = knot_range(knots);
    let mut cursor = SpanCursor::new();
    (0..=steps)
        .map(|i| {
            let t = parameter_at(range, i, steps);
            (t, cursor.advance(knots, t))
        })
        .collect()
}

/// Lazy sequence of `steps + 1` curve points over the full knot range.
///
/// A clone continues from the same position; call [`NurbsCurve::samples`]
/// again to start over.
#[derive(Debug, Clone)]
pub struct CurveSamples<'a, P> {
    curve: &'a NurbsCurve<P>,
    steps: usize,
    next: usize,
    cursor: SpanCursor,
}

impl<'a, P: ControlPoint> CurveSamples<'a, P> {
    /// A step count of zero is treated as one.
    pub(crate) fn new(curve: &'a NurbsCurve<P>, steps: usize) -> Self {
        let steps = steps.max(1);
        log::trace!(
            "sampling curve: {} steps over {:?}",
            steps,
            curve.domain()
        );
        Self {
            curve,
            steps,
            next: 0,
            cursor: SpanCursor::new(),
        }
    }
}

impl<P: ControlPoint> Iterator for CurveSamples<'_, P> {
    type Item = Result<P>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.steps {
            return None;
        }
        let knots = self.curve.knots();
        let t = parameter_at(self.curve.domain(), self.next, self.steps);
        let span = self.cursor.advance(knots, t);
        self.next += 1;
        Some(self.curve.evaluate_in_span(t, span))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.steps + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<P: ControlPoint> ExactSizeIterator for CurveSamples<'_, P> {}

impl<P: ControlPoint> FusedIterator for CurveSamples<'_, P> {}

/// Convert a curve to a polyline of `steps + 1` evenly spaced samples.
///
/// # Arguments
/// * `curve` - The curve to sample
/// * `steps` - Number of segments; zero is treated as one
pub fn curve_to_polyline<P: ControlPoint>(curve: &NurbsCurve<P>, steps: usize) -> Result<Vec<P>> {
    curve.samples(steps).collect()
}

/// Sample a surface on a regular `(s_steps + 1) x (t_steps + 1)` parameter grid.
///
/// `grid[i][j]` is the point at the `i`-th s parameter and `j`-th t parameter.
/// With the `parallel` feature rows are evaluated on the rayon thread pool.
pub fn surface_to_grid<P: ControlPoint>(
    surface: &NurbsSurface<P>,
    s_steps: usize,
    t_steps: usize,
) -> Result<Vec<Vec<P>>> {
    let s_params = parameter_spans(surface.s_knots(), s_steps.max(1));
    let t_params = parameter_spans(surface.t_knots(), t_steps.max(1));
    log::trace!(
        "sampling surface: {}x{} samples over {:?} x {:?}",
        s_params.len(),
        t_params.len(),
        surface.s_domain(),
        surface.t_domain()
    );

    let row = |&(s, s_span): &(f64, usize)| -> Result<Vec<P>> {
        t_params
            .iter()
            .map(|&(t, t_span)| surface.evaluate_in_spans(s, s_span, t, t_span))
            .collect()
    };

    #[cfg(feature = "parallel")]
    let grid: Result<Vec<Vec<P>>> = s_params.par_iter().map(row).collect();
    #[cfg(not(feature = "parallel"))]
    let grid: Result<Vec<Vec<P>>> = s_params.iter().map(row).collect();

    grid
}

/// Check that every vertex of a mesh with `count` vertices has a `u32` index.
fn check_vertex_count(count: usize) -> Result<()> {
    if count > 0 && u32::try_from(count - 1).is_err() {
        return Err(NurbsError::IndexOutOfBounds {
            index: count - 1,
            len: u32::MAX as usize + 1,
        });
    }
    Ok(())
}

/// Convert a surface to a triangle mesh using uniform parameter subdivision.
///
/// # Returns
/// A tuple of `(vertices, triangles)`: vertices in row-major grid order and two
/// triangles per grid cell as vertex index triples.
///
/// # Errors
/// `IndexOutOfBounds` if the grid has more vertices than `u32` indices can address.
pub fn surface_to_triangles<P: ControlPoint>(
    surface: &NurbsSurface<P>,
    s_steps: usize,
    t_steps: usize,
) -> Result<(Vec<P>, Vec<[u32; 3]>)> {
    let grid = surface_to_grid(surface, s_steps, t_steps)?;
    let s_count = grid.len();
    let t_count = grid.first().map_or(0, Vec::len);
    check_vertex_count(s_count * t_count)?;
    let vertices: Vec<P> = grid.into_iter().flatten().collect();

    let idx = |i: usize, j: usize| -> u32 { (i * t_count + j) as u32 };

    let mut triangles = Vec::with_capacity(2 * s_count.saturating_sub(1) * t_count.saturating_sub(1));
    for i in 0..s_count.saturating_sub(1) {
        for j in 0..t_count.saturating_sub(1) {
            triangles.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
            triangles.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }

    Ok((vertices, triangles))
}
