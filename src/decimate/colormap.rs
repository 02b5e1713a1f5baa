//! Colormap regridding onto a bounded lattice.

use super::DecimationScratch;
use crate::axis::AxisScale;
use crate::datasource::XYZView;
use crate::view::Range;

/// Dense colormap cells on a regular `(x, y)` lattice.
///
/// Cells are stored row by row along y: cell `(i, j)` lives at
/// `values[j * columns + i]`. Cells that received no sample are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapGrid {
    x_axis: Vec<f64>,
    y_axis: Vec<f64>,
    values: Vec<f64>,
}

impl ColorMapGrid {
    /// A grid without cells, shown where there is nothing to draw.
    pub fn empty() -> Self {
        Self {
            x_axis: Vec::new(),
            y_axis: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Check whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of x cells.
    pub fn columns(&self) -> usize {
        self.x_axis.len()
    }

    /// Number of y cells.
    pub fn rows(&self) -> usize {
        self.y_axis.len()
    }

    /// Lower edge of each x cell.
    pub fn x_axis(&self) -> &[f64] {
        &self.x_axis
    }

    /// Lower edge of each y cell.
    pub fn y_axis(&self) -> &[f64] {
        &self.y_axis
    }

    /// Cell values, y-major.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of cell `(i, j)`, or `None` outside the grid.
    pub fn cell(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.columns() || j >= self.rows() {
            return None;
        }
        self.values.get(j * self.columns() + i).copied()
    }

    /// X extent covered by the cell edges.
    pub fn x_range(&self) -> Range {
        edge_range(&self.x_axis)
    }

    /// Y extent covered by the cell edges.
    pub fn y_range(&self) -> Range {
        edge_range(&self.y_axis)
    }

    /// Smallest and largest finite cell value, NaN when every cell is empty.
    pub fn data_bounds(&self) -> Range {
        let mut bounds: Option<Range> = None;
        for value in self.values.iter().copied().filter(|v| v.is_finite()) {
            match bounds.as_mut() {
                Some(range) => range.expand_to_include(value),
                None => bounds = Some(Range::new(value, value)),
            }
        }
        bounds.unwrap_or(Range::nan())
    }
}

fn edge_range(axis: &[f64]) -> Range {
    match (axis.first(), axis.last()) {
        (Some(first), Some(last)) => Range::new(*first, *last),
        _ => Range::nan(),
    }
}

struct Cells<'s> {
    sums: &'s mut [f64],
    counts: &'s mut [u32],
    columns: usize,
}

impl Cells<'_> {
    #[inline]
    fn add(&mut self, i: usize, j: usize, z: f64) {
        if z.is_nan() {
            return;
        }
        let index = j * self.columns + i;
        self.sums[index] += z;
        self.counts[index] += 1;
    }

    /// Spread one sample row along y into column `i`.
    ///
    /// Y edges skipped between two channels take the lower channel's value.
    fn add_row(&mut self, view: &XYZView<'_>, row: usize, i: usize, y_axis: &[f64]) {
        let channels = view.channels();
        let mut j_dest = 0;
        for j in 0..channels {
            let y = view.y(row, j);
            if y.is_nan() {
                continue;
            }
            while j_dest + 1 < y_axis.len() && y > y_axis[j_dest] {
                if j > 0 && j + 1 != channels {
                    self.add(i, j_dest, view.z(row, j - 1));
                }
                j_dest += 1;
            }
            self.add(i, j_dest, view.z(row, j));
        }
    }

    fn averages(&self) -> Vec<f64> {
        self.sums
            .iter()
            .zip(self.counts.iter())
            .map(|(sum, count)| match *count {
                0 => f64::NAN,
                count => sum / f64::from(count),
            })
            .collect()
    }
}

/// Regrid a colormap window onto at most `max_columns x max_rows` cells.
///
/// See [`regrid_with`].
pub fn regrid(
    view: &XYZView<'_>,
    max_columns: usize,
    max_rows: usize,
    y_scale: AxisScale,
) -> Option<ColorMapGrid> {
    regrid_with(
        view,
        max_columns,
        max_rows,
        y_scale,
        &mut DecimationScratch::new(),
    )
}

/// Regrid a colormap window, reusing `scratch` for the cell accumulators.
///
/// The x axis has `min(max_columns, len)` linear edges from the first to the
/// last sample. The y axis has `min(max_rows, channels)` edges over the
/// NaN-safe y bounds, geometric when `y_scale` is logarithmic; a log scale
/// over non-positive y falls back to linear edges. Each cell averages the
/// `z` samples mapped onto it. Cells the x scan steps over are filled from
/// the next sample unless the sample spacing jumps by more than half, which
/// marks a data gap and leaves those cells NaN.
///
/// Returns `None` for windows with fewer than two samples, no channels or
/// non-finite bounds.
pub fn regrid_with(
    view: &XYZView<'_>,
    max_columns: usize,
    max_rows: usize,
    y_scale: AxisScale,
    scratch: &mut DecimationScratch,
) -> Option<ColorMapGrid> {
    let len = view.len();
    let channels = view.channels();
    if len < 2 || channels == 0 {
        return None;
    }
    let columns = max_columns.min(len);
    let rows = max_rows.min(channels);

    let x_axis = AxisScale::Linear.grid(Range::new(view.x(0), view.x(len - 1)), columns)?;
    let y_bounds = view.y_bounds();
    let y_axis = match y_scale.grid(y_bounds, rows) {
        Some(axis) => axis,
        None if y_scale.is_log() => {
            tracing::warn!(
                min = y_bounds.min,
                max = y_bounds.max,
                "y range not usable on a log axis, regridding linearly"
            );
            AxisScale::Linear.grid(y_bounds, rows)?
        }
        None => return None,
    };

    let (sums, counts) = scratch.reset(columns * rows);
    let mut cells = Cells {
        sums,
        counts,
        columns,
    };

    let mut i_dest = 0;
    let mut prev_dx = view.x(1) - view.x(0);
    for row in 0..len {
        let x = view.x(row);
        let dx = if row == 0 {
            prev_dx
        } else {
            x - view.x(row - 1)
        };
        while i_dest + 1 < columns && x > x_axis[i_dest] {
            if row + 1 < len {
                let next_dx = view.x(row + 1) - x;
                let regular = dx == 0.0 || (next_dx < 1.5 * dx && dx < 1.5 * prev_dx);
                if regular {
                    cells.add_row(view, row, i_dest, &y_axis);
                }
            }
            i_dest += 1;
        }
        cells.add_row(view, row, i_dest, &y_axis);
        prev_dx = dx;
    }

    let values = cells.averages();
    Some(ColorMapGrid {
        x_axis,
        y_axis,
        values,
    })
}
