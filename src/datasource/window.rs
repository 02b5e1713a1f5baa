//! Windowed views pairing x with y (and z) over a shared index range.

use std::ops::Range as IndexRange;

use super::array::ArrayView;
use super::buffer::Buffer;
use super::{lower_bound, upper_bound};
use crate::view::Range;

/// Resolve an x-value window to an index window.
///
/// The start is the first index whose x is greater than `x_start`, the stop
/// the first index whose x is not less than `x_stop`.
pub fn index_window(x: &Buffer, x_start: f64, x_stop: f64) -> IndexRange<usize> {
    let view = ArrayView::new(x);
    let start = upper_bound(&view, x_start);
    let stop = lower_bound(&view, x_stop);
    start..stop.max(start)
}

fn leading_len(x: &Buffer, rest: &[&Buffer]) -> usize {
    // An x buffer without a column has no keys to window.
    if x.cols() == 0 {
        return 0;
    }
    debug_assert!(
        rest.iter().all(|buffer| buffer.len() == x.len()),
        "buffers disagree on leading axis length"
    );
    rest.iter().map(|buffer| buffer.len()).fold(x.len(), usize::min)
}

fn clamp_window(rows: IndexRange<usize>, len: usize) -> (usize, usize) {
    let stop = rows.end.min(len);
    (rows.start.min(stop), stop)
}

/// Synchronized `(x, y)` access over rows `start..stop`.
///
/// `y` may hold several columns, one per line.
#[derive(Debug, Clone, Copy)]
pub struct XYView<'a> {
    x: ArrayView<'a>,
    y: ArrayView<'a>,
}

impl<'a> XYView<'a> {
    /// Window rows `rows` of `x` and `y`.
    ///
    /// Lengths that disagree are a producer bug: debug builds assert, release
    /// builds clamp to the shorter buffer.
    pub fn new(x: &'a Buffer, y: &'a Buffer, rows: IndexRange<usize>) -> Self {
        let (start, stop) = clamp_window(rows, leading_len(x, &[y]));
        Self {
            x: ArrayView::new(x).slice_rows(start, stop),
            y: ArrayView::new(y).slice_rows(start, stop),
        }
    }

    /// Window every row of `x` and `y`.
    pub fn full(x: &'a Buffer, y: &'a Buffer) -> Self {
        Self::new(x, y, 0..usize::MAX)
    }

    /// Window the rows whose x lies in the value range, resolved by binary
    /// search (`x` must be sorted ascending).
    pub fn from_x_range(x: &'a Buffer, y: &'a Buffer, x_start: f64, x_stop: f64) -> Self {
        Self::new(x, y, index_window(x, x_start, x_stop))
    }

    /// Number of rows in the window.
    pub fn len(&self) -> usize {
        self.x.rows()
    }

    /// Check whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Number of y columns (lines).
    pub fn columns(&self) -> usize {
        self.y.cols()
    }

    /// X value of row `i`.
    #[inline]
    pub fn x(&self, i: usize) -> f64 {
        self.x.element(i, 0)
    }

    /// Y value of row `i`, column `col`.
    #[inline]
    pub fn y(&self, i: usize, col: usize) -> f64 {
        self.y.element(i, col)
    }

    /// First and last x values of the window, or NaN when empty.
    pub fn x_range(&self) -> Range {
        match self.len() {
            0 => Range::nan(),
            len => Range::new(self.x(0), self.x(len - 1)),
        }
    }
}

/// Synchronized `(x, y, z)` access for colormap data.
///
/// `z` is `rows x channels`. `y` is either 2-D (one y axis per row) or 1-D
/// (a single y axis broadcast to every row).
#[derive(Debug, Clone, Copy)]
pub struct XYZView<'a> {
    x: ArrayView<'a>,
    y: ArrayView<'a>,
    z: ArrayView<'a>,
    y_is_2d: bool,
}

impl<'a> XYZView<'a> {
    /// Window rows `rows` of `x`, `z` and a 2-D `y`.
    pub fn new(x: &'a Buffer, y: &'a Buffer, z: &'a Buffer, rows: IndexRange<usize>) -> Self {
        let y_is_2d = y.ndim() == 2;
        let len = if y_is_2d {
            leading_len(x, &[y, z])
        } else {
            leading_len(x, &[z])
        };
        let (start, stop) = clamp_window(rows, len);
        let y_view = if y_is_2d {
            ArrayView::new(y).slice_rows(start, stop)
        } else {
            ArrayView::new(y)
        };
        Self {
            x: ArrayView::new(x).slice_rows(start, stop),
            y: y_view,
            z: ArrayView::new(z).slice_rows(start, stop),
            y_is_2d,
        }
    }

    /// Window every row.
    pub fn full(x: &'a Buffer, y: &'a Buffer, z: &'a Buffer) -> Self {
        Self::new(x, y, z, 0..usize::MAX)
    }

    /// Window the rows whose x lies in the value range.
    pub fn from_x_range(
        x: &'a Buffer,
        y: &'a Buffer,
        z: &'a Buffer,
        x_start: f64,
        x_stop: f64,
    ) -> Self {
        Self::new(x, y, z, index_window(x, x_start, x_stop))
    }

    /// Number of rows in the window.
    pub fn len(&self) -> usize {
        self.x.rows()
    }

    /// Check whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// X value of row `i`.
    #[inline]
    pub fn x(&self, i: usize) -> f64 {
        self.x.element(i, 0)
    }

    /// Y value for row `i`, channel `j`.
    #[inline]
    pub fn y(&self, i: usize, j: usize) -> f64 {
        if self.y_is_2d {
            self.y.element(i, j)
        } else {
            self.y.element(j, 0)
        }
    }

    /// Z value for row `i`, channel `j`.
    #[inline]
    pub fn z(&self, i: usize, j: usize) -> f64 {
        self.z.element(i, j)
    }

    /// Whether each row carries its own y axis.
    pub fn y_is_2d(&self) -> bool {
        self.y_is_2d
    }

    /// `(rows, channels)` of y; a broadcast y reports one row.
    pub fn y_shape(&self) -> (usize, usize) {
        if self.y_is_2d {
            (self.y.rows(), self.y.cols())
        } else {
            (1, self.y.rows())
        }
    }

    /// `(rows, channels)` of z.
    pub fn z_shape(&self) -> (usize, usize) {
        (self.z.rows(), self.z.cols())
    }

    /// Number of channels shared by y and z.
    pub fn channels(&self) -> usize {
        self.z.cols().min(self.y_shape().1)
    }

    /// Smallest and largest y over the window, ignoring NaN.
    ///
    /// Each row's y axis is assumed ascending: the minimum is the first
    /// non-NaN value and the maximum the last one.
    pub fn y_bounds(&self) -> Range {
        let (rows, channels) = self.y_shape();
        let rows = if self.y_is_2d { rows } else { 1 };
        let mut min = f64::NAN;
        let mut max = f64::NAN;
        for row in 0..rows {
            let first = (0..channels)
                .map(|j| self.y(row, j))
                .find(|value| !value.is_nan());
            let last = (0..channels)
                .rev()
                .map(|j| self.y(row, j))
                .find(|value| !value.is_nan());
            if let Some(first) = first {
                min = min.min(first);
            }
            if let Some(last) = last {
                max = max.max(last);
            }
        }
        Range { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::MemoryOrder;

    fn ramp(len: usize) -> Buffer {
        Buffer::from_vec((0..len).map(|i| i as f64).collect())
    }

    #[test]
    fn x_range_window_uses_upper_and_lower_bound() {
        let x = ramp(10);
        let y = ramp(10);
        let view = XYView::from_x_range(&x, &y, 2.0, 5.0);
        // upper_bound(2.0) = 3, lower_bound(5.0) = 5
        assert_eq!(view.len(), 2);
        assert_eq!(view.x(0), 3.0);
        assert_eq!(view.x(1), 4.0);
    }

    #[test]
    fn fractional_bounds_cover_inner_samples() {
        let x = ramp(10);
        let y = ramp(10);
        let view = XYView::from_x_range(&x, &y, 1.5, 6.5);
        assert_eq!(view.len(), 5);
        assert_eq!(view.x_range(), Range::new(2.0, 6.0));
    }

    #[test]
    fn window_outside_data_is_empty() {
        let x = ramp(10);
        let y = ramp(10);
        assert!(XYView::from_x_range(&x, &y, 20.0, 30.0).is_empty());
        assert!(XYView::from_x_range(&x, &y, -30.0, -20.0).is_empty());
        assert!(XYView::from_x_range(&x, &y, 6.0, 3.0).is_empty());
        let empty = XYView::from_x_range(&x, &y, 20.0, 30.0);
        assert!(empty.x_range().min.is_nan());
    }

    #[test]
    fn zero_width_buffers_expose_no_columns() {
        let x = ramp(5);
        let y = Buffer::from_vec_2d(Vec::new(), 5, 0, MemoryOrder::RowMajor).expect("valid y");
        let view = XYView::full(&x, &y);
        assert_eq!(view.len(), 5);
        assert_eq!(view.columns(), 0);
        let mut out = Vec::new();
        let kind = crate::decimate::decimate_minmax(&view, 0, 100, &mut out);
        assert_eq!(kind, crate::decimate::Decimation::Empty);
        assert!(out.is_empty());

        let keyless = Buffer::from_vec_2d(Vec::new(), 5, 0, MemoryOrder::ColumnMajor)
            .expect("valid x");
        let y = ramp(5);
        assert!(XYView::full(&keyless, &y).is_empty());
        assert!(XYView::from_x_range(&keyless, &y, 0.0, 10.0).is_empty());
        assert!(keyless.x_bounds().min.is_nan());
    }

    #[test]
    fn index_window_clamps_to_data() {
        let x = ramp(4);
        let y = ramp(4);
        let view = XYView::new(&x, &y, 2..100);
        assert_eq!(view.len(), 2);
        assert_eq!(view.y(1, 0), 3.0);
    }

    #[test]
    fn multi_column_y_is_addressed_by_column() {
        let x = ramp(3);
        let y = Buffer::from_vec_2d(
            vec![0.0, 100.0, 1.0, 101.0, 2.0, 102.0],
            3,
            2,
            MemoryOrder::RowMajor,
        )
        .expect("valid y");
        let view = XYView::new(&x, &y, 1..3);
        assert_eq!(view.columns(), 2);
        assert_eq!(view.y(0, 0), 1.0);
        assert_eq!(view.y(1, 1), 102.0);
    }

    #[test]
    fn one_dimensional_y_is_broadcast_across_rows() {
        let x = ramp(4);
        let y = Buffer::from_vec(vec![10.0, 20.0, 30.0]);
        let z = Buffer::from_vec_2d((0..12).map(f64::from).collect(), 4, 3, MemoryOrder::RowMajor)
            .expect("valid z");
        let view = XYZView::new(&x, &y, &z, 1..3);
        assert!(!view.y_is_2d());
        assert_eq!(view.len(), 2);
        assert_eq!(view.y(0, 2), 30.0);
        assert_eq!(view.y(1, 2), 30.0);
        assert_eq!(view.z(0, 0), 3.0);
        assert_eq!(view.y_shape(), (1, 3));
        assert_eq!(view.z_shape(), (2, 3));
    }

    #[test]
    fn y_bounds_skip_nan_edges() {
        let x = ramp(2);
        let y = Buffer::from_vec_2d(
            vec![f64::NAN, 2.0, 8.0, 1.0, 5.0, f64::NAN],
            2,
            3,
            MemoryOrder::RowMajor,
        )
        .expect("valid y");
        let z = Buffer::from_vec_2d(vec![0.0; 6], 2, 3, MemoryOrder::RowMajor).expect("valid z");
        let view = XYZView::full(&x, &y, &z);
        assert_eq!(view.y_bounds(), Range::new(1.0, 8.0));
    }
}
