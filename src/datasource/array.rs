//! Strided, shape-aware views over [`Buffer`] values.

use super::buffer::{Buffer, MemoryOrder};

/// Read-only `(row, col)` view over a buffer, optionally restricted to a
/// contiguous range of rows.
///
/// A 1-D buffer behaves as a single-column view; a 2-D buffer keeps its
/// declared column count, which may be zero.
#[derive(Debug, Clone, Copy)]
pub struct ArrayView<'a> {
    values: &'a [f64],
    total_rows: usize,
    cols: usize,
    order: MemoryOrder,
    start: usize,
    stop: usize,
}

impl<'a> ArrayView<'a> {
    /// View every row of a buffer.
    pub fn new(buffer: &'a Buffer) -> Self {
        Self {
            values: buffer.values(),
            total_rows: buffer.len(),
            cols: buffer.cols(),
            order: buffer.order(),
            start: 0,
            stop: buffer.len(),
        }
    }

    /// Restrict the view to rows `start..stop`, relative to this view.
    ///
    /// Bounds are clamped; an inverted range yields an empty view.
    pub fn slice_rows(&self, start: usize, stop: usize) -> Self {
        let len = self.rows();
        let stop = stop.min(len);
        let start = start.min(stop);
        Self {
            start: self.start + start,
            stop: self.start + stop,
            ..*self
        }
    }

    /// Number of rows in the view.
    pub fn rows(&self) -> usize {
        self.stop - self.start
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Check whether the view has no rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// Distance between two consecutive rows of the same column.
    pub fn row_stride(&self) -> usize {
        match self.order {
            MemoryOrder::RowMajor => self.cols,
            MemoryOrder::ColumnMajor => 1,
        }
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        let row = self.start + row;
        match self.order {
            MemoryOrder::RowMajor => row * self.cols + col,
            MemoryOrder::ColumnMajor => row + col * self.total_rows,
        }
    }

    /// Element at `(row, col)`.
    ///
    /// Panics when the index lies outside the view.
    #[inline]
    pub fn element(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.rows() && col < self.cols);
        self.values[self.offset(row, col)]
    }

    /// Element at `(row, col)`, or `None` outside the view.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows() || col >= self.cols {
            return None;
        }
        self.values.get(self.offset(row, col)).copied()
    }

    /// Iterate one column from `start_row` to the end of the view.
    pub fn column(&self, start_row: usize, col: usize) -> impl Iterator<Item = f64> + use<'a> {
        let count = if col < self.cols {
            self.rows().saturating_sub(start_row)
        } else {
            0
        };
        let first = if count > 0 {
            self.offset(start_row, col)
        } else {
            self.values.len()
        };
        self.values[first..]
            .iter()
            .step_by(self.row_stride())
            .take(count)
            .copied()
    }
}
