//! Shared, immutable numeric buffers handed in by data producers.

use std::fmt;
use std::sync::Arc;

use crate::error::BufferError;
use crate::view::Range;

const F64_SIZE: usize = std::mem::size_of::<f64>();

/// Scalar type declared by a host array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// 64-bit IEEE-754 float.
    F64,
    /// 32-bit IEEE-754 float.
    F32,
    /// 64-bit signed integer.
    I64,
    /// 32-bit signed integer.
    I32,
    /// Any other element type.
    Other,
}

/// Memory order of a 2-D buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOrder {
    /// Rows are contiguous (C order).
    RowMajor,
    /// Columns are contiguous (Fortran order).
    ColumnMajor,
}

/// An externally-owned array exposed through a buffer-protocol-like contract.
///
/// Implementors must keep the values returned by [`HostArray::as_f64`]
/// unchanged for as long as the array is alive.
pub trait HostArray: Send + Sync {
    /// Declared element type.
    fn scalar_type(&self) -> ScalarType;

    /// Declared element size in bytes.
    fn item_size(&self) -> usize;

    /// Array shape, leading axis first.
    fn shape(&self) -> &[usize];

    /// Byte strides, one per dimension.
    fn strides(&self) -> &[isize];

    /// The elements as a flat slice, or `None` when they are not `f64`.
    fn as_f64(&self) -> Option<&[f64]>;
}

/// A host array backed by an owned `Vec<f64>`.
#[derive(Debug, Clone)]
pub struct OwnedArray {
    values: Vec<f64>,
    shape: Vec<usize>,
    strides: Vec<isize>,
}

impl OwnedArray {
    /// Wrap a 1-D vector.
    pub fn from_vec(values: Vec<f64>) -> Self {
        let shape = vec![values.len()];
        Self {
            values,
            shape,
            strides: vec![F64_SIZE as isize],
        }
    }

    /// Wrap a flat vector as a `rows x cols` array in the given order.
    pub fn with_shape(values: Vec<f64>, rows: usize, cols: usize, order: MemoryOrder) -> Self {
        let item = F64_SIZE as isize;
        let strides = match order {
            MemoryOrder::RowMajor => vec![cols as isize * item, item],
            MemoryOrder::ColumnMajor => vec![item, rows as isize * item],
        };
        Self {
            values,
            shape: vec![rows, cols],
            strides,
        }
    }
}

impl HostArray for OwnedArray {
    fn scalar_type(&self) -> ScalarType {
        ScalarType::F64
    }

    fn item_size(&self) -> usize {
        F64_SIZE
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn strides(&self) -> &[isize] {
        &self.strides
    }

    fn as_f64(&self) -> Option<&[f64]> {
        Some(&self.values)
    }
}

/// Shared read-only block of `f64` values with a declared shape and order.
///
/// Cloning is cheap: clones share the host array. The values are never
/// copied by the resampling pipeline.
#[derive(Clone)]
pub struct Buffer {
    host: Arc<dyn HostArray>,
    rows: usize,
    cols: usize,
    ndim: usize,
    order: MemoryOrder,
}

impl Buffer {
    /// Validate and wrap a host array.
    ///
    /// Fails when the elements are not 8-byte floats, when the array is not
    /// 1-D or 2-D, when it is not contiguous in row-major or column-major
    /// order, or when the backing slice is shorter than the shape implies.
    pub fn new(host: Arc<dyn HostArray>) -> Result<Self, BufferError> {
        let scalar = host.scalar_type();
        let item_size = host.item_size();
        if scalar != ScalarType::F64 || item_size != F64_SIZE {
            return Err(BufferError::WrongElementType {
                found: scalar,
                item_size,
            });
        }

        let shape = host.shape();
        let strides = host.strides();
        let (rows, cols, ndim) = match *shape {
            [rows] => (rows, 1, 1),
            [rows, cols] => (rows, cols, 2),
            _ => return Err(BufferError::UnsupportedDimensions(shape.len())),
        };
        let order = detect_order(shape, strides).ok_or_else(|| BufferError::NotContiguous {
            shape: shape.to_vec(),
            strides: strides.to_vec(),
        })?;

        let expected = rows * cols;
        let actual = host.as_f64().map_or(0, <[f64]>::len);
        if actual != expected {
            return Err(BufferError::LengthMismatch {
                shape: shape.to_vec(),
                expected,
                actual,
            });
        }

        Ok(Self {
            host,
            rows,
            cols,
            ndim,
            order,
        })
    }

    /// Wrap a 1-D vector.
    pub fn from_vec(values: Vec<f64>) -> Self {
        let rows = values.len();
        Self {
            host: Arc::new(OwnedArray::from_vec(values)),
            rows,
            cols: 1,
            ndim: 1,
            order: MemoryOrder::RowMajor,
        }
    }

    /// Wrap a flat vector as a `rows x cols` array in the given order.
    pub fn from_vec_2d(
        values: Vec<f64>,
        rows: usize,
        cols: usize,
        order: MemoryOrder,
    ) -> Result<Self, BufferError> {
        Self::new(Arc::new(OwnedArray::with_shape(values, rows, cols, order)))
    }

    /// The flat element slice.
    pub fn values(&self) -> &[f64] {
        self.host.as_f64().unwrap_or_default()
    }

    /// Length of the leading axis.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Check whether the leading axis is empty.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of columns (1 for a 1-D buffer).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements.
    pub fn flat_len(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of declared dimensions.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Memory order of the elements.
    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    /// First and last values of the first column.
    ///
    /// For sorted x data this is the data range; a buffer without rows or
    /// columns yields [`Range::nan`].
    pub fn x_bounds(&self) -> Range {
        if self.rows == 0 || self.cols == 0 {
            return Range::nan();
        }
        let view = super::ArrayView::new(self);
        Range::new(view.element(0, 0), view.element(self.rows - 1, 0))
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("ndim", &self.ndim)
            .field("order", &self.order)
            .finish()
    }
}

fn detect_order(shape: &[usize], strides: &[isize]) -> Option<MemoryOrder> {
    if shape.len() != strides.len() {
        return None;
    }
    let item = F64_SIZE as isize;
    let fits = |dim: usize, expected: isize| shape[dim] <= 1 || strides[dim] == expected;
    match *shape {
        [_] => fits(0, item).then_some(MemoryOrder::RowMajor),
        [rows, cols] => {
            if fits(1, item) && fits(0, cols as isize * item) {
                Some(MemoryOrder::RowMajor)
            } else if fits(0, item) && fits(1, rows as isize * item) {
                Some(MemoryOrder::ColumnMajor)
            } else {
                None
            }
        }
        _ => None,
    }
}
