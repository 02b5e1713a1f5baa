//! Error types.

use crate::datasource::ScalarType;

/// Errors raised when wrapping a host array into a [`Buffer`](crate::Buffer).
///
/// A mismatch here is a programming error on the producer side: memory is
/// never reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The host array does not hold 8-byte floats.
    #[error("expected f64 elements, found {found:?} ({item_size} bytes)")]
    WrongElementType {
        /// Declared scalar type.
        found: ScalarType,
        /// Declared item size in bytes.
        item_size: usize,
    },
    /// Only 1-D and 2-D arrays are supported.
    #[error("unsupported number of dimensions: {0}")]
    UnsupportedDimensions(usize),
    /// The strides describe neither a row-major nor a column-major layout.
    #[error("array is not contiguous (shape {shape:?}, strides {strides:?})")]
    NotContiguous {
        /// Declared shape.
        shape: Vec<usize>,
        /// Declared strides in bytes.
        strides: Vec<isize>,
    },
    /// The backing slice does not match the declared shape.
    #[error("shape {shape:?} needs {expected} values, buffer holds {actual}")]
    LengthMismatch {
        /// Declared shape.
        shape: Vec<usize>,
        /// Element count implied by the shape.
        expected: usize,
        /// Element count actually available.
        actual: usize,
    },
}

/// Errors raised when starting a background worker.
#[derive(Debug, thiserror::Error)]
pub enum ResampleError {
    /// The worker thread could not be spawned.
    #[error("failed to spawn worker thread `{name}`")]
    Spawn {
        /// Thread name.
        name: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors reported by a data provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider returned a number of buffers that maps to no data shape.
    #[error("data provider returned {0} buffers, expected 2 or 3")]
    InvalidBufferCount(usize),
    /// A buffer returned by the provider was rejected.
    #[error(transparent)]
    Buffer(#[from] BufferError),
    /// The provider returned data of the wrong kind for its consumer.
    #[error("{found} data cannot feed a {expected} plot")]
    WrongShape {
        /// Kind of data the consumer accepts.
        expected: &'static str,
        /// Kind of data the provider returned.
        found: &'static str,
    },
    /// The provider itself failed.
    #[error("data provider failed: {0}")]
    Failed(String),
}
