//! Min/max envelope decimation for line plots.

use crate::datasource::XYView;
use crate::geom::Point;

/// What a decimation call did to its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decimation {
    /// Nothing to draw: empty window or missing column.
    Empty,
    /// The window has samples but could not be bucketed: no bucket budget,
    /// or x bounds that are not finite and ascending.
    Degenerate,
    /// Every sample was copied verbatim.
    Passthrough,
    /// Samples were reduced to a min/max envelope.
    Envelope,
}

impl Decimation {
    /// Whether the output holds every input sample.
    pub fn is_lossless(self) -> bool {
        matches!(self, Self::Empty | Self::Passthrough)
    }
}

/// Min/max accumulator for a single bucket.
///
/// Starts as NaN so that a bucket without samples renders as a gap.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    min: f64,
    max: f64,
}

impl Bucket {
    fn empty() -> Self {
        Self {
            min: f64::NAN,
            max: f64::NAN,
        }
    }

    #[inline]
    fn push(&mut self, value: f64) {
        // f64::min/max return the other operand when one side is NaN.
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn emit(&self, start: f64, width: f64, out: &mut Vec<Point>) {
        out.push(Point::new(start, self.min));
        out.push(Point::new(start + width / 2.0, self.max));
    }
}

/// Copy every `(x, y[column])` sample of the window into `out`.
pub fn copy_points(view: &XYView<'_>, column: usize, out: &mut Vec<Point>) {
    out.clear();
    if column >= view.columns() {
        return;
    }
    out.reserve(view.len());
    out.extend((0..view.len()).map(|i| Point::new(view.x(i), view.y(i, column))));
}

/// Decimate one y column of a window into at most `bucket_count` points.
///
/// Windows of `bucket_count` samples or fewer are copied verbatim. Larger
/// windows are split into `bucket_count / 2` equal-width x buckets scanned
/// in a single pass; each bucket emits its minimum at the bucket start and
/// its maximum half a bucket later, so keys never decrease. Buckets without
/// samples emit NaN values.
pub fn decimate_minmax(
    view: &XYView<'_>,
    column: usize,
    bucket_count: usize,
    out: &mut Vec<Point>,
) -> Decimation {
    out.clear();
    let len = view.len();
    if len == 0 || column >= view.columns() {
        return Decimation::Empty;
    }
    if len <= bucket_count {
        copy_points(view, column, out);
        return Decimation::Passthrough;
    }

    let buckets = bucket_count / 2;
    if buckets == 0 {
        return Decimation::Degenerate;
    }
    let first = view.x(0);
    let last = view.x(len - 1);
    if !first.is_finite() || !last.is_finite() || last < first {
        tracing::debug!(first, last, "skipping decimation of degenerate x range");
        return Decimation::Degenerate;
    }

    let width = (last - first) / buckets as f64;
    if width == 0.0 {
        let mut bucket = Bucket::empty();
        for i in 0..len {
            bucket.push(view.y(i, column));
        }
        bucket.emit(first, width, out);
        return Decimation::Envelope;
    }

    out.reserve(buckets * 2);
    let mut index = 0;
    for b in 0..buckets {
        let start = first + width * b as f64;
        let end = if b + 1 == buckets {
            f64::INFINITY
        } else {
            first + width * (b + 1) as f64
        };
        let mut bucket = Bucket::empty();
        while index < len {
            if view.x(index) >= end {
                break;
            }
            bucket.push(view.y(index, column));
            index += 1;
        }
        bucket.emit(start, width, out);
    }
    Decimation::Envelope
}
