//! Visible ranges and plot geometry handed to the resampler.

use crate::axis::AxisScale;

/// Numeric range with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Range {
    /// Create a new range, swapping bounds if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// A range with both bounds set to NaN.
    ///
    /// Used as the x-range of an empty or all-NaN data set.
    pub const fn nan() -> Self {
        Self {
            min: f64::NAN,
            max: f64::NAN,
        }
    }

    /// Span of the range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Check whether both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Check whether `other` lies entirely inside this range.
    pub fn contains_range(&self, other: Range) -> bool {
        self.is_finite() && other.is_finite() && other.min >= self.min && other.max <= self.max
    }

    /// Grow the range to cover `value`. Non-finite values are ignored.
    pub fn expand_to_include(&mut self, value: f64) {
        if value.is_finite() {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
    }
}

/// Plot size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlotSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PlotSize {
    /// Create a plot size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Everything the resampler needs to know about the plot it feeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotInfo {
    /// Visible X range.
    pub range: Range,
    /// Plot area size.
    pub size: PlotSize,
    /// Scale of the key axis.
    pub x_scale: AxisScale,
    /// Scale of the value axis.
    pub y_scale: AxisScale,
}

impl Default for PlotInfo {
    fn default() -> Self {
        Self {
            range: Range::nan(),
            size: PlotSize::default(),
            x_scale: AxisScale::Linear,
            y_scale: AxisScale::Linear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_new_swaps_bounds() {
        let range = Range::new(3.0, 1.0);
        assert_eq!(range.min, 1.0);
        assert_eq!(range.max, 3.0);
    }

    #[test]
    fn contains_range_rejects_nan() {
        let outer = Range::new(0.0, 10.0);
        assert!(outer.contains_range(Range::new(2.0, 5.0)));
        assert!(!outer.contains_range(Range::new(-1.0, 5.0)));
        assert!(!outer.contains_range(Range::nan()));
        assert!(!Range::nan().contains_range(Range::new(2.0, 5.0)));
    }
}
