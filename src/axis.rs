//! Axis scales and axis-grid generation.

use crate::view::Range;

/// Axis scale type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisScale {
    /// Linear scaling.
    #[default]
    Linear,
    /// Base-10 logarithmic scaling.
    Log10,
}

impl AxisScale {
    /// Check whether the scale is logarithmic.
    pub fn is_log(self) -> bool {
        matches!(self, Self::Log10)
    }

    /// Map a data value into axis space, `None` when the scale cannot
    /// represent it.
    pub fn to_axis(self, value: f64) -> Option<f64> {
        match self {
            _ if !value.is_finite() => None,
            Self::Log10 if value <= 0.0 => None,
            Self::Log10 => Some(value.log10()),
            Self::Linear => Some(value),
        }
    }

    /// Map an axis-space value back to data space.
    pub fn to_data(self, value: f64) -> Option<f64> {
        value.is_finite().then(|| match self {
            Self::Log10 => 10_f64.powf(value),
            Self::Linear => value,
        })
    }

    /// Check whether both ends of `range` map into axis space.
    pub fn accepts(self, range: Range) -> bool {
        self.to_axis(range.min).is_some() && self.to_axis(range.max).is_some()
    }

    /// Generate `count` grid edges starting at `range.min`.
    ///
    /// Linear grids step by `span / count`, so the last edge stays below
    /// `range.max`. Log grids are geometric and end exactly on `range.max`.
    /// Returns `None` when the range is not usable with this scale.
    pub fn grid(self, range: Range, count: usize) -> Option<Vec<f64>> {
        if count == 0 || !self.accepts(range) {
            return None;
        }
        match self {
            Self::Linear => {
                let step = range.span() / count as f64;
                Some((0..count).map(|i| range.min + step * i as f64).collect())
            }
            Self::Log10 => {
                let start = self.to_axis(range.min)?;
                let end = self.to_axis(range.max)?;
                let step = if count > 1 {
                    (end - start) / (count - 1) as f64
                } else {
                    0.0
                };
                (0..count)
                    .map(|i| self.to_data(start + step * i as f64))
                    .collect()
            }
        }
    }
}
