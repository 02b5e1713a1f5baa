//! Plot-ready point types produced by the decimation engines.
//!
//! All coordinates are in data space. Screen mapping belongs to the render
//! target.

/// A `(key, value)` pair ready to be installed into a line primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Key (X) value in data coordinates.
    pub x: f64,
    /// Value (Y) in data coordinates.
    pub y: f64,
}

impl Point {
    /// Create a new data point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check whether either coordinate is NaN (an empty bucket marker).
    pub fn is_gap(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

/// A point of a parametric curve.
///
/// Curves are drawn in sample order rather than key order, so each point
/// carries its sample index as the curve parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Curve parameter (sample index).
    pub t: f64,
    /// Key (X) value in data coordinates.
    pub key: f64,
    /// Value (Y) in data coordinates.
    pub value: f64,
}

impl CurvePoint {
    /// Create a new curve point.
    pub fn new(t: f64, key: f64, value: f64) -> Self {
        Self { t, key, value }
    }
}
