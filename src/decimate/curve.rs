//! Parametric curve copy.

use crate::datasource::{Buffer, XYView};
use crate::geom::CurvePoint;

/// Copy one y column of a curve into `out`, keyed by sample index.
///
/// Curves may fold back on themselves in x, so neither x windowing nor
/// bucketing applies: every sample is kept, in sample order.
pub fn copy_curve(x: &Buffer, y: &Buffer, column: usize, out: &mut Vec<CurvePoint>) {
    out.clear();
    let view = XYView::full(x, y);
    if column >= view.columns() {
        return;
    }
    out.reserve(view.len());
    out.extend(
        (0..view.len()).map(|i| CurvePoint::new(i as f64, view.x(i), view.y(i, column))),
    );
}
