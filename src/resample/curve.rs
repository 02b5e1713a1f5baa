use super::line::LineData;
use super::strategy::{ResampleStrategy, StrategyOutput};
use crate::config::ResamplerConfig;
use crate::decimate::copy_curve;
use crate::geom::CurvePoint;
use crate::view::{PlotInfo, Range};

/// Curve points, one vector per y column.
pub type CurveOutput = Vec<Vec<CurvePoint>>;

/// Parametric curves are copied whole, once per data update.
///
/// Range and size changes do not alter a curve, so passes without new data
/// produce nothing.
#[derive(Debug, Default, Clone)]
pub struct CurveStrategy;

impl CurveStrategy {
    /// Create a curve strategy.
    pub fn new() -> Self {
        Self
    }
}

impl ResampleStrategy for CurveStrategy {
    type Data = LineData;
    type Output = CurveOutput;

    fn data_range(data: &LineData) -> Range {
        data.x.x_bounds()
    }

    fn resample(
        &mut self,
        data: &LineData,
        _plot: &PlotInfo,
        new_data: bool,
        _config: &ResamplerConfig,
    ) -> Option<StrategyOutput<CurveOutput>> {
        if !new_data {
            return None;
        }
        let curves = (0..data.y.cols().max(1))
            .map(|column| {
                let mut points = Vec::new();
                copy_curve(&data.x, &data.y, column, &mut points);
                points
            })
            .collect();
        Some(StrategyOutput::lossless(curves))
    }
}
