use super::strategy::{ResampleStrategy, StrategyOutput};
use crate::config::ResamplerConfig;
use crate::datasource::{Buffer, XYZView};
use crate::decimate::{ColorMapGrid, DecimationScratch, regrid_with};
use crate::view::{PlotInfo, Range};

/// Colormap samples: x, a y axis (shared or per row) and z values.
#[derive(Debug, Clone)]
pub struct ColorMapData {
    /// Sorted x values.
    pub x: Buffer,
    /// Either a 1-D y axis shared by every row or a 2-D y per row.
    pub y: Buffer,
    /// Z values, `len(x)` rows by one column per y channel.
    pub z: Buffer,
}

impl ColorMapData {
    /// Bundle x, y and z.
    pub fn new(x: Buffer, y: Buffer, z: Buffer) -> Self {
        Self { x, y, z }
    }

    /// Window of the data covered by `range`, or all of it when the range
    /// is not finite.
    pub fn window(&self, range: Range) -> XYZView<'_> {
        if range.is_finite() {
            XYZView::from_x_range(&self.x, &self.y, &self.z, range.min, range.max)
        } else {
            XYZView::full(&self.x, &self.y, &self.z)
        }
    }
}

/// Regrids colormap windows onto a lattice of at most one cell per pixel.
///
/// Windows with no drawable area, too few samples or no usable axes produce
/// an empty grid so that stale cells are never left on screen.
#[derive(Debug, Default, Clone)]
pub struct ColorMapStrategy {
    scratch: DecimationScratch,
}

impl ColorMapStrategy {
    /// Create a colormap strategy.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResampleStrategy for ColorMapStrategy {
    type Data = ColorMapData;
    type Output = ColorMapGrid;

    fn data_range(data: &ColorMapData) -> Range {
        data.x.x_bounds()
    }

    fn resample(
        &mut self,
        data: &ColorMapData,
        plot: &PlotInfo,
        _new_data: bool,
        config: &ResamplerConfig,
    ) -> Option<StrategyOutput<ColorMapGrid>> {
        let view = data.window(plot.range);
        let max_columns = config.colormap_max_columns.min(plot.size.width as usize);
        let max_rows = config.colormap_max_rows.min(plot.size.height as usize);
        if max_columns == 0 || max_rows == 0 {
            tracing::trace!(
                width = plot.size.width,
                height = plot.size.height,
                "no drawable area, clearing colormap"
            );
            return Some(StrategyOutput::reduced(ColorMapGrid::empty()));
        }
        if view.len() <= config.colormap_min_points {
            tracing::debug!(
                rows = view.len(),
                min = config.colormap_min_points,
                "not enough samples to regrid, clearing colormap"
            );
            return Some(StrategyOutput::reduced(ColorMapGrid::empty()));
        }
        let Some(grid) = regrid_with(&view, max_columns, max_rows, plot.y_scale, &mut self.scratch)
        else {
            return Some(StrategyOutput::reduced(ColorMapGrid::empty()));
        };
        let lossless = grid.columns() == view.len() && grid.rows() == view.channels();
        Some(StrategyOutput {
            value: grid,
            lossless,
        })
    }
}
