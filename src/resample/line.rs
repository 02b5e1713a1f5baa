use super::strategy::{ResampleStrategy, StrategyOutput};
use crate::config::ResamplerConfig;
use crate::datasource::{Buffer, XYView};
use crate::decimate::{copy_points, decimate_minmax};
use crate::geom::Point;
use crate::view::{PlotInfo, Range};

/// X samples with one or more y columns.
///
/// Each y column is one line (or one curve component) sharing the x axis.
#[derive(Debug, Clone)]
pub struct LineData {
    /// Sorted x values.
    pub x: Buffer,
    /// Y values, `len(x)` rows by one column per line.
    pub y: Buffer,
}

impl LineData {
    /// Pair x with y.
    pub fn new(x: Buffer, y: Buffer) -> Self {
        Self { x, y }
    }

    /// Window of the data covered by `range`, or all of it when the range
    /// is not finite.
    pub fn window(&self, range: Range) -> XYView<'_> {
        if range.is_finite() {
            XYView::from_x_range(&self.x, &self.y, range.min, range.max)
        } else {
            XYView::full(&self.x, &self.y)
        }
    }
}

/// Decimated points, one vector per y column.
pub type LineOutput = Vec<Vec<Point>>;

/// Min/max envelope per line, sized to the plot width.
///
/// Windows that fit in `width * line_oversampling` points are copied
/// verbatim, as are windows on a logarithmic x axis where equal-width
/// buckets would not map to equal pixel widths.
#[derive(Debug, Default, Clone)]
pub struct LineStrategy;

impl LineStrategy {
    /// Create a line strategy.
    pub fn new() -> Self {
        Self
    }
}

impl ResampleStrategy for LineStrategy {
    type Data = LineData;
    type Output = LineOutput;

    fn data_range(data: &LineData) -> Range {
        data.x.x_bounds()
    }

    fn resample(
        &mut self,
        data: &LineData,
        plot: &PlotInfo,
        _new_data: bool,
        config: &ResamplerConfig,
    ) -> Option<StrategyOutput<LineOutput>> {
        let view = data.window(plot.range);
        let bucket_count = config.line_bucket_count(plot.size.width);
        let mut lossless = true;
        let lines = (0..view.columns())
            .map(|column| {
                let mut points = Vec::new();
                if plot.x_scale.is_log() {
                    copy_points(&view, column, &mut points);
                } else {
                    let kind = decimate_minmax(&view, column, bucket_count, &mut points);
                    lossless &= kind.is_lossless();
                }
                points
            })
            .collect();
        tracing::trace!(rows = view.len(), bucket_count, lossless, "line pass");
        Some(StrategyOutput { value: lines, lossless })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisScale;
    use crate::datasource::MemoryOrder;
    use crate::view::PlotSize;

    fn plot(range: Range, width: u32) -> PlotInfo {
        PlotInfo {
            range,
            size: PlotSize::new(width, 100),
            ..PlotInfo::default()
        }
    }

    fn ramp(len: usize) -> LineData {
        let x: Vec<f64> = (0..len).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| (v * 0.1).sin()).collect();
        LineData::new(Buffer::from_vec(x), Buffer::from_vec(y))
    }

    #[test]
    fn output_is_bounded_by_plot_width() {
        let data = ramp(100_000);
        let config = ResamplerConfig::default();
        let out = LineStrategy::new()
            .resample(&data, &plot(Range::nan(), 200), true, &config)
            .expect("output");
        assert!(!out.lossless);
        assert_eq!(out.value.len(), 1);
        assert!(out.value[0].len() <= 800);
    }

    #[test]
    fn narrow_windows_are_lossless() {
        let data = ramp(100_000);
        let config = ResamplerConfig::default();
        let out = LineStrategy::new()
            .resample(&data, &plot(Range::new(10.0, 20.0), 200), false, &config)
            .expect("output");
        assert!(out.lossless);
        assert_eq!(out.value[0].len(), 9);
        assert_eq!(out.value[0][0].x, 11.0);
    }

    #[test]
    fn undecimatable_windows_are_not_lossless() {
        let mut x: Vec<f64> = (0..2_000).map(f64::from).collect();
        x.push(f64::NAN);
        let y = vec![0.5; x.len()];
        let data = LineData::new(Buffer::from_vec(x), Buffer::from_vec(y));
        let out = LineStrategy::new()
            .resample(&data, &plot(Range::nan(), 10), true, &ResamplerConfig::default())
            .expect("output");
        assert!(out.value[0].is_empty());
        assert!(!out.lossless);
    }

    #[test]
    fn log_x_axis_copies_points() {
        let data = ramp(10_000);
        let config = ResamplerConfig::default();
        let mut info = plot(Range::nan(), 10);
        info.x_scale = AxisScale::Log10;
        let out = LineStrategy::new()
            .resample(&data, &info, true, &config)
            .expect("output");
        assert!(out.lossless);
        assert_eq!(out.value[0].len(), 10_000);
    }

    #[test]
    fn each_y_column_is_a_line() {
        let x = Buffer::from_vec((0..3).map(f64::from).collect());
        let y = Buffer::from_vec_2d(
            vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0],
            3,
            2,
            MemoryOrder::ColumnMajor,
        )
        .expect("valid y");
        let data = LineData::new(x, y);
        let out = LineStrategy::new()
            .resample(&data, &plot(Range::nan(), 100), true, &ResamplerConfig::default())
            .expect("output");
        assert_eq!(out.value.len(), 2);
        assert_eq!(
            out.value[1],
            vec![
                Point::new(0.0, 10.0),
                Point::new(1.0, 11.0),
                Point::new(2.0, 12.0)
            ]
        );
    }

    #[test]
    fn empty_data_yields_empty_lines() {
        let data = LineData::new(Buffer::from_vec(Vec::new()), Buffer::from_vec(Vec::new()));
        let out = LineStrategy::new()
            .resample(&data, &plot(Range::new(0.0, 1.0), 100), true, &ResamplerConfig::default())
            .expect("output");
        assert_eq!(out.value, vec![Vec::<Point>::new()]);
        assert!(LineStrategy::data_range(&data).min.is_nan());
    }
}
