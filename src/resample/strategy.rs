use crate::config::ResamplerConfig;
use crate::view::{PlotInfo, Range};

/// What a [`Resampler`](super::Resampler) does with its data on each pass.
///
/// A strategy is moved onto the worker thread and only ever called from
/// there, so it may keep mutable scratch state between passes.
pub trait ResampleStrategy: Send + 'static {
    /// Data handed in by the producer.
    type Data: Clone + Send + 'static;
    /// Plot-ready output delivered to the render target.
    type Output: Send + 'static;

    /// X extent of `data`, NaN when empty.
    fn data_range(data: &Self::Data) -> Range;

    /// Produce output for `data` as seen through `plot`.
    ///
    /// `plot.range` is NaN until a visible range has been requested;
    /// strategies then cover the whole data set. `new_data` is set when the
    /// pass installed fresh data. Returning `None` leaves the render target
    /// untouched.
    fn resample(
        &mut self,
        data: &Self::Data,
        plot: &PlotInfo,
        new_data: bool,
        config: &ResamplerConfig,
    ) -> Option<StrategyOutput<Self::Output>>;
}

/// Output of one strategy call.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutput<O> {
    /// The plot-ready value.
    pub value: O,
    /// Whether `value` holds every input sample of the window.
    pub lossless: bool,
}

impl<O> StrategyOutput<O> {
    /// Output that kept every sample.
    pub fn lossless(value: O) -> Self {
        Self {
            value,
            lossless: true,
        }
    }

    /// Output that reduced the window.
    pub fn reduced(value: O) -> Self {
        Self {
            value,
            lossless: false,
        }
    }
}
