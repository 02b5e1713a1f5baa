//! Background resampling with latest-wins coalescing.
//!
//! A [`Resampler`] owns one worker thread. Producers call
//! [`Resampler::set_data`] and [`Resampler::resample`] from any thread; each
//! call only merges into a single pending slot. The worker drains that slot,
//! swaps the request into its current state, runs the strategy without
//! holding any lock and sends the result through a [`Delivery`] channel to
//! be installed on the UI thread.

mod colormap;
mod curve;
mod line;
mod strategy;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use colormap::{ColorMapData, ColorMapStrategy};
pub use curve::{CurveOutput, CurveStrategy};
pub use line::{LineData, LineOutput, LineStrategy};
pub use strategy::{ResampleStrategy, StrategyOutput};

use crate::axis::AxisScale;
use crate::config::ResamplerConfig;
use crate::error::ResampleError;
use crate::view::{PlotInfo, PlotSize, Range};
use crate::worker::{Coalesce, LatestSlot, Worker, lock};

/// Resampler producing min/max envelopes for line plots.
pub type LineResampler = Resampler<LineStrategy>;
/// Resampler copying parametric curves on each data update.
pub type CurveResampler = Resampler<CurveStrategy>;
/// Resampler regridding colormaps.
pub type ColorMapResampler = Resampler<ColorMapStrategy>;

/// Pending changes, merged latest-wins until the worker drains them.
#[derive(Debug)]
struct ResampleRequest<D> {
    data: Option<(D, u64)>,
    range: Option<Range>,
    size: Option<PlotSize>,
    x_scale: Option<AxisScale>,
    y_scale: Option<AxisScale>,
}

impl<D> Default for ResampleRequest<D> {
    fn default() -> Self {
        Self {
            data: None,
            range: None,
            size: None,
            x_scale: None,
            y_scale: None,
        }
    }
}

impl<D> Coalesce for ResampleRequest<D> {
    fn merge(&mut self, newer: Self) {
        if newer.data.is_some() {
            self.data = newer.data;
        }
        self.range = newer.range.or(self.range);
        self.size = newer.size.or(self.size);
        self.x_scale = newer.x_scale.or(self.x_scale);
        self.y_scale = newer.y_scale.or(self.y_scale);
    }
}

/// State the worker resamples from.
#[derive(Debug)]
struct Current<D> {
    data: Option<D>,
    generation: u64,
    plot: PlotInfo,
}

/// Producer-side bookkeeping, updated synchronously by `set_data`.
#[derive(Debug)]
struct Submitted {
    generation: u64,
    data_range: Range,
}

#[derive(Debug)]
struct Shared<D> {
    current: Mutex<Current<D>>,
    submitted: Mutex<Submitted>,
    passes: AtomicU64,
}

/// One resampling result.
#[derive(Debug, Clone, PartialEq)]
pub struct Resampled<O> {
    /// Plot-ready output.
    pub output: O,
    /// X range the output was computed for. This is the requested visible
    /// range, or the data range before any range was requested.
    pub range: Range,
    /// Plot size at the time of the pass.
    pub size: PlotSize,
    /// Generation of the data the output was computed from.
    pub generation: u64,
    /// Sequence number of the pass, starting at 1.
    pub pass: u64,
    /// Whether the output holds every sample of its window.
    pub lossless: bool,
}

/// Receiving end of a resampler's output channel.
///
/// Intermediate results may be skipped by draining with
/// [`Delivery::try_latest`]; only the newest one matters for display.
#[derive(Debug)]
pub struct Delivery<O> {
    receiver: Receiver<Resampled<O>>,
}

impl<O> Delivery<O> {
    #[cfg(test)]
    pub(crate) fn channel() -> (Sender<Resampled<O>>, Self) {
        let (sender, receiver) = mpsc::channel();
        (sender, Self { receiver })
    }

    /// Drain every available result and return the newest one.
    pub fn try_latest(&self) -> Option<Resampled<O>> {
        self.receiver.try_iter().last()
    }

    /// Wait up to `timeout` for the next result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Resampled<O>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(resampled) => Some(resampled),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Producer/consumer resampler generic over its [`ResampleStrategy`].
///
/// Dropping the resampler stops and joins its worker before the buffers it
/// holds are released.
pub struct Resampler<S: ResampleStrategy> {
    worker: Worker<ResampleRequest<S::Data>>,
    shared: Arc<Shared<S::Data>>,
}

impl<S: ResampleStrategy> Resampler<S> {
    /// Start a resampler and return it with the receiving end of its output.
    pub fn new(
        strategy: S,
        config: ResamplerConfig,
    ) -> Result<(Self, Delivery<S::Output>), ResampleError> {
        let slot = Arc::new(LatestSlot::new());
        let shared = Arc::new(Shared {
            current: Mutex::new(Current {
                data: None,
                generation: 0,
                plot: PlotInfo::default(),
            }),
            submitted: Mutex::new(Submitted {
                generation: 0,
                data_range: Range::nan(),
            }),
            passes: AtomicU64::new(0),
        });
        let (sender, receiver) = mpsc::channel();

        let name = config.thread_name.clone();
        let worker = Worker::spawn(&name, Arc::clone(&slot), {
            let shared = Arc::clone(&shared);
            move || {
                let mut strategy = strategy;
                while let Some(request) = slot.take() {
                    run_pass(&shared, &mut strategy, request, &config, &sender);
                }
            }
        })?;

        Ok((Self { worker, shared }, Delivery { receiver }))
    }

    /// Replace the data set.
    ///
    /// The buffers are shared, never copied. Returns the new data
    /// generation.
    pub fn set_data(&self, data: S::Data) -> u64 {
        // Submitting under the lock keeps generations and slot order in step
        // across producer threads.
        let mut submitted = lock(&self.shared.submitted);
        submitted.generation += 1;
        submitted.data_range = S::data_range(&data);
        let generation = submitted.generation;
        self.submit(ResampleRequest {
            data: Some((data, generation)),
            ..ResampleRequest::default()
        });
        generation
    }

    /// Request output for a new visible x range.
    pub fn resample(&self, range: Range) {
        self.submit(ResampleRequest {
            range: Some(range),
            ..ResampleRequest::default()
        });
    }

    /// Update the plot size in pixels.
    pub fn set_plot_size(&self, size: PlotSize) {
        self.submit(ResampleRequest {
            size: Some(size),
            ..ResampleRequest::default()
        });
    }

    /// Update the x axis scale.
    pub fn set_x_scale(&self, scale: AxisScale) {
        self.submit(ResampleRequest {
            x_scale: Some(scale),
            ..ResampleRequest::default()
        });
    }

    /// Update the y axis scale.
    pub fn set_y_scale(&self, scale: AxisScale) {
        self.submit(ResampleRequest {
            y_scale: Some(scale),
            ..ResampleRequest::default()
        });
    }

    /// Data used by the most recent pass.
    pub fn data(&self) -> Option<S::Data> {
        lock(&self.shared.current).data.clone()
    }

    /// Plot state used by the most recent pass.
    pub fn plot_info(&self) -> PlotInfo {
        lock(&self.shared.current).plot
    }

    /// X range of the most recently submitted data, NaN before any data.
    pub fn x_range(&self) -> Range {
        lock(&self.shared.submitted).data_range
    }

    /// Generation of the most recently submitted data.
    pub fn generation(&self) -> u64 {
        lock(&self.shared.submitted).generation
    }

    /// Number of passes that ran the strategy.
    pub fn passes(&self) -> u64 {
        self.shared.passes.load(Ordering::Acquire)
    }

    fn submit(&self, request: ResampleRequest<S::Data>) {
        if self.worker.submit(request) {
            tracing::trace!("resample scheduled");
        } else {
            tracing::trace!("resample request coalesced");
        }
    }
}

impl<S: ResampleStrategy> std::fmt::Debug for Resampler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resampler")
            .field("generation", &self.generation())
            .field("passes", &self.passes())
            .finish_non_exhaustive()
    }
}

/// Drain one request: install it, run the strategy, deliver the result.
fn run_pass<S: ResampleStrategy>(
    shared: &Shared<S::Data>,
    strategy: &mut S,
    request: ResampleRequest<S::Data>,
    config: &ResamplerConfig,
    sender: &Sender<Resampled<S::Output>>,
) {
    let new_data = request.data.is_some();
    let (data, plot, generation) = {
        let mut current = lock(&shared.current);
        if let Some((data, generation)) = request.data {
            current.data = Some(data);
            current.generation = generation;
        }
        if let Some(range) = request.range {
            current.plot.range = range;
        }
        if let Some(size) = request.size {
            current.plot.size = size;
        }
        if let Some(scale) = request.x_scale {
            current.plot.x_scale = scale;
        }
        if let Some(scale) = request.y_scale {
            current.plot.y_scale = scale;
        }
        let Some(data) = current.data.clone() else {
            tracing::trace!("no data to resample yet");
            return;
        };
        (data, current.plot, current.generation)
    };

    let pass = shared.passes.fetch_add(1, Ordering::AcqRel) + 1;
    let span = tracing::debug_span!("resample_pass", pass, generation, new_data);
    let _enter = span.enter();

    let range = if plot.range.is_finite() {
        plot.range
    } else {
        S::data_range(&data)
    };
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        strategy.resample(&data, &plot, new_data, config)
    }));
    let output = match result {
        Ok(Some(output)) => output,
        Ok(None) => {
            tracing::trace!("strategy produced no output");
            return;
        }
        Err(_) => {
            tracing::error!("resampling strategy panicked, frame skipped");
            return;
        }
    };

    let resampled = Resampled {
        output: output.value,
        range,
        size: plot.size,
        generation,
        pass,
        lossless: output.lossless,
    };
    if sender.send(resampled).is_err() {
        tracing::debug!("delivery dropped, discarding output");
    }
}
