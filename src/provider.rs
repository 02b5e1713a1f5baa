//! Rate-limited, coalesced data-provider calls.
//!
//! A [`ProviderPipeline`] runs a [`DataProvider`] on its own thread. Range
//! and data requests merge latest-wins like resample requests, calls never
//! overlap and consecutive calls start at least
//! [`ProviderConfig::min_interval`] apart. Results go to a sink, typically
//! one built by [`connect`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use crate::config::ProviderConfig;
use crate::datasource::Buffer;
use crate::error::{ProviderError, ResampleError};
use crate::resample::{ColorMapData, LineData, ResampleStrategy, Resampler};
use crate::view::Range;
use crate::worker::{Coalesce, LatestSlot, Worker};

/// Arguments of one provider call.
#[derive(Debug, Clone)]
pub enum ProviderRequest {
    /// Produce data for an x range.
    Range(Range),
    /// Transform `(x, y[, z])` buffers.
    Data(Vec<Buffer>),
}

impl Coalesce for ProviderRequest {
    fn merge(&mut self, newer: Self) {
        *self = newer;
    }
}

/// A source of plot data invoked from a background thread.
pub trait DataProvider: Send + 'static {
    /// Serve one request, returning `(x, y)` or `(x, y, z)` buffers.
    ///
    /// An empty result means there is nothing new to show.
    fn fetch(&mut self, request: ProviderRequest) -> Result<Vec<Buffer>, ProviderError>;
}

impl<F> DataProvider for F
where
    F: FnMut(ProviderRequest) -> Result<Vec<Buffer>, ProviderError> + Send + 'static,
{
    fn fetch(&mut self, request: ProviderRequest) -> Result<Vec<Buffer>, ProviderError> {
        self(request)
    }
}

/// Buffers returned by a provider, sorted by shape.
#[derive(Debug, Clone)]
pub enum ProviderOutput {
    /// Line data.
    Xy {
        /// X values.
        x: Buffer,
        /// Y values.
        y: Buffer,
    },
    /// Colormap data.
    Xyz {
        /// X values.
        x: Buffer,
        /// Y axis.
        y: Buffer,
        /// Z values.
        z: Buffer,
    },
}

impl ProviderOutput {
    /// Sort a provider result by buffer count.
    ///
    /// Two buffers are line data, three are colormap data and none means
    /// nothing to update; any other count is an error.
    pub fn from_buffers(buffers: Vec<Buffer>) -> Result<Option<Self>, ProviderError> {
        match buffers.as_slice() {
            [] => Ok(None),
            [x, y] => Ok(Some(Self::Xy {
                x: x.clone(),
                y: y.clone(),
            })),
            [x, y, z] => Ok(Some(Self::Xyz {
                x: x.clone(),
                y: y.clone(),
                z: z.clone(),
            })),
            other => Err(ProviderError::InvalidBufferCount(other.len())),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Xy { .. } => "2-D",
            Self::Xyz { .. } => "3-D",
        }
    }
}

impl TryFrom<ProviderOutput> for LineData {
    type Error = ProviderError;

    fn try_from(output: ProviderOutput) -> Result<Self, Self::Error> {
        match output {
            ProviderOutput::Xy { x, y } => Ok(Self::new(x, y)),
            other => Err(ProviderError::WrongShape {
                expected: "2-D",
                found: other.kind(),
            }),
        }
    }
}

impl TryFrom<ProviderOutput> for ColorMapData {
    type Error = ProviderError;

    fn try_from(output: ProviderOutput) -> Result<Self, Self::Error> {
        match output {
            ProviderOutput::Xyz { x, y, z } => Ok(Self::new(x, y, z)),
            other => Err(ProviderError::WrongShape {
                expected: "3-D",
                found: other.kind(),
            }),
        }
    }
}

/// Build a sink that feeds provider output into `resampler`.
///
/// The sink holds a weak reference: once the resampler is dropped, output is
/// discarded.
pub fn connect<S>(resampler: &Arc<Resampler<S>>) -> impl FnMut(ProviderOutput) + Send + 'static
where
    S: ResampleStrategy,
    S::Data: TryFrom<ProviderOutput, Error = ProviderError>,
{
    let resampler: Weak<Resampler<S>> = Arc::downgrade(resampler);
    move |output| {
        let Some(resampler) = resampler.upgrade() else {
            tracing::debug!("resampler gone, dropping provider output");
            return;
        };
        match <S::Data as TryFrom<ProviderOutput>>::try_from(output) {
            Ok(data) => {
                resampler.set_data(data);
            }
            Err(err) => tracing::warn!(error = %err, "discarding provider output"),
        }
    }
}

/// Background pipeline serializing calls to a [`DataProvider`].
#[derive(Debug)]
pub struct ProviderPipeline {
    worker: Worker<ProviderRequest>,
    calls: Arc<AtomicU64>,
}

impl ProviderPipeline {
    /// Start the pipeline; every successful result is passed to `sink`.
    pub fn spawn<P, F>(provider: P, config: ProviderConfig, sink: F) -> Result<Self, ResampleError>
    where
        P: DataProvider,
        F: FnMut(ProviderOutput) + Send + 'static,
    {
        let slot = Arc::new(LatestSlot::new());
        let calls = Arc::new(AtomicU64::new(0));
        let name = config.thread_name.clone();
        let worker = Worker::spawn(&name, Arc::clone(&slot), {
            let calls = Arc::clone(&calls);
            move || run(&slot, provider, &config, sink, &calls)
        })?;
        Ok(Self { worker, calls })
    }

    /// Request data for a new x range.
    pub fn set_range(&self, range: Range) {
        self.worker.submit(ProviderRequest::Range(range));
    }

    /// Request a transform of new buffers.
    pub fn set_data(&self, buffers: Vec<Buffer>) {
        self.worker.submit(ProviderRequest::Data(buffers));
    }

    /// Number of provider calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Acquire)
    }
}

fn run<P, F>(
    slot: &LatestSlot<ProviderRequest>,
    mut provider: P,
    config: &ProviderConfig,
    mut sink: F,
    calls: &AtomicU64,
) where
    P: DataProvider,
    F: FnMut(ProviderOutput),
{
    let mut last_call: Option<Instant> = None;
    let mut last_range: Option<Range> = None;
    while let Some(mut request) = slot.take() {
        if let Some(wait) = last_call.and_then(|at| config.min_interval.checked_sub(at.elapsed())) {
            if !slot.pause(wait) {
                break;
            }
            if let Some(newer) = slot.try_take() {
                request.merge(newer);
            }
        }
        if let ProviderRequest::Range(range) = &request {
            if last_range == Some(*range) {
                tracing::trace!(min = range.min, max = range.max, "range unchanged, skipping call");
                continue;
            }
            last_range = Some(*range);
        }

        last_call = Some(Instant::now());
        let call = calls.fetch_add(1, Ordering::AcqRel) + 1;
        let span = tracing::debug_span!("provider_call", call);
        let _enter = span.enter();

        let result = panic::catch_unwind(AssertUnwindSafe(|| provider.fetch(request)));
        let buffers = match result {
            Ok(Ok(buffers)) => buffers,
            Ok(Err(err)) => {
                tracing::error!(error = %err, "data provider call failed");
                continue;
            }
            Err(_) => {
                tracing::error!("data provider panicked");
                continue;
            }
        };
        match ProviderOutput::from_buffers(buffers) {
            Ok(Some(output)) => sink(output),
            Ok(None) => tracing::debug!("data provider returned no buffers"),
            Err(err) => tracing::error!(error = %err, "unusable data provider result"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn ramp(len: usize) -> Buffer {
        Buffer::from_vec((0..len).map(|i| i as f64).collect())
    }

    #[test]
    fn buffer_count_selects_output_shape() {
        assert!(matches!(ProviderOutput::from_buffers(Vec::new()), Ok(None)));
        assert!(matches!(
            ProviderOutput::from_buffers(vec![ramp(3), ramp(3)]),
            Ok(Some(ProviderOutput::Xy { .. }))
        ));
        assert!(matches!(
            ProviderOutput::from_buffers(vec![ramp(3), ramp(2), ramp(6)]),
            Ok(Some(ProviderOutput::Xyz { .. }))
        ));
        assert!(matches!(
            ProviderOutput::from_buffers(vec![ramp(3)]),
            Err(ProviderError::InvalidBufferCount(1))
        ));
        assert!(matches!(
            ProviderOutput::from_buffers(vec![ramp(1); 4]),
            Err(ProviderError::InvalidBufferCount(4))
        ));
    }

    #[test]
    fn output_converts_only_into_matching_data() {
        let xy = ProviderOutput::Xy {
            x: ramp(2),
            y: ramp(2),
        };
        assert!(LineData::try_from(xy.clone()).is_ok());
        let err = ColorMapData::try_from(xy).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::WrongShape {
                expected: "3-D",
                found: "2-D"
            }
        ));
    }

    #[test]
    fn calls_are_rate_limited_and_coalesced() {
        let (calls_tx, calls_rx) = mpsc::channel();
        let provider = move |request: ProviderRequest| -> Result<Vec<Buffer>, ProviderError> {
            if let ProviderRequest::Range(range) = request {
                let _ = calls_tx.send((Instant::now(), range));
            }
            Ok(Vec::new())
        };
        let config = ProviderConfig::default().with_min_interval(Duration::from_millis(50));
        let pipeline = ProviderPipeline::spawn(provider, config, |_| {}).expect("spawn");

        pipeline.set_range(Range::new(0.0, 1.0));
        pipeline.set_range(Range::new(0.0, 2.0));
        pipeline.set_range(Range::new(0.0, 3.0));

        let mut seen = Vec::new();
        loop {
            let (at, range) = calls_rx.recv_timeout(WAIT).expect("provider called");
            seen.push((at, range));
            if range == Range::new(0.0, 3.0) {
                break;
            }
        }
        assert!(seen.len() <= 2);
        assert!(seen.iter().all(|(_, range)| *range != Range::new(0.0, 2.0)));
        for pair in seen.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= Duration::from_millis(45));
        }

        pipeline.set_range(Range::new(0.0, 3.0));
        assert!(calls_rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert_eq!(pipeline.calls(), seen.len() as u64);
    }

    #[test]
    fn failures_never_stop_the_pipeline() {
        let (out_tx, out_rx) = mpsc::channel();
        let provider = |request: ProviderRequest| -> Result<Vec<Buffer>, ProviderError> {
            match request {
                ProviderRequest::Range(range) if range.min < 0.0 => {
                    Err(ProviderError::Failed("negative range".to_string()))
                }
                ProviderRequest::Range(range) if range.min == 0.0 => Ok(vec![ramp(4)]),
                ProviderRequest::Range(_) => Ok(vec![ramp(4), ramp(4)]),
                ProviderRequest::Data(buffers) => Ok(buffers),
            }
        };
        let config = ProviderConfig::default().with_min_interval(Duration::ZERO);
        let pipeline = ProviderPipeline::spawn(provider, config, move |output| {
            let _ = out_tx.send(output);
        })
        .expect("spawn");

        pipeline.set_range(Range::new(-1.0, 1.0));
        std::thread::sleep(Duration::from_millis(20));
        pipeline.set_range(Range::new(0.0, 1.0));
        std::thread::sleep(Duration::from_millis(20));
        pipeline.set_range(Range::new(1.0, 2.0));
        let output = out_rx.recv_timeout(WAIT).expect("output");
        assert!(matches!(output, ProviderOutput::Xy { .. }));

        pipeline.set_data(vec![ramp(4), ramp(3), ramp(12)]);
        let output = out_rx.recv_timeout(WAIT).expect("output");
        assert!(matches!(output, ProviderOutput::Xyz { .. }));
    }
}
