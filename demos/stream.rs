//! Streams a growing sine series through a line resampler and prints what a
//! render target would draw.
//!
//! Run with `RUST_LOG=liveplot_resampler=debug` to watch passes coalesce.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use liveplot_resampler::{
    Buffer, LineData, LineOutput, LineResampler, LineStrategy, PlotSize, ProviderConfig,
    ProviderError, ProviderPipeline, ProviderRequest, Range, RenderConfig, RenderTarget,
    RenderTargetAdapter, ResamplerConfig, connect,
};
use tracing_subscriber::EnvFilter;

const SAMPLE_RATE: f64 = 10_000.0;

#[derive(Default)]
struct Console {
    points: usize,
    frames: usize,
}

impl RenderTarget<LineOutput> for Console {
    fn install(&mut self, output: LineOutput) {
        self.points = output.iter().map(Vec::len).sum();
    }

    fn repaint(&mut self) {
        self.frames += 1;
        tracing::info!(frame = self.frames, points = self.points, "repaint");
    }
}

fn signal(start: f64, len: usize) -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..len).map(|i| start + i as f64 / SAMPLE_RATE).collect();
    let y = x
        .iter()
        .map(|t| (t * 7.0).sin() + 0.2 * (t * 331.0).sin())
        .collect();
    (x, y)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (resampler, delivery) = LineResampler::new(LineStrategy::new(), ResamplerConfig::default())
        .expect("failed to start resampler");
    let resampler = Arc::new(resampler);
    let size = PlotSize::new(800, 400);
    let mut adapter =
        RenderTargetAdapter::new(Console::default(), delivery, RenderConfig::default());

    // Producer: appends a chunk every 20ms, republishing the whole series.
    let producer = {
        let resampler = Arc::clone(&resampler);
        thread::spawn(move || {
            let mut x = Vec::new();
            let mut y = Vec::new();
            for _ in 0..50 {
                let (chunk_x, chunk_y) = signal(x.len() as f64 / SAMPLE_RATE, 20_000);
                x.extend(chunk_x);
                y.extend(chunk_y);
                let data = LineData::new(Buffer::from_vec(x.clone()), Buffer::from_vec(y.clone()));
                let generation = resampler.set_data(data);
                tracing::debug!(generation, samples = x.len(), "published");
                thread::sleep(Duration::from_millis(20));
            }
        })
    };

    // UI loop: follow the last two seconds of data.
    let started = Instant::now();
    while started.elapsed() < Duration::from_millis(1_200) {
        let data_range = resampler.x_range();
        if data_range.is_finite() {
            let visible = Range::new(data_range.max - 2.0, data_range.max);
            adapter.request_range(&resampler, visible, size);
        }
        adapter.poll(Instant::now());
        thread::sleep(Duration::from_millis(16));
    }
    producer.join().expect("producer panicked");

    // A provider computes data on demand for each requested range.
    let provider = |request: ProviderRequest| -> Result<Vec<Buffer>, ProviderError> {
        match request {
            ProviderRequest::Range(range) => {
                let len = 100_000;
                let step = range.span() / len as f64;
                let x: Vec<f64> = (0..len).map(|i| range.min + step * i as f64).collect();
                let y = x.iter().map(|t| t.cos()).collect();
                Ok(vec![Buffer::from_vec(x), Buffer::from_vec(y)])
            }
            ProviderRequest::Data(buffers) => Ok(buffers),
        }
    };
    let pipeline = ProviderPipeline::spawn(provider, ProviderConfig::default(), connect(&resampler))
        .expect("failed to start provider");
    for zoom in 1..=5 {
        let visible = Range::new(0.0, 100.0 / f64::from(zoom));
        pipeline.set_range(visible);
        adapter.request_range(&resampler, visible, size);
        thread::sleep(Duration::from_millis(150));
        adapter.poll(Instant::now());
    }

    tracing::info!(
        passes = resampler.passes(),
        provider_calls = pipeline.calls(),
        frames = adapter.target().frames,
        "done"
    );
}
