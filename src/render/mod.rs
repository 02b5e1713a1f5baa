//! Render-target glue on the UI thread.
//!
//! Output travels from the resampler's worker through a [`Delivery`]
//! channel. A [`RenderTargetAdapter`] drains it from the UI loop, installs
//! the newest result into its [`RenderTarget`] and coalesces repaints.

use std::time::{Duration, Instant};

use crate::config::RenderConfig;
use crate::resample::{Delivery, ResampleStrategy, Resampler};
use crate::view::{PlotSize, Range};

/// A plot primitive that displays resampled output.
pub trait RenderTarget<O> {
    /// Replace the displayed data with `output`.
    fn install(&mut self, output: O);

    /// Redraw the plot.
    fn repaint(&mut self);
}

/// Collapses repaint requests that arrive within a short window.
///
/// The first request repaints immediately; later requests inside the window
/// are folded into one deferred repaint released by [`RepaintDebouncer::flush`].
#[derive(Debug, Clone)]
pub struct RepaintDebouncer {
    window: Duration,
    last: Option<Instant>,
    pending: bool,
}

impl RepaintDebouncer {
    /// Create a debouncer with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: None,
            pending: false,
        }
    }

    /// Request a repaint at `now`. Returns `true` when it should happen now.
    pub fn request(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.last = Some(now);
            self.pending = false;
            true
        } else {
            self.pending = true;
            false
        }
    }

    /// Release a deferred repaint once the window has elapsed.
    pub fn flush(&mut self, now: Instant) -> bool {
        if self.pending && self.is_due(now) {
            self.last = Some(now);
            self.pending = false;
            true
        } else {
            false
        }
    }

    /// Check whether a deferred repaint is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// When the deferred repaint becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match (self.pending, self.last) {
            (true, Some(last)) => Some(last + self.window),
            _ => None,
        }
    }

    fn is_due(&self, now: Instant) -> bool {
        self.last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.window)
    }
}

/// Identifies the output currently installed in a render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCacheKey {
    /// X range the output covers.
    pub range: Range,
    /// Plot size the output was sized for.
    pub size: PlotSize,
    /// Data generation for cache invalidation.
    pub generation: u64,
}

/// Feeds a [`RenderTarget`] from a resampler's [`Delivery`].
#[derive(Debug)]
pub struct RenderTargetAdapter<T, O> {
    target: T,
    delivery: Delivery<O>,
    config: RenderConfig,
    debouncer: RepaintDebouncer,
    installed: Option<RenderCacheKey>,
    lossless: bool,
    requested_size: Option<PlotSize>,
}

impl<T: RenderTarget<O>, O> RenderTargetAdapter<T, O> {
    /// Wrap a target and the delivery it installs from.
    pub fn new(target: T, delivery: Delivery<O>, config: RenderConfig) -> Self {
        let debouncer = RepaintDebouncer::new(config.repaint_debounce);
        Self {
            target,
            delivery,
            config,
            debouncer,
            installed: None,
            lossless: false,
            requested_size: None,
        }
    }

    /// Install the newest delivered output and release due repaints.
    ///
    /// Older results waiting in the channel are dropped unseen. Returns
    /// `true` when new output was installed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut installed = false;
        if let Some(resampled) = self.delivery.try_latest() {
            tracing::trace!(
                pass = resampled.pass,
                generation = resampled.generation,
                "installing resampled output"
            );
            self.installed = Some(RenderCacheKey {
                range: resampled.range,
                size: resampled.size,
                generation: resampled.generation,
            });
            self.lossless = resampled.lossless;
            self.target.install(resampled.output);
            installed = true;
            self.request_repaint(now);
        }
        if self.debouncer.flush(now) {
            self.target.repaint();
        }
        installed
    }

    /// Ask for a repaint, coalesced with recent ones.
    pub fn request_repaint(&mut self, now: Instant) {
        if self.debouncer.request(now) {
            self.target.repaint();
        }
    }

    /// Check whether `visible` at `size` needs a new resampling pass.
    ///
    /// Installed output is reused when it was computed from the same data
    /// generation at the same size and covers `visible`; lossy output is
    /// only reused while the zoom keeps at least `reuse_min_span_ratio` of
    /// its span. With `reuse_cached` off every request resamples.
    pub fn needs_resample(&self, visible: Range, size: PlotSize, generation: u64) -> bool {
        if !self.config.reuse_cached {
            return true;
        }
        let Some(key) = self.installed else {
            return true;
        };
        if key.generation != generation || key.size != size {
            return true;
        }
        if !key.range.contains_range(visible) {
            return true;
        }
        if self.lossless {
            return false;
        }
        let installed_span = key.range.span();
        installed_span <= 0.0 || visible.span() / installed_span < self.config.reuse_min_span_ratio
    }

    /// Forward a visible-range change to `resampler` unless the installed
    /// output already covers it.
    ///
    /// Returns `true` when a pass was requested.
    pub fn request_range<S>(
        &mut self,
        resampler: &Resampler<S>,
        visible: Range,
        size: PlotSize,
    ) -> bool
    where
        S: ResampleStrategy<Output = O>,
    {
        if !self.needs_resample(visible, size, resampler.generation()) {
            tracing::trace!(min = visible.min, max = visible.max, "render cache hit");
            return false;
        }
        if self.requested_size != Some(size) {
            resampler.set_plot_size(size);
            self.requested_size = Some(size);
        }
        resampler.resample(visible);
        true
    }

    /// Key of the installed output, if any.
    pub fn cache_key(&self) -> Option<RenderCacheKey> {
        self.installed
    }

    /// Access the render target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Access the render target mutably.
    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// When a deferred repaint becomes due, if any.
    pub fn repaint_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resample::Resampled;

    #[derive(Debug, Default)]
    struct Recorder {
        installed: Vec<u32>,
        repaints: usize,
    }

    impl RenderTarget<u32> for Recorder {
        fn install(&mut self, output: u32) {
            self.installed.push(output);
        }

        fn repaint(&mut self) {
            self.repaints += 1;
        }
    }

    fn resampled(output: u32, range: Range, lossless: bool) -> Resampled<u32> {
        Resampled {
            output,
            range,
            size: PlotSize::new(100, 50),
            generation: 1,
            pass: u64::from(output),
            lossless,
        }
    }

    #[test]
    fn debouncer_collapses_bursts() {
        let start = Instant::now();
        let mut debouncer = RepaintDebouncer::new(Duration::from_millis(10));
        assert!(debouncer.request(start));
        assert!(!debouncer.request(start + Duration::from_millis(2)));
        assert!(!debouncer.request(start + Duration::from_millis(5)));
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(10)));
        assert!(!debouncer.flush(start + Duration::from_millis(8)));
        assert!(debouncer.flush(start + Duration::from_millis(10)));
        assert!(!debouncer.flush(start + Duration::from_millis(30)));
        assert!(debouncer.request(start + Duration::from_millis(30)));
    }

    #[test]
    fn poll_installs_only_the_newest_output() {
        let (sender, delivery) = Delivery::channel();
        let mut adapter = RenderTargetAdapter::new(
            Recorder::default(),
            delivery,
            RenderConfig::default(),
        );
        let now = Instant::now();
        assert!(!adapter.poll(now));

        for output in 1..=3 {
            sender
                .send(resampled(output, Range::new(0.0, 10.0), false))
                .expect("send");
        }
        assert!(adapter.poll(now));
        assert_eq!(adapter.target().installed, vec![3]);
        assert_eq!(adapter.target().repaints, 1);

        sender
            .send(resampled(4, Range::new(0.0, 10.0), false))
            .expect("send");
        assert!(adapter.poll(now + Duration::from_millis(1)));
        assert_eq!(adapter.target().repaints, 1);
        assert!(!adapter.poll(now + Duration::from_millis(11)));
        assert_eq!(adapter.target().repaints, 2);
        assert_eq!(adapter.target().installed, vec![3, 4]);
    }

    #[test]
    fn cache_reuses_covering_output() {
        let (sender, delivery) = Delivery::channel();
        let mut adapter = RenderTargetAdapter::new(
            Recorder::default(),
            delivery,
            RenderConfig::default(),
        );
        let size = PlotSize::new(100, 50);
        assert!(adapter.needs_resample(Range::new(0.0, 10.0), size, 1));

        sender
            .send(resampled(1, Range::new(0.0, 10.0), false))
            .expect("send");
        adapter.poll(Instant::now());
        assert!(!adapter.needs_resample(Range::new(1.0, 9.0), size, 1));
        // Zoomed in too far for the lossy envelope.
        assert!(adapter.needs_resample(Range::new(1.0, 3.0), size, 1));
        // Panned outside the installed range.
        assert!(adapter.needs_resample(Range::new(5.0, 15.0), size, 1));
        // New data or a resize always resamples.
        assert!(adapter.needs_resample(Range::new(1.0, 9.0), size, 2));
        assert!(adapter.needs_resample(Range::new(1.0, 9.0), PlotSize::new(200, 50), 1));
    }

    #[test]
    fn lossless_output_is_reused_at_any_zoom() {
        let (sender, delivery) = Delivery::channel();
        let mut adapter = RenderTargetAdapter::new(
            Recorder::default(),
            delivery,
            RenderConfig::default(),
        );
        sender
            .send(resampled(1, Range::new(0.0, 10.0), true))
            .expect("send");
        adapter.poll(Instant::now());
        let size = PlotSize::new(100, 50);
        assert!(!adapter.needs_resample(Range::new(4.0, 4.5), size, 1));
        assert_eq!(
            adapter.cache_key().map(|key| key.range),
            Some(Range::new(0.0, 10.0))
        );
    }

    #[test]
    fn disabled_cache_always_resamples() {
        let (sender, delivery) = Delivery::channel();
        let mut adapter = RenderTargetAdapter::new(
            Recorder::default(),
            delivery,
            RenderConfig::default().with_reuse_cached(false),
        );
        sender
            .send(resampled(1, Range::new(0.0, 10.0), true))
            .expect("send");
        adapter.poll(Instant::now());
        assert!(adapter.needs_resample(Range::new(1.0, 2.0), PlotSize::new(100, 50), 1));
    }
}
