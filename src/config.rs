//! Tunables for the resampler, the render adapter and the provider pipeline.

use std::time::Duration;

/// Configuration for a [`Resampler`](crate::Resampler) and its strategies.
#[derive(Debug, Clone)]
pub struct ResamplerConfig {
    /// Output buckets per horizontal pixel for line plots.
    ///
    /// A line resampler emits at most `plot width * line_oversampling`
    /// points per line.
    pub line_oversampling: usize,
    /// Upper bound on colormap x cells; the plot width also caps them.
    pub colormap_max_columns: usize,
    /// Upper bound on colormap y cells; the plot height also caps them.
    pub colormap_max_rows: usize,
    /// Colormap windows with this many samples or fewer are cleared instead
    /// of regridded.
    pub colormap_min_points: usize,
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for ResamplerConfig {
    fn default() -> Self {
        Self {
            line_oversampling: 4,
            colormap_max_columns: 1000,
            colormap_max_rows: 1000,
            colormap_min_points: 10,
            thread_name: "resampler".to_string(),
        }
    }
}

impl ResamplerConfig {
    /// Set the line oversampling factor.
    pub fn with_line_oversampling(mut self, factor: usize) -> Self {
        self.line_oversampling = factor;
        self
    }

    /// Set the colormap cell caps.
    pub fn with_colormap_limits(mut self, max_columns: usize, max_rows: usize) -> Self {
        self.colormap_max_columns = max_columns;
        self.colormap_max_rows = max_rows;
        self
    }

    /// Set the minimum colormap window size.
    pub fn with_colormap_min_points(mut self, points: usize) -> Self {
        self.colormap_min_points = points;
        self
    }

    /// Set the worker thread name.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Number of output points a line may use for a plot `width` pixels wide.
    pub fn line_bucket_count(&self, width: u32) -> usize {
        (width as usize).saturating_mul(self.line_oversampling)
    }
}

/// Configuration for a [`RenderTargetAdapter`](crate::RenderTargetAdapter).
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Repaint requests closer together than this collapse into one.
    pub repaint_debounce: Duration,
    /// Skip resampling when the visible range is already covered.
    pub reuse_cached: bool,
    /// For lossy output, the smallest visible/installed span ratio that
    /// still reuses the cached envelope.
    pub reuse_min_span_ratio: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            repaint_debounce: Duration::from_millis(10),
            reuse_cached: true,
            reuse_min_span_ratio: 0.5,
        }
    }
}

impl RenderConfig {
    /// Set the repaint debounce window.
    pub fn with_repaint_debounce(mut self, debounce: Duration) -> Self {
        self.repaint_debounce = debounce;
        self
    }

    /// Enable or disable the range cache.
    pub fn with_reuse_cached(mut self, enabled: bool) -> Self {
        self.reuse_cached = enabled;
        self
    }

    /// Set the zoom ratio below which a lossy envelope is resampled.
    pub fn with_reuse_min_span_ratio(mut self, ratio: f64) -> Self {
        self.reuse_min_span_ratio = ratio;
        self
    }
}

/// Configuration for a [`ProviderPipeline`](crate::ProviderPipeline).
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Minimum delay between the start of two provider calls.
    pub min_interval: Duration,
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(100),
            thread_name: "data-provider".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Set the minimum delay between provider calls.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Set the worker thread name.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}
