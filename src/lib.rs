//! liveplot_resampler keeps plots of huge time series responsive.
//!
//! Data producers hand in shared buffers; a background worker per plot
//! decimates the visible window to roughly one min/max pair per pixel and
//! hands the result back to the UI thread. Requests that arrive while the
//! worker is busy are coalesced, so only the latest state is ever computed.

#![forbid(unsafe_code)]

pub mod axis;
pub mod config;
pub mod datasource;
pub mod decimate;
pub mod error;
pub mod geom;
pub mod provider;
pub mod render;
pub mod resample;
pub mod view;
mod worker;

#[cfg(feature = "gpui")]
pub mod gpui_backend;

pub use axis::AxisScale;
pub use config::{ProviderConfig, RenderConfig, ResamplerConfig};
pub use datasource::{
    ArrayView, Buffer, HostArray, MemoryOrder, OwnedArray, ScalarType, XYView, XYZView,
};
pub use decimate::{ColorMapGrid, Decimation, DecimationScratch, decimate_minmax};
pub use error::{BufferError, ProviderError, ResampleError};
pub use geom::{CurvePoint, Point};
pub use provider::{DataProvider, ProviderOutput, ProviderPipeline, ProviderRequest, connect};
pub use render::{RenderCacheKey, RenderTarget, RenderTargetAdapter, RepaintDebouncer};
pub use resample::{
    ColorMapData, ColorMapResampler, ColorMapStrategy, CurveOutput, CurveResampler,
    CurveStrategy, Delivery, LineData, LineOutput, LineResampler, LineStrategy, ResampleStrategy,
    Resampled, Resampler, StrategyOutput,
};
pub use view::{PlotInfo, PlotSize, Range};
