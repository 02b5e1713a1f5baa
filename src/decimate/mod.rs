//! Decimation engines turning windowed views into plot-ready output.
//!
//! - [`minmax`]: min/max envelope for line plots.
//! - [`curve`]: order-preserving copy for parametric curves.
//! - [`colormap`]: averaging regrid for 2-D data.

pub mod colormap;
pub mod curve;
pub mod minmax;

pub use colormap::{ColorMapGrid, regrid, regrid_with};
pub use curve::copy_curve;
pub use minmax::{Decimation, copy_points, decimate_minmax};

/// Reusable accumulators for colormap regridding.
///
/// Keeping one per resampler avoids reallocating the cell sums on every
/// pass.
#[derive(Debug, Default, Clone)]
pub struct DecimationScratch {
    sums: Vec<f64>,
    counts: Vec<u32>,
}

impl DecimationScratch {
    /// Create empty scratch buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero `cells` accumulators and hand them out.
    pub(crate) fn reset(&mut self, cells: usize) -> (&mut [f64], &mut [u32]) {
        self.sums.clear();
        self.sums.resize(cells, 0.0);
        self.counts.clear();
        self.counts.resize(cells, 0);
        (&mut self.sums, &mut self.counts)
    }
}
