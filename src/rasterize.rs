//! Painting fiber bundles into a label volume.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::bundle::PolylineBundle;
use crate::error::{FiberError, Result};
use crate::geometry::Point3;
use crate::resample::{check_spacing, resample};
use crate::voxel_grid::{PaintOutcome, VoxelGrid};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterizeParameters {
    pub label_value: i32,
    pub sampling_distance: f64,
    /// Streamlines resampled at once. Bounds peak memory only.
    pub batch_size: usize,
}

impl Default for RasterizeParameters {
    fn default() -> Self {
        Self {
            label_value: 1,
            sampling_distance: 0.1,
            batch_size: 100,
        }
    }
}

impl RasterizeParameters {
    pub fn validate(&self) -> Result<()> {
        check_spacing("sampling_distance", self.sampling_distance)?;
        if self.batch_size == 0 {
            return Err(FiberError::invalid_parameter("batch_size", 0.0));
        }
        Ok(())
    }
}

/// What happened to the sampled points of one [`rasterize`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterizeReport {
    pub sampled_points: usize,
    pub voxels_written: usize,
    pub skipped_negative: usize,
    pub skipped_out_of_bounds: usize,
}

impl RasterizeReport {
    fn record(&mut self, outcome: PaintOutcome) {
        self.sampled_points += 1;
        match outcome {
            PaintOutcome::Written => self.voxels_written += 1,
            PaintOutcome::SkippedNegative => self.skipped_negative += 1,
            PaintOutcome::SkippedOutOfBounds => self.skipped_out_of_bounds += 1,
        }
    }
}

/// Writes `label_value` into every voxel touched by the resampled
/// streamlines of `bundle`.
///
/// The grid is modified in place and never cleared, so repeated calls paint
/// the union of their bundles. Painting is idempotent and independent of
/// point order and batch size. Points with a negative continuous index and
/// points past the array extent are skipped without error.
///
/// # Errors
///
/// Returns an error if the bundle is malformed, the parameters are invalid,
/// or the bundle and grid are tagged with different coordinate systems.
pub fn rasterize(
    bundle: &PolylineBundle,
    grid: &mut VoxelGrid,
    params: &RasterizeParameters,
) -> Result<RasterizeReport> {
    params.validate()?;
    bundle.validate()?;
    grid.ensure_space(bundle.space)?;

    let started = Instant::now();
    let count = bundle.num_streamlines();
    let mut report = RasterizeReport::default();

    for start in (0..count).step_by(params.batch_size) {
        let end = (start + params.batch_size).min(count);
        let sampled: Vec<Vec<Point3>> = (start..end)
            .into_par_iter()
            .map(|line| resample(&bundle.streamline_points(line)?, params.sampling_distance))
            .collect::<Result<_>>()?;

        for point in sampled.iter().flatten() {
            report.record(grid.paint(point, params.label_value));
        }
        log::debug!("Rasterized streamlines {start}..{end} of {count}");
    }

    log::info!(
        "Rasterized {} streamlines with label {}: {} sampled points, {} written, \
         {} negative and {} out of bounds skipped",
        count,
        params.label_value,
        report.sampled_points,
        report.voxels_written,
        report.skipped_negative,
        report.skipped_out_of_bounds
    );
    log::debug!("Rasterization took {:?}", started.elapsed());

    Ok(report)
}
