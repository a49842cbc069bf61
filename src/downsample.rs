//! Point decimation and fiber subsampling.
//!
//! The output keeps every `n`th point of each selected streamline (plus its
//! last point), where `n` is the largest whole multiple of the estimated
//! input step that does not exceed the requested step. Points are never
//! interpolated. Streamlines are visited in a random order so that the
//! percentage cutoff is not biased towards the original file order.
//! Point and cell attributes are not carried over.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::bundle::{BundleBuilder, PolylineBundle};
use crate::enums::FiberOrder;
use crate::error::{FiberError, Result};
use crate::geometry::polyline_length;

/// Streamlines shorter than this are not used to estimate the step size.
pub const STEP_ESTIMATE_MIN_POINTS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownsampleParameters {
    /// Requested distance between kept points, in world units.
    pub target_step_size: f64,
    /// Share of input streamlines to emit, in (0, 100].
    pub fiber_keep_percent: f64,
    pub min_points_per_fiber: usize,
    pub min_fiber_length: f64,
    pub max_fiber_length: f64,
    pub fiber_order: FiberOrder,
}

impl Default for DownsampleParameters {
    fn default() -> Self {
        Self {
            target_step_size: 2.0,
            fiber_keep_percent: 50.0,
            min_points_per_fiber: 3,
            min_fiber_length: 10.0,
            max_fiber_length: 200.0,
            fiber_order: FiberOrder::Random,
        }
    }
}

impl DownsampleParameters {
    pub fn validate(&self) -> Result<()> {
        if !(self.target_step_size.is_finite() && self.target_step_size > 0.0) {
            return Err(FiberError::invalid_parameter(
                "target_step_size",
                self.target_step_size,
            ));
        }
        if !(self.fiber_keep_percent > 0.0 && self.fiber_keep_percent <= 100.0) {
            return Err(FiberError::invalid_parameter(
                "fiber_keep_percent",
                self.fiber_keep_percent,
            ));
        }
        if !(self.min_fiber_length.is_finite() && self.min_fiber_length >= 0.0) {
            return Err(FiberError::invalid_parameter(
                "min_fiber_length",
                self.min_fiber_length,
            ));
        }
        // infinity is allowed and disables the upper bound
        if self.max_fiber_length.is_nan() || self.max_fiber_length < 0.0 {
            return Err(FiberError::invalid_parameter(
                "max_fiber_length",
                self.max_fiber_length,
            ));
        }
        Ok(())
    }

    /// Stride between kept points for an input step of `input_step`.
    pub fn keep_stride(&self, input_step: f64) -> usize {
        if input_step <= 0.0 || self.target_step_size < input_step {
            return 1;
        }
        ((self.target_step_size / input_step).floor() as usize).max(1)
    }

    /// Inclusive `(min, max)` point count of an eligible streamline.
    pub fn point_bounds(&self, input_step: f64) -> (usize, usize) {
        if input_step <= 0.0 {
            return (self.min_points_per_fiber, usize::MAX);
        }
        let min_points = (self.min_points_per_fiber as f64)
            .max(self.min_fiber_length / input_step)
            .floor() as usize;
        // float to int casts saturate, so an infinite length maps to usize::MAX
        let max_points = (self.max_fiber_length / input_step).floor() as usize;
        (min_points, max_points)
    }

    /// Number of streamlines to emit out of `total`.
    pub fn keep_count(&self, total: usize) -> usize {
        (total as f64 * self.fiber_keep_percent / 100.0).floor() as usize
    }
}

/// Mean distance between consecutive points of the first streamline with at
/// least [`STEP_ESTIMATE_MIN_POINTS`] points, ignoring its first and last
/// segment. Returns 0 when no streamline is long enough.
pub fn estimate_step_size(bundle: &PolylineBundle) -> Result<f64> {
    bundle.validate()?;
    let Some(line) = bundle
        .streamlines
        .iter()
        .position(|ids| ids.len() >= STEP_ESTIMATE_MIN_POINTS)
    else {
        return Ok(0.0);
    };
    let points = bundle.streamline_points(line)?;
    let inner = &points[1..points.len() - 1];
    Ok(polyline_length(inner) / (inner.len() - 1) as f64)
}

/// Downsamples `bundle`, drawing the fiber order from `params.fiber_order`.
///
/// Returns the new bundle and the estimated input step size.
pub fn downsample(
    bundle: &PolylineBundle,
    params: &DownsampleParameters,
) -> Result<(PolylineBundle, f64)> {
    match params.fiber_order {
        FiberOrder::Random => downsample_with_rng(bundle, params, &mut rand::rng()),
        FiberOrder::Seeded(seed) => {
            downsample_with_rng(bundle, params, &mut StdRng::seed_from_u64(seed))
        }
    }
}

/// Like [`downsample`] but permutes the streamlines with `rng`, ignoring
/// `params.fiber_order`.
pub fn downsample_with_rng<R: Rng + ?Sized>(
    bundle: &PolylineBundle,
    params: &DownsampleParameters,
    rng: &mut R,
) -> Result<(PolylineBundle, f64)> {
    params.validate()?;
    bundle.validate()?;
    let started = Instant::now();

    let input_step = estimate_step_size(bundle)?;
    let stride = params.keep_stride(input_step);
    let (min_points, max_points) = params.point_bounds(input_step);
    let keep_count = params.keep_count(bundle.num_streamlines());
    log::info!(
        "Downsampling {} streamlines / {} points: input step {:.4}, keeping every {} point(s), \
         {}..={} points per fiber, at most {} fibers",
        bundle.num_streamlines(),
        bundle.num_points(),
        input_step,
        stride,
        min_points,
        max_points,
        keep_count
    );

    let mut order: Vec<usize> = (0..bundle.num_streamlines()).collect();
    order.shuffle(rng);

    let mut builder = BundleBuilder::new().with_space(bundle.space);
    for line in order {
        if builder.num_streamlines() >= keep_count {
            break;
        }
        let points = bundle.streamline_points(line)?;
        let count = points.len();
        if count < min_points || count > max_points {
            continue;
        }
        builder.push_streamline(
            points
                .into_iter()
                .enumerate()
                .filter(|(position, _)| position % stride == 0 || position + 1 == count)
                .map(|(_, point)| point),
        )?;
    }
    let output = builder.build();

    log::info!(
        "Downsampled to {} streamlines / {} points, output step {:.4}",
        output.num_streamlines(),
        output.num_points(),
        estimate_step_size(&output)?
    );
    log::debug!("Downsampling took {:?}", started.elapsed());

    Ok((output, input_step))
}
