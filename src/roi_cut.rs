//! Trimming streamlines to the stretch between two labeled regions.

use std::ops::RangeInclusive;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::bundle::{BundleBuilder, PolylineBundle};
use crate::error::{FiberError, Result};
use crate::geometry::{Point3, nearest_index};
use crate::resample::{check_spacing, resample};
use crate::voxel_grid::VoxelGrid;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutParameters {
    pub label_a: i32,
    pub label_b: i32,
    /// Spacing of the temporary resampled copy used for label lookups.
    pub sampling_distance: f64,
}

impl Default for CutParameters {
    fn default() -> Self {
        Self {
            label_a: 1,
            label_b: 2,
            sampling_distance: 0.1,
        }
    }
}

impl CutParameters {
    pub fn validate(&self) -> Result<()> {
        check_spacing("sampling_distance", self.sampling_distance)?;
        if self.label_a == self.label_b {
            return Err(FiberError::invalid_parameter("label_b", self.label_b));
        }
        Ok(())
    }

    #[inline]
    fn is_roi(&self, label: Option<i32>) -> bool {
        matches!(label, Some(value) if value == self.label_a || value == self.label_b)
    }
}

/// Keeps the streamlines that pass through both `label_a` and `label_b`,
/// each trimmed to the original points between its first and last contact
/// with either region.
///
/// The bundle and the grid must share a world space. Only the
/// [`CoordinateSystem`](crate::enums::CoordinateSystem) tags are compared;
/// a wrong `world_to_index` still produces silently wrong results.
///
/// # Errors
///
/// Returns an error if the bundle is malformed, the parameters are invalid,
/// the coordinate systems differ, or a sampled point rounds to an index past
/// the end of the label array.
pub fn cut(
    bundle: &PolylineBundle,
    grid: &VoxelGrid,
    params: &CutParameters,
) -> Result<PolylineBundle> {
    params.validate()?;
    bundle.validate()?;
    grid.ensure_space(bundle.space)?;

    let started = Instant::now();
    let ranges: Vec<Option<RangeInclusive<usize>>> = (0..bundle.num_streamlines())
        .into_par_iter()
        .map(|line| retained_range(&bundle.streamline_points(line)?, grid, params))
        .collect::<Result<_>>()?;

    let mut builder = BundleBuilder::with_layout_of(bundle);
    for (line, range) in ranges.into_iter().enumerate() {
        if let Some(range) = range {
            builder.push_streamline_from(bundle, line, range)?;
        }
    }
    let output = builder.build();

    log::info!(
        "ROI cut between labels {} and {}: {} of {} streamlines kept, {} points",
        params.label_a,
        params.label_b,
        output.num_streamlines(),
        bundle.num_streamlines(),
        output.num_points()
    );
    log::debug!("ROI cut took {:?}", started.elapsed());

    Ok(output)
}

/// Positions of `points` to keep, or `None` when the streamline does not
/// reach both regions.
fn retained_range(
    points: &[Point3],
    grid: &VoxelGrid,
    params: &CutParameters,
) -> Result<Option<RangeInclusive<usize>>> {
    let sampled = resample(points, params.sampling_distance)?;
    let labels = sampled
        .iter()
        .map(|point| grid.label_at(point))
        .collect::<Result<Vec<_>>>()?;

    let touched_a = labels.contains(&Some(params.label_a));
    let touched_b = labels.contains(&Some(params.label_b));
    if !(touched_a && touched_b) {
        return Ok(None);
    }

    let first = labels.iter().position(|&label| params.is_roi(label));
    let last = labels.iter().rposition(|&label| params.is_roi(label));
    let (Some(first), Some(last)) = (first, last) else {
        return Ok(None);
    };

    let begin = nearest_index(points, &sampled[first]);
    let end = nearest_index(points, &sampled[last]);
    Ok(begin.zip(end).map(|(begin, end)| begin..=end))
}
