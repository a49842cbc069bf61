//! Summary statistics of a bundle: counts, mean fiber length and per
//! attribute scalar statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::bundle::PolylineBundle;
use crate::error::Result;
use crate::geometry::polyline_length;

/// Valid ranges of the common diffusion tensor scalars, keyed by name
/// fragment.
pub fn default_measurement_clamps() -> BTreeMap<String, (f64, f64)> {
    [
        ("FractionalAnisotropy", (0.0, 1.0)),
        ("RelativeAnisotropy", (0.0, std::f64::consts::SQRT_2)),
        ("LinearMeasurement", (0.0, 1.0)),
        ("PlanarMeasurement", (0.0, 1.0)),
        ("SphericalMeasurement", (0.0, 1.0)),
    ]
    .into_iter()
    .map(|(name, range)| (name.to_string(), range))
    .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FiberStats {
    pub num_points: usize,
    pub num_fibers: usize,
    /// Mean arc length over streamlines with at least two points.
    pub mean_length: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScalarStats {
    /// Values that entered the statistics.
    pub count: usize,
    /// Values dropped by a clamp range.
    pub excluded: usize,
    /// NaN values, dropped before clamping.
    pub nan_count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
    /// Sample variance.
    pub variance: Option<f64>,
}

impl ScalarStats {
    fn from_values(mut values: Vec<f64>, excluded: usize, nan_count: usize) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                excluded,
                nan_count,
                ..Self::default()
            };
        }
        values.sort_by(f64::total_cmp);

        let mean = values.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 0 {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        } else {
            values[count / 2]
        };
        let variance = (count > 1).then(|| {
            values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (count - 1) as f64
        });

        Self {
            count,
            excluded,
            nan_count,
            mean: Some(mean),
            min: values.first().copied(),
            max: values.last().copied(),
            median: Some(median),
            variance,
        }
    }
}

pub fn fiber_stats(bundle: &PolylineBundle) -> Result<FiberStats> {
    bundle.validate()?;
    let mut measured = 0;
    let mut total_length = 0.0;
    for line in 0..bundle.num_streamlines() {
        let points = bundle.streamline_points(line)?;
        if points.len() > 1 {
            total_length += polyline_length(&points);
            measured += 1;
        }
    }
    Ok(FiberStats {
        num_points: bundle.num_points(),
        num_fibers: bundle.num_streamlines(),
        mean_length: (measured > 0).then(|| total_length / measured as f64),
    })
}

/// Statistics of every single-component point attribute over all points.
///
/// `clamps` maps a name fragment to an inclusive `(min, max)` range; values
/// of attributes whose name contains the fragment are excluded when outside
/// the range. When several fragments match, the last one in key order wins.
pub fn scalar_stats(
    bundle: &PolylineBundle,
    clamps: &BTreeMap<String, (f64, f64)>,
) -> Result<BTreeMap<String, ScalarStats>> {
    bundle.validate()?;
    let mut stats = BTreeMap::new();
    for (name, array) in &bundle.point_attributes {
        if array.components != 1 {
            continue;
        }
        let clamp = clamps
            .iter()
            .filter(|(fragment, _)| name.contains(fragment.as_str()))
            .map(|(_, &range)| range)
            .last();

        let mut values = Vec::with_capacity(array.len());
        let mut excluded = 0;
        let mut nan_count = 0;
        for value in (0..array.len()).filter_map(|index| array.scalar(index)) {
            if value.is_nan() {
                nan_count += 1;
                continue;
            }
            if clamp.is_some_and(|(min, max)| value < min || value > max) {
                excluded += 1;
                continue;
            }
            values.push(value);
        }
        stats.insert(name.clone(), ScalarStats::from_values(values, excluded, nan_count));
    }
    Ok(stats)
}
