//! Edge point sampling of a single polyline.

use crate::error::{FiberError, Result};
use crate::geometry::{Point3, distance, lerp};

/// Relative slack used to avoid emitting a sample on top of a segment end.
const END_TOLERANCE: f64 = 1e-9;

pub(crate) fn check_spacing(name: &'static str, spacing: f64) -> Result<()> {
    if spacing.is_finite() && spacing > 0.0 {
        Ok(())
    } else {
        Err(FiberError::invalid_parameter(name, spacing))
    }
}

/// Samples points along every segment of `points`, `spacing` apart measured
/// from each segment start. Every original vertex is kept, shared vertices
/// appear once, and the last piece of each segment may be shorter than
/// `spacing`. Inputs with fewer than two points are returned unchanged.
///
/// # Errors
///
/// Returns [`FiberError::InvalidParameter`] unless `spacing` is finite and
/// positive, and [`FiberError::InvalidBundle`] when a segment length is not
/// finite (non-finite coordinates, or a coordinate difference that
/// overflows).
pub fn resample(points: &[Point3], spacing: f64) -> Result<Vec<Point3>> {
    check_spacing("spacing", spacing)?;
    if points.len() < 2 {
        return Ok(points.to_vec());
    }

    let mut sampled = Vec::with_capacity(points.len());
    sampled.push(points[0]);
    for segment in points.windows(2) {
        let (start, end) = (&segment[0], &segment[1]);
        let length = distance(start, end);
        if !length.is_finite() {
            return Err(FiberError::InvalidBundle(format!(
                "segment {start:?} -> {end:?} has no finite length"
            )));
        }
        let limit = length - END_TOLERANCE * length.max(1.0);

        let mut step = 1;
        loop {
            let offset = step as f64 * spacing;
            if offset >= limit {
                break;
            }
            sampled.push(lerp(start, end, offset / length));
            step += 1;
        }
        sampled.push(*end);
    }
    Ok(sampled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_half_unit_along_two_segments() {
        let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let sampled = resample(&points, 0.5).unwrap();
        assert_eq!(
            sampled,
            vec![
                [0.0, 0.0, 0.0],
                [0.5, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.5, 0.0, 0.0],
                [2.0, 0.0, 0.0],
            ]
        );
    }

    #[test]
    fn keeps_endpoints_for_uneven_spacing() {
        let points = [[0.0, 0.0, 0.0], [0.0, 3.0, 4.0], [1.0, 3.0, 4.0]];
        let sampled = resample(&points, 0.7).unwrap();
        assert_eq!(sampled.first(), points.first());
        assert_eq!(sampled.last(), points.last());
        // 5.0 / 0.7 -> offsets 0.7 .. 4.9, then 1.0 / 0.7 -> offset 0.7
        assert_eq!(sampled.len(), 1 + 7 + 1 + 1 + 1);
        assert!(sampled.contains(&points[1]));
        for pair in sampled.windows(2) {
            assert!(distance(&pair[0], &pair[1]) <= 0.7 + 1e-9);
        }
    }

    #[test]
    fn spacing_larger_than_segment_keeps_vertices_only() {
        let points = [[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [2.0, 0.0, 0.0]];
        assert_eq!(resample(&points, 10.0).unwrap(), points.to_vec());
    }

    #[test]
    fn degenerate_inputs_are_unchanged() {
        assert!(resample(&[], 0.5).unwrap().is_empty());
        assert_eq!(resample(&[[1.0, 2.0, 3.0]], 0.5).unwrap(), vec![[1.0, 2.0, 3.0]]);
    }

    #[test]
    fn zero_length_segment_keeps_duplicate_vertex() {
        let points = [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let sampled = resample(&points, 0.5).unwrap();
        assert_eq!(
            sampled,
            vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [1.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn non_finite_segments_are_errors() {
        for end in [[f64::NAN, 0.0, 0.0], [f64::INFINITY, 0.0, 0.0]] {
            assert!(matches!(
                resample(&[[0.0, 0.0, 0.0], end], 0.5),
                Err(FiberError::InvalidBundle(_))
            ));
        }
        // both ends finite, the difference is not
        assert!(matches!(
            resample(&[[-1e308, 0.0, 0.0], [1e308, 0.0, 0.0]], 0.5),
            Err(FiberError::InvalidBundle(_))
        ));
    }

    #[test]
    fn rejects_non_positive_spacing() {
        let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        assert!(matches!(
            resample(&points, 0.0),
            Err(FiberError::InvalidParameter { .. })
        ));
        assert!(resample(&points, f64::NAN).is_err());
    }
}
