use crate::enums::CoordinateSystem;
use crate::error::{FiberError, Result};
use crate::geometry::Point3;
use crate::transform::AffineTransform;

use ndarray::Array3;
use ndarray::parallel::prelude::*;

/// Result of painting a single world space point into the label volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintOutcome {
    Written,
    /// Some continuous index coordinate was negative or not finite.
    SkippedNegative,
    /// The rounded index lies past the end of an axis.
    SkippedOutOfBounds,
}

/// Integer label volume with its world to index mapping.
///
/// `labels` is stored `[k, j, i]`: the continuous index `(i, j, k)` produced
/// by `world_to_index` is rounded and then read in reverse order. Existing
/// label maps are laid out this way, so the reversal is part of the data
/// format and must not be "corrected".
#[derive(Clone, Debug, Default)]
pub struct VoxelGrid {
    pub labels: Array3<i32>,
    pub world_to_index: AffineTransform,
    pub space: CoordinateSystem,
}

impl VoxelGrid {
    pub fn new(labels: Array3<i32>, world_to_index: AffineTransform) -> Self {
        Self {
            labels,
            world_to_index,
            space: CoordinateSystem::default(),
        }
    }

    /// Zero-filled volume of `dim` (k, j, i) voxels.
    pub fn zeros(dim: (usize, usize, usize), world_to_index: AffineTransform) -> Self {
        Self::new(Array3::zeros(dim), world_to_index)
    }

    pub fn with_space(mut self, space: CoordinateSystem) -> Self {
        self.space = space;
        self
    }

    /// Get the dimensions of the label array (k, j, i)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.labels.dim()
    }

    pub fn labels(&self) -> &Array3<i32> {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut Array3<i32> {
        &mut self.labels
    }

    /// Continuous index space coordinate (i, j, k) of a world point.
    #[inline]
    pub fn continuous_index(&self, point: &Point3) -> Point3 {
        self.world_to_index.multiply_point(point)
    }

    /// Number of voxels carrying `label`.
    pub fn count_label(&self, label: i32) -> usize {
        self.labels.par_iter().filter(|&&value| value == label).count()
    }

    pub(crate) fn ensure_space(&self, bundle_space: CoordinateSystem) -> Result<()> {
        if bundle_space == self.space {
            Ok(())
        } else {
            Err(FiberError::CoordinateSystemMismatch {
                bundle: bundle_space,
                grid: self.space,
            })
        }
    }

    #[inline]
    fn rounded(ijk: Point3) -> Option<[i64; 3]> {
        if ijk.iter().any(|c| !c.is_finite()) {
            return None;
        }
        Some([ijk[0].round() as i64, ijk[1].round() as i64, ijk[2].round() as i64])
    }

    /// Reverses a non-negative rounded `(i, j, k)` into an in-bounds `[k, j, i]`.
    #[inline]
    fn array_index(&self, ijk: [i64; 3]) -> Option<[usize; 3]> {
        let (nk, nj, ni) = self.dim();
        let [i, j, k] = ijk.map(|c| usize::try_from(c).ok());
        match (k?, j?, i?) {
            (k, j, i) if k < nk && j < nj && i < ni => Some([k, j, i]),
            _ => None,
        }
    }

    /// Label under a world point for ROI lookups.
    ///
    /// Returns `Ok(None)` when the rounded index has a negative coordinate
    /// (or the transform produced a non-finite one): such points lie outside
    /// the field of view and are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FiberError::IndexOutOfGrid`] when the rounded index is
    /// non-negative but past the end of the label array.
    pub fn label_at(&self, point: &Point3) -> Result<Option<i32>> {
        let Some(ijk) = Self::rounded(self.continuous_index(point)) else {
            return Ok(None);
        };
        if ijk.iter().any(|&c| c < 0) {
            return Ok(None);
        }
        match self.array_index(ijk) {
            Some(index) => Ok(Some(self.labels[index])),
            None => Err(FiberError::IndexOutOfGrid {
                index: ijk,
                dim: self.dim(),
            }),
        }
    }

    /// Writes `label` at the voxel under a world point.
    ///
    /// Points whose continuous index is negative on any axis are skipped
    /// before rounding. Indices past the array extent are ignored.
    pub fn paint(&mut self, point: &Point3, label: i32) -> PaintOutcome {
        let continuous = self.continuous_index(point);
        if continuous.iter().any(|&c| c < 0.0) {
            return PaintOutcome::SkippedNegative;
        }
        let Some(ijk) = Self::rounded(continuous) else {
            return PaintOutcome::SkippedNegative;
        };
        match self.array_index(ijk).and_then(|index| self.labels.get_mut(index)) {
            Some(voxel) => {
                *voxel = label;
                PaintOutcome::Written
            }
            None => PaintOutcome::SkippedOutOfBounds,
        }
    }
}
