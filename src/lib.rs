//! # Fiber bundle library
//!
//! This crate provides the geometric processing of diffusion MRI
//! tractography: fiber bundles made of 3D streamlines (polylines) with
//! optional per-point and per-streamline attribute arrays.
//!
//! Four operations work on a [`PolylineBundle`] and, where needed, an integer
//! label volume ([`VoxelGrid`]) with its world to index transform:
//!  - Resampling a streamline at a target spacing along its segments
//!  - Cutting streamlines to the stretch between two labeled regions
//!  - Downsampling points and subsampling fibers
//!  - Rasterizing streamlines into a label volume
//!
//!  Every operation reads its input bundle and builds a new one; only the
//!  rasterizer writes, and only into the grid it is handed exclusively.
//!  Work per streamline is spread over threads with rayon where the result
//!  does not depend on it. Bundles and grids are assumed to have the
//!  following properties:
//!   - Points of the bundle and the grid's `world_to_index` refer to the
//!     same world space (only the [`CoordinateSystem`] tags are checked)
//!   - Labels are stored `[k, j, i]`, the reverse of the index space axes
//!   - Reading and writing tractography files happens elsewhere
//!
//! # Examples
//!
//! ## Cutting a bundle between two regions
//!
//! Keep the streamlines that pass through labels 1 and 2 of a label map,
//! trimmed to the part between the two regions.
//!
//! ```
//! # use fiber_bundle::{AffineTransform, CutParameters, PolylineBundle, VoxelGrid, cut};
//! let mut grid = VoxelGrid::zeros((1, 1, 10), AffineTransform::identity());
//! grid.labels_mut()[[0, 0, 2]] = 1;
//! grid.labels_mut()[[0, 0, 7]] = 2;
//!
//! let line: Vec<[f64; 3]> = (0..10).map(|x| [x as f64, 0.0, 0.0]).collect();
//! let bundle = PolylineBundle::from_streamlines([line]);
//!
//! let params = CutParameters { label_a: 1, label_b: 2, sampling_distance: 0.5 };
//! let trimmed = cut(&bundle, &grid, &params).expect("bundle and grid are valid");
//! assert_eq!(trimmed.num_points(), 7);
//! ```
//!
//! ## Downsampling reproducibly
//!
//! ```
//! # use fiber_bundle::{DownsampleParameters, FiberOrder, PolylineBundle, downsample};
//! let lines = (0..4).map(|n| (0..5).map(move |p| [3.0 * p as f64, n as f64, 0.0]));
//! let bundle = PolylineBundle::from_streamlines(lines);
//! let params = DownsampleParameters {
//!     target_step_size: 6.0,
//!     fiber_keep_percent: 100.0,
//!     min_points_per_fiber: 2,
//!     min_fiber_length: 0.0,
//!     max_fiber_length: f64::INFINITY,
//!     fiber_order: FiberOrder::Seeded(1),
//! };
//! let (smaller, input_step) = downsample(&bundle, &params).expect("valid parameters");
//! assert_eq!(input_step, 3.0);
//! assert_eq!(smaller.num_points(), 4 * 3);
//! ```

pub mod bundle;
pub mod config;
pub mod downsample;
pub mod enums;
pub mod error;
pub mod geometry;
pub mod measurements;
pub mod rasterize;
pub mod resample;
pub mod roi_cut;
pub mod transform;
pub mod voxel_grid;

pub use bundle::{AttributeArray, AttributeValues, BundleBuilder, PolylineBundle};
pub use config::PipelineConfig;
pub use downsample::{DownsampleParameters, downsample, downsample_with_rng, estimate_step_size};
pub use enums::{CoordinateSystem, FiberOrder};
pub use error::{FiberError, Result};
pub use geometry::Point3;
pub use measurements::{
    FiberStats, ScalarStats, default_measurement_clamps, fiber_stats, scalar_stats,
};
pub use rasterize::{RasterizeParameters, RasterizeReport, rasterize};
pub use resample::resample;
pub use roi_cut::{CutParameters, cut};
pub use transform::AffineTransform;
pub use voxel_grid::{PaintOutcome, VoxelGrid};
