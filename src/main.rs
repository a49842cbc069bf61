use std::{env, fs};

use fiber_bundle::{
    AffineTransform, PipelineConfig, PolylineBundle, Result, VoxelGrid, cut, downsample,
    fiber_stats, rasterize, scalar_stats,
};

/// Twenty gently curving streamlines along x, 1 mm apart.
fn synthetic_bundle() -> PolylineBundle {
    PolylineBundle::from_streamlines((0..20).map(|n| {
        let offset = n as f64 * 0.25;
        (0..=60).map(move |p| {
            let x = p as f64 * 0.5;
            [x, 8.0 + offset + (x / 6.0).sin(), 8.0 + offset * 0.5]
        })
    }))
}

/// 1 mm label volume around the bundle with label 1 over the first quarter
/// of its x extent and label 2 over the last quarter.
fn roi_grid(bundle: &PolylineBundle, label_a: i32, label_b: i32) -> Option<VoxelGrid> {
    let mut upper = [0.0_f64; 3];
    for point in &bundle.points {
        for axis in 0..3 {
            upper[axis] = upper[axis].max(point[axis]);
        }
    }
    let world_to_index = AffineTransform::from_spacing_and_origin((1.0, 1.0, 1.0), [0.0; 3])?;
    let [ni, nj, nk] = upper.map(|extent| extent.ceil() as usize + 2);
    let mut grid = VoxelGrid::zeros((nk, nj, ni), world_to_index).with_space(bundle.space);

    let quarter = ni / 4;
    for ((_, _, i), label) in grid.labels_mut().indexed_iter_mut() {
        if i < quarter {
            *label = label_a;
        } else if i >= ni - quarter {
            *label = label_b;
        }
    }
    Some(grid)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let bundle = match args.next() {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => synthetic_bundle(),
    };
    let config = match args.next() {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };

    log::info!("Input: {:?}", fiber_stats(&bundle)?);

    let Some(grid) = roi_grid(&bundle, config.cut.label_a, config.cut.label_b) else {
        log::error!("Could not build a label volume around the bundle");
        return Ok(());
    };

    let trimmed = cut(&bundle, &grid, &config.cut)?;
    log::info!("After ROI cut: {:?}", fiber_stats(&trimmed)?);

    let (downsampled, input_step) = downsample(&trimmed, &config.downsample)?;
    log::info!(
        "After downsampling (input step {input_step:.3}): {:?}",
        fiber_stats(&downsampled)?
    );

    let mut tract_map = VoxelGrid::zeros(grid.dim(), grid.world_to_index).with_space(grid.space);
    let report = rasterize(&trimmed, &mut tract_map, &config.rasterize)?;
    log::info!(
        "Label {} covers {} voxels ({report:?})",
        config.rasterize.label_value,
        tract_map.count_label(config.rasterize.label_value)
    );

    for (name, stats) in scalar_stats(&trimmed, &config.measurement_clamps)? {
        log::info!("{name}: {stats:?}");
    }
    Ok(())
}
