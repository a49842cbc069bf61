use fiber_bundle::{
    AffineTransform, AttributeArray, CutParameters, DownsampleParameters, FiberError, FiberOrder,
    PolylineBundle, RasterizeParameters, VoxelGrid, cut, downsample, downsample_with_rng,
    estimate_step_size, rasterize, resample,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Four streamlines of five points, consecutive points 3 units apart on
/// every axis.
fn staircase_bundle() -> PolylineBundle {
    PolylineBundle::from_streamlines((0..4).map(|n| {
        let offset = n as f64 * 10.0;
        (0..5).map(move |p| {
            let step = p as f64 * 3.0;
            [offset + step, step, step]
        })
    }))
}

fn keep_everything(target_step_size: f64) -> DownsampleParameters {
    DownsampleParameters {
        target_step_size,
        fiber_keep_percent: 100.0,
        min_points_per_fiber: 1,
        min_fiber_length: 0.0,
        max_fiber_length: f64::INFINITY,
        fiber_order: FiberOrder::Random,
    }
}

/// 20 x 20 x 20 volume at 1 mm with label 1 on columns 4..7 and label 2 on
/// columns 13..16.
fn slab_grid() -> VoxelGrid {
    let world_to_index = AffineTransform::from_spacing_and_origin((1.0, 1.0, 1.0), [0.0; 3])
        .expect("non-singular");
    let mut grid = VoxelGrid::zeros((20, 20, 20), world_to_index);
    for ((_, _, i), label) in grid.labels_mut().indexed_iter_mut() {
        match i {
            4..7 => *label = 1,
            13..16 => *label = 2,
            _ => {}
        }
    }
    grid
}

#[test]
fn resampling_example_yields_five_points() {
    let sampled = resample(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]], 0.5).unwrap();
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
fn resampling_preserves_endpoints_for_many_spacings() {
    let points = [
        [0.3, -1.0, 2.0],
        [1.7, 0.4, 2.2],
        [1.9, 3.3, 0.1],
        [-2.0, 3.0, 0.0],
    ];
    for spacing in [0.01, 0.1, 0.33, 1.0, 2.5, 100.0] {
        let sampled = resample(&points, spacing).unwrap();
        assert_eq!(sampled.first(), points.first());
        assert_eq!(sampled.last(), points.last());
        assert!(sampled.len() >= points.len());
    }
}

#[test]
fn downsampling_with_small_step_keeps_everything() {
    let bundle = staircase_bundle();
    let (out, step) = downsample(&bundle, &keep_everything(1.0)).unwrap();

    assert!((step - 27.0_f64.sqrt()).abs() < 1e-9);
    assert_eq!(out.num_streamlines(), 4);
    assert_eq!(out.num_points(), 20);

    let mut expected: Vec<_> = (0..4).map(|l| bundle.streamline_points(l).unwrap()).collect();
    let mut actual: Vec<_> = (0..4).map(|l| out.streamline_points(l).unwrap()).collect();
    expected.sort_by(|a, b| a[0][0].total_cmp(&b[0][0]));
    actual.sort_by(|a, b| a[0][0].total_cmp(&b[0][0]));
    assert_eq!(actual, expected);
}

#[test]
fn downsampling_with_large_step_reduces_points_and_keeps_endpoints() {
    let bundle = staircase_bundle();
    let (out, _) = downsample(&bundle, &keep_everything(20.0)).unwrap();

    assert_eq!(out.num_streamlines(), 4);
    assert!(out.num_points() < bundle.num_points());

    let endpoints = |b: &PolylineBundle, line: usize| {
        let points = b.streamline_points(line).unwrap();
        (points[0], points[points.len() - 1])
    };
    let mut expected: Vec<_> = (0..4).map(|l| endpoints(&bundle, l)).collect();
    let mut actual: Vec<_> = (0..4).map(|l| endpoints(&out, l)).collect();
    expected.sort_by(|a, b| a.0[0].total_cmp(&b.0[0]));
    actual.sort_by(|a, b| a.0[0].total_cmp(&b.0[0]));
    assert_eq!(actual, expected);
    for line in 0..4 {
        let count = out.streamline_points(line).unwrap().len();
        assert!((2..=5).contains(&count));
    }
}

#[test]
fn downsampling_respects_keep_count_for_any_permutation() {
    let bundle = PolylineBundle::from_streamlines((0..30).map(|n| {
        let length = 2 + n % 7;
        (0..length).map(move |p| [p as f64, n as f64, 0.0])
    }));
    let params = DownsampleParameters {
        target_step_size: 2.0,
        fiber_keep_percent: 40.0,
        min_points_per_fiber: 2,
        min_fiber_length: 0.0,
        max_fiber_length: f64::INFINITY,
        fiber_order: FiberOrder::Random,
    };
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (out, _) = downsample_with_rng(&bundle, &params, &mut rng).unwrap();
        assert_eq!(out.num_streamlines(), 12);
        for line in 0..out.num_streamlines() {
            let points = out.streamline_points(line).unwrap();
            let source_row = points[0][1] as usize;
            let source = bundle.streamline_points(source_row).unwrap();
            assert_eq!(points.first(), source.first());
            assert_eq!(points.last(), source.last());
            assert!(points.len() >= 2 && points.len() <= source.len());
        }
    }
}

#[test]
fn cut_output_is_contiguous_subsequence_of_input() {
    let mut bundle = PolylineBundle::from_streamlines([
        (0..20).map(|x| [x as f64, 5.0, 5.0]).collect::<Vec<_>>(),
        (0..20).map(|x| [19.0 - x as f64, 9.0, 3.0]).collect(),
        (8..12).map(|x| [x as f64, 2.0, 2.0]).collect(),
        (0..10).map(|x| [x as f64, 1.0, 1.0]).collect(),
    ]);
    let values: Vec<f32> = (0..bundle.num_points()).map(|v| v as f32).collect();
    bundle
        .point_attributes
        .insert("index".to_string(), AttributeArray::float(1, values));

    let params = CutParameters {
        label_a: 1,
        label_b: 2,
        sampling_distance: 0.25,
    };
    let out = cut(&bundle, &slab_grid(), &params).unwrap();

    // the short middle line and the line ending at x = 9 never reach both slabs
    assert_eq!(out.num_streamlines(), 2);
    // first contact at x = 3.5 is equally close to 3 and 4, the earlier wins
    let first = out.streamline_points(0).unwrap();
    let xs: Vec<f64> = first.iter().map(|p| p[0]).collect();
    assert_eq!(xs, (3..=15).map(f64::from).collect::<Vec<_>>());
    let reversed = out.streamline_points(1).unwrap();
    assert_eq!(reversed.first(), Some(&[15.0, 9.0, 3.0]));
    assert_eq!(reversed.last(), Some(&[4.0, 9.0, 3.0]));

    // attribute values identify the original points and must be consecutive
    let index = &out.point_attributes["index"];
    for ids in &out.streamlines {
        let originals: Vec<f64> = ids.iter().map(|&id| index.scalar(id).unwrap()).collect();
        for pair in originals.windows(2) {
            assert_eq!(pair[1], pair[0] + 1.0);
        }
    }
    for point in &out.points {
        assert!(bundle.points.contains(point));
    }
}

#[test]
fn cut_of_empty_bundle_is_empty() {
    let out = cut(&PolylineBundle::default(), &slab_grid(), &CutParameters::default()).unwrap();
    assert!(out.is_empty());
}

#[test]
fn malformed_bundles_fail_fast() {
    let mut bundle = staircase_bundle();
    bundle.streamlines[2][1] = 500;
    assert!(matches!(
        cut(&bundle, &slab_grid(), &CutParameters::default()),
        Err(FiberError::InvalidBundle(_))
    ));
    assert!(matches!(
        downsample(&bundle, &keep_everything(1.0)),
        Err(FiberError::InvalidBundle(_))
    ));
    let mut grid = slab_grid();
    assert!(matches!(
        rasterize(&bundle, &mut grid, &RasterizeParameters::default()),
        Err(FiberError::InvalidBundle(_))
    ));
    assert!(matches!(estimate_step_size(&bundle), Err(FiberError::InvalidBundle(_))));
}

#[test]
fn non_finite_streamlines_are_rejected_instead_of_sampled() {
    let nan = PolylineBundle::from_streamlines([vec![[0.0, 1.0, 1.0], [f64::NAN, 1.0, 1.0]]]);
    let infinite =
        PolylineBundle::from_streamlines([vec![[0.0, 1.0, 1.0], [f64::INFINITY, 1.0, 1.0]]]);
    // finite coordinates whose difference overflows
    let overflowing =
        PolylineBundle::from_streamlines([vec![[-1e308, 1.0, 1.0], [1e308, 1.0, 1.0]]]);

    for bundle in [&nan, &infinite, &overflowing] {
        assert!(matches!(
            cut(bundle, &slab_grid(), &CutParameters::default()),
            Err(FiberError::InvalidBundle(_))
        ));
        let mut grid = slab_grid();
        assert!(matches!(
            rasterize(bundle, &mut grid, &RasterizeParameters::default()),
            Err(FiberError::InvalidBundle(_))
        ));
        assert_eq!(grid.labels(), slab_grid().labels());
    }
}

#[test]
fn rasterizing_cut_bundle_is_idempotent() {
    let bundle = PolylineBundle::from_streamlines([
        (0..20).map(|x| [x as f64, 5.0, 5.0]).collect::<Vec<_>>(),
        vec![[0.0, 0.0, 0.0], [19.0, 19.0, 19.0]],
    ]);
    let trimmed = cut(&bundle, &slab_grid(), &CutParameters::default()).unwrap();
    let params = RasterizeParameters {
        label_value: 9,
        sampling_distance: 0.2,
        batch_size: 1,
    };

    let empty = || VoxelGrid::zeros((20, 20, 20), AffineTransform::identity());
    let mut once = empty();
    rasterize(&trimmed, &mut once, &params).unwrap();
    let mut twice = empty();
    rasterize(&trimmed, &mut twice, &params).unwrap();
    rasterize(&trimmed, &mut twice, &params).unwrap();

    assert_eq!(once.labels(), twice.labels());
    assert!(once.count_label(9) > 0);
    assert_eq!(once.labels()[[5, 5, 10]], 9);
}

#[test]
fn cutter_and_rasterizer_treat_far_points_differently() {
    // same streamline: rounds past the grid on x
    let bundle = PolylineBundle::from_streamlines([vec![[0.0, 1.0, 1.0], [25.0, 1.0, 1.0]]]);

    assert!(matches!(
        cut(&bundle, &slab_grid(), &CutParameters::default()),
        Err(FiberError::IndexOutOfGrid { .. })
    ));

    let mut grid = VoxelGrid::zeros((20, 20, 20), AffineTransform::identity());
    let report = rasterize(&bundle, &mut grid, &RasterizeParameters::default()).unwrap();
    assert!(report.skipped_out_of_bounds > 0);
    assert_eq!(grid.count_label(1), 20);
}
