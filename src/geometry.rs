//! Point helpers shared by the bundle algorithms.

use std::cmp::Ordering;

/// A world space position.
pub type Point3 = [f64; 3];

#[inline]
pub fn distance_squared(a: &Point3, b: &Point3) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx.mul_add(dx, dy.mul_add(dy, dz * dz))
}

#[inline]
pub fn distance(a: &Point3, b: &Point3) -> f64 {
    distance_squared(a, b).sqrt()
}

/// Point at parameter `t` on the segment `a -> b`.
#[inline]
pub fn lerp(a: &Point3, b: &Point3, t: f64) -> Point3 {
    [
        (b[0] - a[0]).mul_add(t, a[0]),
        (b[1] - a[1]).mul_add(t, a[1]),
        (b[2] - a[2]).mul_add(t, a[2]),
    ]
}

/// Arc length of a polyline.
pub fn polyline_length(points: &[Point3]) -> f64 {
    points.windows(2).map(|w| distance(&w[0], &w[1])).sum()
}

/// Index of the point closest to `target`. Ties resolve to the lowest index.
pub fn nearest_index(points: &[Point3], target: &Point3) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(index, point)| (index, distance_squared(point, target)))
        .fold(None, |best: Option<(usize, f64)>, (index, d)| match best {
            Some((_, best_d)) if d.partial_cmp(&best_d) != Some(Ordering::Less) => best,
            _ => Some((index, d)),
        })
        .map(|(index, _)| index)
}
