use crate::geometry::Point3;

/// Row-major 4x4 affine matrix acting on homogeneous column vectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineTransform {
    pub matrix: [[f64; 4]; 4],
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    pub const fn new(matrix: [[f64; 4]; 4]) -> Self {
        Self { matrix }
    }

    pub const fn identity() -> Self {
        Self::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// World to index mapping of an axis aligned volume whose voxel `(0, 0, 0)`
    /// sits at `origin` and whose voxels measure `spacing` (x, y, z).
    pub fn from_spacing_and_origin(spacing: (f64, f64, f64), origin: Point3) -> Option<Self> {
        let (sx, sy, sz) = spacing;
        Self::new([
            [sx, 0.0, 0.0, origin[0]],
            [0.0, sy, 0.0, origin[1]],
            [0.0, 0.0, sz, origin[2]],
            [0.0, 0.0, 0.0, 1.0],
        ])
        .inverse()
    }

    /// Applies the transform to `(x, y, z, 1)` and drops the homogeneous
    /// component without dividing by it.
    #[inline]
    pub fn multiply_point(&self, point: &Point3) -> Point3 {
        let m = &self.matrix;
        let row = |r: usize| {
            m[r][0].mul_add(
                point[0],
                m[r][1].mul_add(point[1], m[r][2].mul_add(point[2], m[r][3])),
            )
        };
        [row(0), row(1), row(2)]
    }

    /// Inverse of the affine part. `None` when the linear part is singular.
    pub fn inverse(&self) -> Option<Self> {
        let m = &self.matrix;
        let cofactor = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };

        let c00 = cofactor(1, 2, 1, 2);
        let c01 = -cofactor(1, 2, 0, 2);
        let c02 = cofactor(1, 2, 0, 1);
        let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;

        let linear = [
            [
                c00 * inv_det,
                -cofactor(0, 2, 1, 2) * inv_det,
                cofactor(0, 1, 1, 2) * inv_det,
            ],
            [
                c01 * inv_det,
                cofactor(0, 2, 0, 2) * inv_det,
                -cofactor(0, 1, 0, 2) * inv_det,
            ],
            [
                c02 * inv_det,
                -cofactor(0, 2, 0, 1) * inv_det,
                cofactor(0, 1, 0, 1) * inv_det,
            ],
        ];

        let mut inverse = [[0.0; 4]; 4];
        for r in 0..3 {
            inverse[r][..3].copy_from_slice(&linear[r]);
            inverse[r][3] = -(linear[r][0] * m[0][3] + linear[r][1] * m[1][3] + linear[r][2] * m[2][3]);
        }
        inverse[3][3] = 1.0;

        Some(Self::new(inverse))
    }
}
