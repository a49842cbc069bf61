use crate::enums::CoordinateSystem;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FiberError>;

#[derive(Debug, Error)]
pub enum FiberError {
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Bundle is in {bundle:?} space but the label volume is in {grid:?} space")]
    CoordinateSystemMismatch {
        bundle: CoordinateSystem,
        grid: CoordinateSystem,
    },

    #[error("Voxel index {index:?} is outside the label volume of dimensions {dim:?}")]
    IndexOutOfGrid {
        index: [i64; 3],
        dim: (usize, usize, usize),
    },

    #[error("Attribute mismatch: {0}")]
    AttributeMismatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FiberError {
    pub(crate) fn invalid_parameter(name: &'static str, value: impl Into<f64>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
        }
    }
}
