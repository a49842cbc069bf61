use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::downsample::DownsampleParameters;
use crate::error::Result;
use crate::measurements::default_measurement_clamps;
use crate::rasterize::RasterizeParameters;
use crate::roi_cut::CutParameters;

/// Parameters of every bundle operation. Missing JSON fields fall back to
/// their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub cut: CutParameters,
    pub downsample: DownsampleParameters,
    pub rasterize: RasterizeParameters,
    /// Name fragment -> inclusive `[min, max]` range for scalar statistics.
    /// Defaults to the tensor scalar ranges; a value given in JSON replaces
    /// the whole map.
    pub measurement_clamps: BTreeMap<String, (f64, f64)>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cut: CutParameters::default(),
            downsample: DownsampleParameters::default(),
            rasterize: RasterizeParameters::default(),
            measurement_clamps: default_measurement_clamps(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.cut.validate()?;
        self.downsample.validate()?;
        self.rasterize.validate()
    }
}
