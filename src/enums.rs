use serde::{Deserialize, Serialize};

/// Anatomical world coordinate convention of a bundle or a label volume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    #[default]
    Ras,
    Lps,
}

/// Order in which the downsampler visits streamlines when applying the
/// fiber percentage cutoff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiberOrder {
    /// Fresh random permutation on every run.
    #[default]
    Random,
    /// Reproducible permutation.
    Seeded(u64),
}
