//! Persisting conversion results: file naming, NIfTI volumes and
//! diffusion sidecars

pub mod naming;
pub mod nifti;
pub mod sidecar;

use crate::error::Result;
use crate::types::VolumeResult;
use std::path::{Path, PathBuf};

pub use naming::{base_filename, slugify};
pub use self::nifti::NiftiWriter;
pub use sidecar::{write_bval, write_bvec, write_sidecars};

/// Sink for assembled volumes
pub trait VolumeWriter {
    /// Writes `volume` into `dir` under `base` and returns the file path
    fn write_volume(&self, volume: &VolumeResult, dir: &Path, base: &str) -> Result<PathBuf>;
}

/// Files produced for one series
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct OutputFiles {
    pub volume: PathBuf,
    pub bval: Option<PathBuf>,
    pub bvec: Option<PathBuf>,
}

/// Writes the volume and, when it carries a non-empty diffusion table,
/// its bval/bvec sidecars
pub fn write_result<W: VolumeWriter + ?Sized>(
    writer: &W,
    volume: &VolumeResult,
    dir: &Path,
    base: &str,
) -> Result<OutputFiles> {
    let path = writer.write_volume(volume, dir, base)?;

    let (bval, bvec) = match volume.diffusion.as_ref() {
        Some(table) if volume.is_diffusion_weighted() => {
            let (bval, bvec) = write_sidecars(table, dir, base)?;
            (Some(bval), Some(bvec))
        }
        _ => (None, None),
    };

    Ok(OutputFiles {
        volume: path,
        bval,
        bvec,
    })
}
