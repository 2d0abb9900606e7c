//! NIfTI-1 single-file writer
//!
//! Samples are stored as float32 with identity scaling, the affine goes
//! into both the sform and the qform (code 1, scanner anatomical) and
//! spatial units are millimetres.

use super::VolumeWriter;
use crate::error::{ConversionError, Result};
use crate::types::VolumeResult;
use ::nifti::writer::WriterOptions;
use ::nifti::NiftiHeader;
use log::debug;
use nalgebra::Matrix4;
use std::path::{Path, PathBuf};

const NIFTI_UNITS_MM: u8 = 2;
const NIFTI_XFORM_SCANNER_ANAT: i16 = 1;
const DESCRIPTION: &[u8] = b"niftify";

/// Writes volumes as `<base>.nii` or `<base>.nii.gz`
#[derive(Debug, Clone, Copy)]
pub struct NiftiWriter {
    compression: bool,
}

impl NiftiWriter {
    pub fn new(compression: bool) -> Self {
        Self { compression }
    }

    /// File extension; the `.gz` suffix is what makes the file compressed
    pub fn extension(&self) -> &'static str {
        if self.compression {
            "nii.gz"
        } else {
            "nii"
        }
    }
}

impl Default for NiftiWriter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl VolumeWriter for NiftiWriter {
    fn write_volume(&self, volume: &VolumeResult, dir: &Path, base: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{}.{}", base, self.extension()));
        let header = build_header(volume)?;

        WriterOptions::new(&path)
            .reference_header(&header)
            .write_nifti(&volume.data)?;

        debug!("Wrote {:?} to {}", volume.shape(), path.display());
        Ok(path)
    }
}

/// `?TR:<ms> TE:<ms>`, clipped to the 18-byte db_name field
fn timing_label(volume: &VolumeResult) -> Option<String> {
    let tr = volume.repetition_time?;
    let te = volume.echo_time?;
    let mut label = format!("?TR:{:.3} TE:{:.0}", tr, te);
    label.truncate(18);
    Some(label)
}

/// Reference header of a volume
///
/// Dimensions, datatype and magic are filled in by the writer from the
/// sample array; this sets geometry, units, timing and labels.
pub fn build_header(volume: &VolumeResult) -> Result<NiftiHeader> {
    let shape = volume.shape();
    if shape.is_empty() || shape.len() > 7 {
        return Err(ConversionError::InvalidGeometry(format!(
            "cannot store {} dimensions",
            shape.len()
        )));
    }
    if let Some(size) = shape.iter().find(|s| i16::try_from(**s).is_err()) {
        return Err(ConversionError::InvalidGeometry(format!(
            "axis of {} samples is too long",
            size
        )));
    }

    let mut header = NiftiHeader::default();

    let voxel = volume.voxel_size();
    header.pixdim = [1.0; 8];
    header.pixdim[1] = voxel[0] as f32;
    header.pixdim[2] = voxel[1] as f32;
    header.pixdim[3] = voxel[2] as f32;
    if let Some(tr) = volume.repetition_time {
        header.pixdim[4] = (tr / 1000.0) as f32;
    }

    let affine = Matrix4::from_fn(|r, c| volume.affine[r][c]);
    header.set_affine(&affine);
    header.qform_code = NIFTI_XFORM_SCANNER_ANAT;
    header.sform_code = NIFTI_XFORM_SCANNER_ANAT;
    // qfac: -1 for a left-handed voxel grid
    let rotation = affine.fixed_view::<3, 3>(0, 0).determinant();
    header.pixdim[0] = if rotation < 0.0 { -1.0 } else { 1.0 };

    header.scl_slope = 1.0;
    header.scl_inter = 0.0;
    header.xyzt_units = NIFTI_UNITS_MM;

    let mut descrip = vec![0u8; 80];
    descrip[..DESCRIPTION.len()].copy_from_slice(DESCRIPTION);
    header.descrip = descrip;

    if let Some(label) = timing_label(volume) {
        header.db_name = [0; 18];
        header.db_name[..label.len()].copy_from_slice(label.as_bytes());
    }

    Ok(header)
}
