use super::{DiffusionTable, SequenceType};
use ndarray::ArrayD;

/// Voxel index → patient (RAS) millimetre transform, row-major
pub type Affine = [[f64; 4]; 4];

/// Assembled volume of one series
///
/// `data` is indexed `(x = column, y = row, z = slice[, t])`.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeResult {
    pub data: ArrayD<f32>,
    pub affine: Affine,
    /// Largest deviation of a slice distance from the mean slice step (mm)
    pub max_slice_increment: f64,
    pub sequence_type: SequenceType,
    /// Repetition time in milliseconds
    pub repetition_time: Option<f64>,
    /// Echo time in milliseconds
    pub echo_time: Option<f64>,
    pub diffusion: Option<DiffusionTable>,
}

impl VolumeResult {
    /// Number of volumes along the time axis (1 for a 3D result)
    pub fn volume_count(&self) -> usize {
        if self.data.ndim() > 3 {
            self.data.shape()[3]
        } else {
            1
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Voxel size (mm) along each spatial axis, from the affine columns
    pub fn voxel_size(&self) -> [f64; 3] {
        let mut size = [0.0; 3];
        for (axis, value) in size.iter_mut().enumerate() {
            *value = (0..3)
                .map(|r| self.affine[r][axis] * self.affine[r][axis])
                .sum::<f64>()
                .sqrt();
        }
        size
    }

    /// Whether the result carries a table worth writing as sidecars
    pub fn is_diffusion_weighted(&self) -> bool {
        self.diffusion
            .as_ref()
            .is_some_and(|t| !t.is_empty() && !t.is_all_zero())
    }
}
