//! Pixel payload decoding and rescaling

use crate::error::{ConversionError, Result};
use crate::metadata::tags::{
    first_item, get_float_value, PIXEL_VALUE_TRANSFORMATION_SEQUENCE, RESCALE_INTERCEPT,
    RESCALE_SLOPE,
};
use crate::metadata::MetadataAccessor;
use dicom_object::{FileDicomObject, InMemDicomObject};
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};
use ndarray::{Array3, ArrayBase, ArrayView2, ArrayViewMut2, DataMut, Dimension};

/// Turns one instance into its raw sample frames
///
/// Returned arrays are shaped `(frames, rows, columns)` and hold stored
/// values; rescaling is left to the caller.
pub trait FrameDecoder<A> {
    fn decode_frames(&self, instance: &A) -> Result<Array3<f32>>;
}

/// Decoder for native (uncompressed) pixel data read from files
#[derive(Debug, Default, Clone, Copy)]
pub struct DicomFrameDecoder;

impl FrameDecoder<FileDicomObject<InMemDicomObject>> for DicomFrameDecoder {
    fn decode_frames(&self, instance: &FileDicomObject<InMemDicomObject>) -> Result<Array3<f32>> {
        let decoded = instance.decode_pixel_data()?;
        if decoded.samples_per_pixel() != 1 {
            return Err(ConversionError::PixelData(format!(
                "{} samples per pixel, only monochrome is supported",
                decoded.samples_per_pixel()
            )));
        }

        let frames = decoded.number_of_frames() as usize;
        let rows = decoded.rows() as usize;
        let cols = decoded.columns() as usize;

        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        let values: Vec<f32> = decoded.to_vec_with_options(&options)?;

        Array3::from_shape_vec((frames, rows, cols), values).map_err(|e| {
            ConversionError::InconsistentDimensions(format!(
                "{} frames of {}x{}: {}",
                frames, rows, cols, e
            ))
        })
    }
}

/// Linear modality rescale: `stored * slope + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub slope: f64,
    pub intercept: f64,
}

impl Default for Rescale {
    fn default() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }
}

impl Rescale {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// RescaleSlope (0028,1053) / RescaleIntercept (0028,1052), identity
    /// when absent
    pub fn from_accessor<A: MetadataAccessor + ?Sized>(dcm: &A) -> Self {
        Self {
            slope: get_float_value(dcm, RESCALE_SLOPE).unwrap_or(1.0),
            intercept: get_float_value(dcm, RESCALE_INTERCEPT).unwrap_or(0.0),
        }
    }

    /// Rescale of one multiframe frame from its PixelValueTransformationSequence
    pub fn from_frame<A: MetadataAccessor + ?Sized>(frame: &A) -> Option<Self> {
        first_item(frame, PIXEL_VALUE_TRANSFORMATION_SEQUENCE).map(Self::from_accessor)
    }

    pub fn is_identity(&self) -> bool {
        self.slope == 1.0 && self.intercept == 0.0
    }

    /// Applies the rescale in place
    pub fn apply<S, D>(&self, data: &mut ArrayBase<S, D>)
    where
        S: DataMut<Elem = f32>,
        D: Dimension,
    {
        if self.is_identity() {
            return;
        }
        let (slope, intercept) = (self.slope as f32, self.intercept as f32);
        data.mapv_inplace(|v| v * slope + intercept);
    }

    /// Writes a rescaled, transposed `(rows, cols)` frame into a `(cols, rows)` slot
    pub fn write_transposed(&self, frame: ArrayView2<f32>, mut slot: ArrayViewMut2<f32>) {
        slot.assign(&frame.t());
        self.apply(&mut slot);
    }
}
