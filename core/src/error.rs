use dicom_core::Tag;
use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Error types for series conversion
///
/// Every variant is scoped to a single series: the batch driver records it
/// against the series identifier and moves on to the next series.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// No instances left after filtering
    #[error("Series is empty (too few slices or only localizers)")]
    EmptySeries,

    /// Input encoding the converter refuses to handle
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Timepoints do not line up, some instances are missing
    #[error("Missing instances: {0}")]
    MissingInstances(String),

    /// Tag not present in the data set
    #[error("Attribute missing: {0}")]
    AttributeMissing(Tag),

    /// Tag present but its value is not a number
    #[error("Value of {tag} is not numeric: {value:?}")]
    NumericParseFailure { tag: Tag, value: String },

    /// Positions or orientations do not describe a volume
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Slices with different in-plane sizes
    #[error("Inconsistent image dimensions: {0}")]
    InconsistentDimensions(String),

    /// Pixel data could not be decoded
    #[error("Pixel data error: {0}")]
    PixelData(String),

    /// NIfTI writing error
    #[error("NIfTI error: {0}")]
    Nifti(String),

    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConversionError {
    /// Short machine-friendly reason used in batch reports
    pub fn reason_code(&self) -> &'static str {
        match self {
            ConversionError::EmptySeries => "TOO_FEW_SLICES/LOCALIZER",
            ConversionError::UnsupportedEncoding(_) => "IMPLICIT_VR_ENHANCED_DICOM",
            ConversionError::MissingInstances(_) => "MISSING_DICOM_FILES",
            ConversionError::AttributeMissing(_) => "ATTRIBUTE_MISSING",
            ConversionError::NumericParseFailure { .. } => "NUMERIC_PARSE_FAILURE",
            ConversionError::InvalidGeometry(_) => "NOT_A_VOLUME",
            ConversionError::InconsistentDimensions(_) => "IMAGE_DIMENSIONS_INCONSISTENT",
            ConversionError::PixelData(_) => "PIXEL_DATA",
            ConversionError::Nifti(_) => "NIFTI_WRITE",
            ConversionError::DicomError(_) => "DICOM_READ",
            ConversionError::IoError(_) => "IO",
        }
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for ConversionError {
    fn from(e: dicom_object::ReadError) -> Self {
        ConversionError::DicomError(format!("{}", e))
    }
}

impl From<dicom_pixeldata::Error> for ConversionError {
    fn from(e: dicom_pixeldata::Error) -> Self {
        ConversionError::PixelData(format!("{}", e))
    }
}

impl From<nifti::NiftiError> for ConversionError {
    fn from(e: nifti::NiftiError) -> Self {
        ConversionError::Nifti(format!("{}", e))
    }
}
