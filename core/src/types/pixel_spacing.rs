use crate::error::{ConversionError, Result};
use crate::metadata::tags::PIXEL_SPACING;
use crate::metadata::MetadataAccessor;

/// Pixel spacing in millimeters (row, column)
///
/// `row` is the distance between adjacent rows, `col` the distance between
/// adjacent columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSpacing {
    pub row: f64,
    pub col: f64,
}

impl PixelSpacing {
    /// Creates a new PixelSpacing
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// Reads PixelSpacing (0028,0030) of an instance or functional group item
    pub fn from_accessor<A: MetadataAccessor + ?Sized>(dcm: &A) -> Result<Self> {
        let values = dcm.get_array(PIXEL_SPACING, 2)?;
        if values.iter().any(|v| *v <= 0.0 || !v.is_finite()) {
            return Err(ConversionError::InvalidGeometry(format!(
                "pixel spacing {:?}",
                values
            )));
        }
        Ok(PixelSpacing::new(values[0], values[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::put_strs;
    use dicom_core::VR;
    use dicom_object::InMemDicomObject;

    #[test]
    fn test_from_accessor() {
        let mut dcm = InMemDicomObject::new_empty();
        assert!(matches!(
            PixelSpacing::from_accessor(&dcm),
            Err(ConversionError::AttributeMissing(_))
        ));

        put_strs(&mut dcm, PIXEL_SPACING, VR::DS, &["0.5", "0.25"]);
        let ps = PixelSpacing::from_accessor(&dcm).unwrap();
        assert_eq!(ps, PixelSpacing::new(0.5, 0.25));
    }

    #[test]
    fn test_from_accessor_rejects_zero() {
        let mut dcm = InMemDicomObject::new_empty();
        put_strs(&mut dcm, PIXEL_SPACING, VR::DS, &["0", "1"]);
        assert!(matches!(
            PixelSpacing::from_accessor(&dcm),
            Err(ConversionError::InvalidGeometry(_))
        ));
    }
}
