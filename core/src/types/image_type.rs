use crate::metadata::tags::{get_string_value, IMAGE_TYPE};
use crate::metadata::MetadataAccessor;

/// DICOM ImageType field decomposed into its components
///
/// - `pixels`: first value ("ORIGINAL", "DERIVED")
/// - `exam`: second value ("PRIMARY", "SECONDARY")
/// - `flavor`: third value, e.g. "LOCALIZER" or a vendor scan label
/// - `extras`: anything after the third value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ImageType {
    pub pixels: String,
    pub exam: String,
    pub flavor: Option<String>,
    pub extras: Option<Vec<String>>,
}

impl ImageType {
    /// Creates a new ImageType
    pub fn new(
        pixels: String,
        exam: String,
        flavor: Option<String>,
        extras: Option<Vec<String>>,
    ) -> Self {
        Self {
            pixels,
            exam,
            flavor,
            extras,
        }
    }

    /// Parses the backslash separated rendering of the field
    pub fn parse(s: &str) -> Self {
        let values: Vec<String> = s.split('\\').map(|v| v.trim().to_uppercase()).collect();

        let pixels = values.first().cloned().unwrap_or_default();
        let exam = values.get(1).cloned().unwrap_or_default();
        let flavor = values.get(2).cloned();
        let extras = if values.len() > 3 {
            Some(values[3..].to_vec())
        } else {
            None
        };

        Self::new(pixels, exam, flavor, extras)
    }

    /// Reads the ImageType of an instance, empty when absent
    pub fn from_accessor<A: MetadataAccessor + ?Sized>(dcm: &A) -> Self {
        get_string_value(dcm, IMAGE_TYPE)
            .map(|s| Self::parse(&s))
            .unwrap_or_else(|| Self::new(String::new(), String::new(), None, None))
    }

    /// Checks if the image type contains a specific value
    pub fn contains(&self, val: &str) -> bool {
        self.pixels == val
            || self.exam == val
            || self.flavor.as_ref().is_some_and(|f| f == val)
            || self
                .extras
                .as_ref()
                .is_some_and(|e| e.iter().any(|x| x == val))
    }

    /// Survey/scout images that are not part of the volume
    pub fn is_localizer(&self) -> bool {
        self.contains("LOCALIZER")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::put_strs;
    use dicom_core::VR;
    use dicom_object::InMemDicomObject;

    #[test]
    fn test_parse_basic() {
        let img_type = ImageType::parse("ORIGINAL\\PRIMARY");
        assert_eq!(img_type.pixels, "ORIGINAL");
        assert_eq!(img_type.exam, "PRIMARY");
        assert_eq!(img_type.flavor, None);
        assert_eq!(img_type.extras, None);
    }

    #[test]
    fn test_parse_with_extras() {
        let img_type = ImageType::parse("DERIVED\\PRIMARY\\DIFFUSION\\ADC\\");
        assert_eq!(img_type.flavor.as_deref(), Some("DIFFUSION"));
        assert_eq!(
            img_type.extras,
            Some(vec!["ADC".to_string(), String::new()])
        );
        assert!(img_type.contains("ADC"));
        assert!(!img_type.is_localizer());
    }

    #[test]
    fn test_localizer() {
        let img_type = ImageType::parse("ORIGINAL\\PRIMARY\\LOCALIZER");
        assert!(img_type.is_localizer());
    }

    #[test]
    fn test_from_accessor() {
        let mut dcm = InMemDicomObject::new_empty();
        let empty = ImageType::from_accessor(&dcm);
        assert_eq!(empty.pixels, "");
        assert!(!empty.is_localizer());

        put_strs(&mut dcm, IMAGE_TYPE, VR::CS, &["ORIGINAL", "PRIMARY", "M_SE"]);
        let img_type = ImageType::from_accessor(&dcm);
        assert_eq!(img_type.flavor.as_deref(), Some("M_SE"));
        assert!(img_type.contains("M_SE"));
    }
}
