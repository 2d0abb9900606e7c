use crate::error::{ConversionError, Result};
use crate::grouping::group_instances;
use crate::metadata::tags::{PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE, PHILIPS_SLICE_NUMBER_MR};
use crate::metadata::MetadataAccessor;
use crate::types::{ConversionSettings, Dimensionality, SequenceType, SeriesLayout};
use crate::volume::geometry::multiframe_stack_count;
use dicom_dictionary_std::uids::IMPLICIT_VR_LITTLE_ENDIAN;
use log::{debug, info};

/// Decides the structural category of a series
///
/// # Example
///
/// ```
/// use niftify_core::{ConversionSettings, SeriesClassifier};
/// use dicom_object::InMemDicomObject;
///
/// let classifier = SeriesClassifier::new(&ConversionSettings::default());
/// let empty: Vec<&InMemDicomObject> = Vec::new();
/// assert!(classifier.classify(&empty).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SeriesClassifier {
    validate_multiframe_implicit: bool,
}

impl SeriesClassifier {
    pub fn new(settings: &ConversionSettings) -> Self {
        Self {
            validate_multiframe_implicit: settings.validate_multiframe_implicit,
        }
    }

    /// True iff any instance carries PerFrameFunctionalGroupsSequence
    pub fn is_multiframe<A: MetadataAccessor>(&self, series: &[&A]) -> bool {
        series
            .iter()
            .any(|dcm| dcm.has_tag(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE))
    }

    /// The instance holding the frames of a multiframe series
    pub fn multiframe_bundle<'a, A: MetadataAccessor>(&self, series: &[&'a A]) -> Option<&'a A> {
        series
            .iter()
            .copied()
            .find(|dcm| dcm.has_tag(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE))
    }

    /// Rejects Implicit VR Little Endian multiframe input
    ///
    /// A no-op when validation is disabled.
    pub fn assert_explicit_vr<A: MetadataAccessor>(&self, series: &[&A]) -> Result<()> {
        if !self.validate_multiframe_implicit {
            return Ok(());
        }
        let first = series.first().ok_or(ConversionError::EmptySeries)?;
        match first.transfer_syntax() {
            Some(uid) if uid == IMPLICIT_VR_LITTLE_ENDIAN => {
                Err(ConversionError::UnsupportedEncoding(format!(
                    "multiframe series stored as Implicit VR Little Endian ({})",
                    uid
                )))
            }
            _ => Ok(()),
        }
    }

    /// Whether the series has more than one timepoint
    ///
    /// Multiframe: more than one stack. Singleframe: the stack position
    /// tag is present on the first instance and grouping yields more than
    /// one timepoint.
    pub fn is_4d<A: MetadataAccessor>(&self, series: &[&A]) -> Result<bool> {
        let first = series.first().ok_or(ConversionError::EmptySeries)?;

        if let Some(bundle) = self.multiframe_bundle(series) {
            return Ok(multiframe_stack_count(bundle)? > 1);
        }

        if !first.has_tag(PHILIPS_SLICE_NUMBER_MR) {
            debug!("No stack position on first instance, not 4D");
            return Ok(false);
        }
        Ok(group_instances(series).len() > 1)
    }

    /// Whether a multiframe series holds a single stack
    pub fn is_anatomical<A: MetadataAccessor>(&self, series: &[&A]) -> Result<bool> {
        let bundle = self.multiframe_bundle(series).ok_or_else(|| {
            if series.is_empty() {
                ConversionError::EmptySeries
            } else {
                ConversionError::UnsupportedEncoding("series is not multiframe".to_string())
            }
        })?;
        Ok(multiframe_stack_count(bundle)? <= 1)
    }

    /// Layout × dimensionality of a series
    ///
    /// Multiframe series are checked for an acceptable encoding first.
    pub fn classify<A: MetadataAccessor>(&self, series: &[&A]) -> Result<SequenceType> {
        if series.is_empty() {
            return Err(ConversionError::EmptySeries);
        }

        let layout = if self.is_multiframe(series) {
            self.assert_explicit_vr(series)?;
            SeriesLayout::Multiframe
        } else {
            SeriesLayout::Singleframe
        };

        let dimensionality = if self.is_4d(series)? {
            Dimensionality::FourD
        } else {
            Dimensionality::Anatomical
        };

        let sequence_type = SequenceType::new(layout, dimensionality);
        info!("Found sequence type: {}", sequence_type);
        Ok(sequence_type)
    }
}
