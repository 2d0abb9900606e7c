/// Configuration for converting series
///
/// Threaded explicitly into the classifier, the reader and the writer; the
/// converter never consults global state.
///
/// # Example
///
/// ```
/// use niftify_core::ConversionSettings;
///
/// let settings = ConversionSettings::default()
///     .compression(false)
///     .force_read(true);
///
/// assert!(settings.validate_multiframe_implicit);
/// assert!(!settings.compression);
/// assert!(settings.force_read);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionSettings {
    /// Refuse multiframe series stored with Implicit VR Little Endian
    pub validate_multiframe_implicit: bool,

    /// Write `.nii.gz` instead of `.nii`
    pub compression: bool,

    /// Read files that lack the 128-byte preamble and "DICM" marker
    pub force_read: bool,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            validate_multiframe_implicit: true,
            compression: true,
            force_read: false,
        }
    }
}

impl ConversionSettings {
    /// Creates settings with all validation disabled
    ///
    /// # Example
    ///
    /// ```
    /// use niftify_core::ConversionSettings;
    ///
    /// let permissive = ConversionSettings::permissive();
    /// assert!(!permissive.validate_multiframe_implicit);
    /// assert!(permissive.force_read);
    /// ```
    pub fn permissive() -> Self {
        Self {
            validate_multiframe_implicit: false,
            compression: true,
            force_read: true,
        }
    }

    /// Builder: Validate the encoding of multiframe series
    pub fn validate_multiframe_implicit(mut self, validate: bool) -> Self {
        self.validate_multiframe_implicit = validate;
        self
    }

    /// Builder: Gzip the output volumes
    pub fn compression(mut self, compress: bool) -> Self {
        self.compression = compress;
        self
    }

    /// Builder: Read files without a DICOM preamble
    pub fn force_read(mut self, force: bool) -> Self {
        self.force_read = force;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ConversionSettings::default();
        assert!(settings.validate_multiframe_implicit);
        assert!(settings.compression);
        assert!(!settings.force_read);
    }

    #[test]
    fn test_permissive_settings() {
        let settings = ConversionSettings::permissive();
        assert!(!settings.validate_multiframe_implicit);
        assert!(settings.force_read);
    }

    #[test]
    fn test_builder_chain() {
        let settings = ConversionSettings::permissive()
            .validate_multiframe_implicit(true)
            .compression(false);

        assert!(settings.validate_multiframe_implicit);
        assert!(!settings.compression);
        assert!(settings.force_read);
    }
}
