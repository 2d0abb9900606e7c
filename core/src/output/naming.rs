use crate::metadata::tags::{
    get_int_value, get_string_value, PROTOCOL_NAME, SEQUENCE_NAME, SERIES_DESCRIPTION,
    SERIES_INSTANCE_UID, SERIES_NUMBER,
};
use crate::metadata::MetadataAccessor;
use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Normalizes free text into a file-name-safe slug
///
/// Accents are decomposed and dropped, anything that is not a word
/// character, whitespace or hyphen is removed, and runs of whitespace or
/// hyphens collapse into a single `-`.
///
/// # Example
///
/// ```
/// use niftify_core::output::naming::slugify;
///
/// assert_eq!(slugify("3_DTI scan"), "3_dti-scan");
/// assert_eq!(slugify("T1 Mémoire"), "t1-memoire");
/// ```
pub fn slugify(value: &str) -> String {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let invalid = INVALID.get_or_init(|| Regex::new(r"[^\w\s-]").expect("Failed to compile regex"));
    let separators =
        SEPARATORS.get_or_init(|| Regex::new(r"[-\s]+").expect("Failed to compile regex"));

    let ascii: String = value.nfkd().filter(char::is_ascii).collect();
    let stripped = invalid.replace_all(&ascii, "");
    let lowered = stripped.trim().to_lowercase();
    separators.replace_all(&lowered, "-").into_owned()
}

/// Base output name of a series, without extension
///
/// `<SeriesNumber>_<label>` where the label is the first available of
/// SeriesDescription, SequenceName and ProtocolName, slugified. Without a
/// SeriesNumber the SeriesInstanceUID is used as is.
pub fn base_filename<A: MetadataAccessor + ?Sized>(dcm: &A) -> String {
    let Some(number) = get_int_value(dcm, SERIES_NUMBER) else {
        return get_string_value(dcm, SERIES_INSTANCE_UID)
            .filter(|uid| !uid.is_empty())
            .unwrap_or_else(|| "series".to_string());
    };

    let label = [SERIES_DESCRIPTION, SEQUENCE_NAME, PROTOCOL_NAME]
        .into_iter()
        .filter_map(|tag| get_string_value(dcm, tag))
        .find(|text| !text.is_empty());

    match label {
        Some(label) => slugify(&format!("{}_{}", number, label)),
        None => number.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{put_str, SliceBuilder};
    use dicom_core::VR;
    use rstest::rstest;

    #[rstest]
    #[case("3_DTI scan", "3_dti-scan")]
    #[case("  WIP  sT1W_3D_TFE ", "wip-st1w_3d_tfe")]
    #[case("Ångström / café", "angstrom-cafe")]
    #[case("DWI -- b1000", "dwi-b1000")]
    #[case("résumé (copy)", "resume-copy")]
    fn test_slugify(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn test_slug_has_no_spaces() {
        let slug = slugify("a b\tc\nd");
        assert!(!slug.contains(char::is_whitespace));
        assert_eq!(slug, "a-b-c-d");
    }

    #[test]
    fn test_base_filename_from_description() {
        let dcm = SliceBuilder::new(Some(1), 0.0)
            .series_number(3)
            .description("DTI scan")
            .build();
        assert_eq!(base_filename(&dcm), "3_dti-scan");
    }

    #[test]
    fn test_base_filename_falls_back_to_sequence_and_protocol() {
        let mut dcm = SliceBuilder::new(Some(1), 0.0).series_number(7).build();
        put_str(&mut dcm, PROTOCOL_NAME, VR::LO, "Survey");
        assert_eq!(base_filename(&dcm), "7_survey");

        put_str(&mut dcm, SEQUENCE_NAME, VR::SH, "*fl3d1");
        assert_eq!(base_filename(&dcm), "7_fl3d1");
    }

    #[test]
    fn test_base_filename_without_label() {
        let dcm = SliceBuilder::new(Some(1), 0.0).series_number(12).build();
        assert_eq!(base_filename(&dcm), "12");
    }

    #[test]
    fn test_base_filename_without_series_number() {
        let dcm = SliceBuilder::new(Some(1), 0.0)
            .series_uid("1.3.46.670589.11.1")
            .description("ignored")
            .build();
        assert_eq!(base_filename(&dcm), "1.3.46.670589.11.1");
    }
}
