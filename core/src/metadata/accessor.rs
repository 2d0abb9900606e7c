use dicom_core::Tag;
use dicom_object::{FileDicomObject, InMemDicomObject};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::tags::TRANSFER_SYNTAX_UID;
use crate::error::{ConversionError, Result};

/// A single attribute value as seen by the converter
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Number(v) => write!(f, "{}", v),
            ScalarValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Typed, read-only view over the attributes of one instance (or one item
/// of a nested functional-group sequence)
///
/// The conversion core only talks to instances through this trait, so it
/// never depends on a concrete in-memory representation.
pub trait MetadataAccessor {
    /// Type of the items returned by [`MetadataAccessor::get_sequence`]
    type Item: MetadataAccessor;

    /// Whether the tag is present
    fn has_tag(&self, tag: Tag) -> bool;

    /// Reads the first value of a tag as a number, or as text when it does
    /// not convert to a number
    fn get_scalar(&self, tag: Tag) -> Result<ScalarValue>;

    /// Reads the first `length` values of a multi-valued numeric tag
    fn get_array(&self, tag: Tag, length: usize) -> Result<Vec<f64>>;

    /// Items of a sequence tag
    fn get_sequence(&self, tag: Tag) -> Result<&[Self::Item]>;

    /// Transfer syntax UID of the containing file, if known
    fn transfer_syntax(&self) -> Option<String>;

    /// Reads a tag as a floating point number
    ///
    /// A present but non-numeric value yields
    /// [`ConversionError::NumericParseFailure`].
    fn get_float(&self, tag: Tag) -> Result<f64> {
        match self.get_scalar(tag)? {
            ScalarValue::Number(v) => Ok(v),
            ScalarValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ConversionError::NumericParseFailure { tag, value: s }),
        }
    }

    /// Reads a tag as an integer
    fn get_int(&self, tag: Tag) -> Result<i64> {
        let value = self.get_float(tag)?;
        if value.fract() != 0.0 || !value.is_finite() {
            return Err(ConversionError::NumericParseFailure {
                tag,
                value: value.to_string(),
            });
        }
        Ok(value as i64)
    }

    /// Reads a tag as trimmed text
    ///
    /// Implementations backed by a textual store should override this to
    /// keep the value verbatim (`"1.10"` must not become `"1.1"`).
    fn get_text(&self, tag: Tag) -> Result<String> {
        self.get_scalar(tag).map(|v| v.to_string().trim().to_string())
    }
}

/// Parses a list of decimal numbers out of free text
///
/// Accepts the usual DICOM renderings:
/// - "0.1\\0.1"
/// - "0.1 0.1"
/// - "[0.1, 0.1]"
/// - exponential notation: "1.5e-4\\1.5e-4"
pub fn parse_decimal_list(s: &str) -> Vec<f64> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| {
        Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").expect("Failed to compile regex")
    });

    re.find_iter(s)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

impl MetadataAccessor for InMemDicomObject {
    type Item = InMemDicomObject;

    fn has_tag(&self, tag: Tag) -> bool {
        self.element(tag).is_ok()
    }

    fn get_scalar(&self, tag: Tag) -> Result<ScalarValue> {
        let elem = self
            .element(tag)
            .map_err(|_| ConversionError::AttributeMissing(tag))?;

        if elem.items().is_some() {
            return Err(ConversionError::NumericParseFailure {
                tag,
                value: "<sequence>".to_string(),
            });
        }

        if let Ok(v) = elem.to_float64() {
            return Ok(ScalarValue::Number(v));
        }

        let text = elem
            .to_str()
            .map_err(|e| ConversionError::DicomError(format!("{}: {}", tag, e)))?;
        Ok(ScalarValue::Text(text.trim().to_string()))
    }

    fn get_text(&self, tag: Tag) -> Result<String> {
        let elem = self
            .element(tag)
            .map_err(|_| ConversionError::AttributeMissing(tag))?;
        let text = elem
            .to_str()
            .map_err(|e| ConversionError::DicomError(format!("{}: {}", tag, e)))?;
        Ok(text.trim_end_matches('\0').trim().to_string())
    }

    fn get_array(&self, tag: Tag, length: usize) -> Result<Vec<f64>> {
        let elem = self
            .element(tag)
            .map_err(|_| ConversionError::AttributeMissing(tag))?;

        let values = match elem.to_multi_float64() {
            Ok(values) => values,
            // Fallback: parse the string rendering
            Err(_) => elem
                .to_str()
                .map(|s| parse_decimal_list(&s))
                .unwrap_or_default(),
        };

        if values.len() < length {
            return Err(ConversionError::NumericParseFailure {
                tag,
                value: format!("{:?}", values),
            });
        }
        Ok(values[..length].to_vec())
    }

    fn get_sequence(&self, tag: Tag) -> Result<&[InMemDicomObject]> {
        self.element(tag)
            .map_err(|_| ConversionError::AttributeMissing(tag))?
            .items()
            .ok_or(ConversionError::AttributeMissing(tag))
    }

    fn transfer_syntax(&self) -> Option<String> {
        // Data sets built in memory may carry the meta element inline
        self.get_text(TRANSFER_SYNTAX_UID)
            .ok()
            .map(|uid| uid.trim_end_matches('\0').to_string())
    }
}

impl MetadataAccessor for FileDicomObject<InMemDicomObject> {
    type Item = InMemDicomObject;

    fn has_tag(&self, tag: Tag) -> bool {
        let dataset: &InMemDicomObject = self;
        dataset.has_tag(tag)
    }

    fn get_scalar(&self, tag: Tag) -> Result<ScalarValue> {
        let dataset: &InMemDicomObject = self;
        dataset.get_scalar(tag)
    }

    fn get_text(&self, tag: Tag) -> Result<String> {
        let dataset: &InMemDicomObject = self;
        dataset.get_text(tag)
    }

    fn get_array(&self, tag: Tag, length: usize) -> Result<Vec<f64>> {
        let dataset: &InMemDicomObject = self;
        dataset.get_array(tag, length)
    }

    fn get_sequence(&self, tag: Tag) -> Result<&[InMemDicomObject]> {
        let dataset: &InMemDicomObject = self;
        dataset.get_sequence(tag)
    }

    fn transfer_syntax(&self) -> Option<String> {
        let uid = self.meta().transfer_syntax().trim_end_matches('\0').trim();
        if uid.is_empty() {
            None
        } else {
            Some(uid.to_string())
        }
    }
}
