//! Attribute access for DICOM instances
//!
//! - [`MetadataAccessor`]: the typed lookup interface the conversion core is written against
//! - [`tags`]: tag constants and `Option`-returning helpers

pub mod accessor;
pub mod tags;

pub use accessor::{parse_decimal_list, MetadataAccessor, ScalarValue};
