pub mod api;
pub mod classification;
pub mod cli;
pub mod diffusion;
pub mod discovery;
pub mod error;
pub mod grouping;
pub mod metadata;
pub mod output;
pub mod types;
pub mod volume;

#[cfg(test)]
mod testing;

pub use api::{BatchReport, SeriesConverter, SeriesOutcome, SeriesStatus};
pub use classification::SeriesClassifier;
pub use cli::report::TextReport;
pub use error::{ConversionError, Result};
pub use metadata::{MetadataAccessor, ScalarValue};
pub use output::{NiftiWriter, VolumeWriter};
pub use types::*;
