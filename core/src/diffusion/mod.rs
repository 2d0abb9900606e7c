//! Diffusion weighting metadata: detection, extraction and the trailing
//! b=0 correction

pub mod extractor;
pub mod postprocess;

pub use extractor::{
    detect_convention, extract_multiframe_table, extract_singleframe_table, is_bval_type_a,
    is_bval_type_b, is_multiframe_diffusion,
};
pub use postprocess::trim_trailing_zero_volume;
