//! Core type definitions for series conversion
//!
//! - [`SequenceType`]: structural category of a series (layout × dimensionality)
//! - [`DiffusionConvention`]: tag set carrying diffusion metadata
//! - [`DiffusionTable`]: b-values and b-vectors, one row per volume
//! - [`VolumeResult`]: assembled samples, affine and acquisition parameters
//! - [`ImageType`]: decomposed DICOM ImageType field
//! - [`PixelSpacing`]: in-plane sample spacing
//! - [`ConversionSettings`]: configuration threaded through a conversion

mod diffusion_table;
mod enums;
mod image_type;
mod pixel_spacing;
mod settings;
mod volume_result;

pub use diffusion_table::{DiffusionEntry, DiffusionTable};
pub use enums::{DiffusionConvention, Dimensionality, SequenceType, SeriesLayout};
pub use image_type::ImageType;
pub use pixel_spacing::PixelSpacing;
pub use settings::ConversionSettings;
pub use volume_result::{Affine, VolumeResult};
