//! Sample block and affine assembly
//!
//! - [`geometry`]: slice ordering, affine construction, multiframe frame layout
//! - [`pixels`]: frame decoding and rescaling
//! - [`assembler`]: grouped instances or a multiframe bundle into a [`VolumeResult`](crate::types::VolumeResult)

pub mod assembler;
pub mod geometry;
pub mod pixels;

pub use assembler::{squeeze_trailing, VolumeAssembler};
pub use pixels::{DicomFrameDecoder, FrameDecoder, Rescale};
