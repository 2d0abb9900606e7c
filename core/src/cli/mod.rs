pub mod report;

use crate::types::ConversionSettings;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for niftify
#[derive(Parser, Debug)]
#[command(name = "niftify")]
#[command(about = "Convert DICOM series into NIfTI volumes with bval/bvec sidecars")]
#[command(version)]
pub struct Cli {
    /// Directory searched recursively for DICOM files
    #[arg(value_name = "INPUT_DIR")]
    pub input: PathBuf,

    /// Directory receiving the NIfTI files
    #[arg(value_name = "OUTPUT_DIR")]
    pub output: PathBuf,

    /// Report format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Write uncompressed .nii files
    #[arg(long)]
    pub no_compression: bool,

    /// Accept multiframe series stored as Implicit VR Little Endian
    #[arg(long)]
    pub allow_implicit: bool,

    /// Read files without a DICOM preamble
    #[arg(long)]
    pub force: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Conversion settings selected by the flags
    pub fn settings(&self) -> ConversionSettings {
        ConversionSettings::default()
            .compression(!self.no_compression)
            .validate_multiframe_implicit(!self.allow_implicit)
            .force_read(self.force)
    }
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}
