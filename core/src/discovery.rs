//! Finding DICOM files on disk and bucketing them into series

use crate::error::Result;
use crate::metadata::tags::{get_string_value, SERIES_INSTANCE_UID};
use crate::types::ConversionSettings;
use dicom_dictionary_std::tags::PIXEL_DATA;
use dicom_object::file::{OpenFileOptions, ReadPreamble};
use dicom_object::{FileDicomObject, InMemDicomObject};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// A DICOM file read into memory
pub type DicomFile = FileDicomObject<InMemDicomObject>;

/// Files of a directory tree bucketed by SeriesInstanceUID
#[derive(Debug, Default, Clone)]
pub struct SeriesIndex {
    /// Series UID → files of that series, in path order
    pub series: BTreeMap<String, Vec<PathBuf>>,
    /// Files that could not be read, with the reason
    pub unreadable: Vec<(PathBuf, String)>,
}

impl SeriesIndex {
    pub fn file_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }
}

/// Checks if a file has a DICOM header
///
/// DICOM files typically have:
/// - 128-byte preamble
/// - 4-byte "DICM" magic string at offset 128
pub fn is_dicom_file(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    let mut buffer = [0u8; 132];
    match file.read_exact(&mut buffer) {
        Ok(()) => &buffer[128..132] == b"DICM",
        Err(_) => false,
    }
}

fn has_dicom_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        ext.eq_ignore_ascii_case("dcm")
            || ext.eq_ignore_ascii_case("dicom")
            || ext.eq_ignore_ascii_case("ima")
    })
}

/// Recursively lists candidate DICOM files below `directory`, sorted by
/// path
///
/// Files are accepted by extension (`.dcm`, `.dicom`, `.ima`) or by their
/// `DICM` header. With `force` every regular file is a candidate and
/// unreadable ones are weeded out when parsed.
pub fn collect_dicom_files(directory: &Path, force: bool) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![directory.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() {
                if force || has_dicom_extension(&path) {
                    files.push(path);
                } else if is_dicom_file(&path) {
                    debug!("Found DICOM file by header: {}", path.display());
                    files.push(path);
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

fn open_options(settings: &ConversionSettings) -> OpenFileOptions {
    let options = OpenFileOptions::new();
    if settings.force_read {
        options.read_preamble(ReadPreamble::Auto)
    } else {
        options
    }
}

/// Reads a whole DICOM file, pixel data included
pub fn open_dicom(path: &Path, settings: &ConversionSettings) -> Result<DicomFile> {
    Ok(open_options(settings).open_file(path)?)
}

/// Reads headers only and groups files by SeriesInstanceUID
///
/// Unreadable files and files without a series UID are logged and
/// recorded in [`SeriesIndex::unreadable`].
pub fn index_series(files: &[PathBuf], settings: &ConversionSettings) -> SeriesIndex {
    let mut index = SeriesIndex::default();

    for path in files {
        let header = open_options(settings).read_until(PIXEL_DATA).open_file(path);
        match header {
            Ok(dcm) => match get_string_value(&dcm, SERIES_INSTANCE_UID) {
                Some(uid) if !uid.is_empty() => {
                    index.series.entry(uid).or_default().push(path.clone());
                }
                _ => {
                    warn!("Skipping {}: no SeriesInstanceUID", path.display());
                    index
                        .unreadable
                        .push((path.clone(), "missing SeriesInstanceUID".to_string()));
                }
            },
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                index.unreadable.push((path.clone(), e.to_string()));
            }
        }
    }

    info!(
        "Found {} series in {} files",
        index.series.len(),
        index.file_count()
    );
    index
}

/// Fully reads the files of one series, dropping those that fail to parse
pub fn load_series(paths: &[PathBuf], settings: &ConversionSettings) -> Vec<DicomFile> {
    paths
        .iter()
        .filter_map(|path| match open_dicom(path, settings) {
            Ok(dcm) => Some(dcm),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}
