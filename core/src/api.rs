use crate::classification::SeriesClassifier;
use crate::diffusion::{
    extract_multiframe_table, extract_singleframe_table, is_multiframe_diffusion,
    trim_trailing_zero_volume,
};
use crate::discovery::{collect_dicom_files, index_series, load_series};
use crate::error::{ConversionError, Result};
use crate::grouping::{filter_series, group_instances, Grouping};
use crate::metadata::MetadataAccessor;
use crate::output::{base_filename, write_result, NiftiWriter, OutputFiles, VolumeWriter};
use crate::types::{ConversionSettings, DiffusionTable, SequenceType, VolumeResult};
use crate::volume::geometry::{frame_layout, sort_by_position};
use crate::volume::{DicomFrameDecoder, FrameDecoder, VolumeAssembler};
use log::{info, warn};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Converts series of DICOM instances into volumes
///
/// Runs the per-series pipeline: filter, classify, group, assemble,
/// extract diffusion metadata and strip a trailing b=0 volume. Batches
/// convert series one after the other and record a per-series outcome
/// instead of failing as a whole.
///
/// # Example
///
/// ```
/// use niftify_core::{ConversionError, ConversionSettings, SeriesConverter};
/// use dicom_object::{FileDicomObject, InMemDicomObject};
///
/// let converter = SeriesConverter::new(ConversionSettings::default());
/// let empty: Vec<FileDicomObject<InMemDicomObject>> = Vec::new();
///
/// assert!(matches!(
///     converter.convert_series(&empty),
///     Err(ConversionError::EmptySeries)
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct SeriesConverter<D = DicomFrameDecoder> {
    settings: ConversionSettings,
    classifier: SeriesClassifier,
    decoder: D,
}

impl SeriesConverter<DicomFrameDecoder> {
    /// Converter decoding pixel data with `dicom-pixeldata`
    pub fn new(settings: ConversionSettings) -> Self {
        Self::with_decoder(settings, DicomFrameDecoder)
    }
}

impl<D> SeriesConverter<D> {
    pub fn with_decoder(settings: ConversionSettings, decoder: D) -> Self {
        Self {
            settings,
            classifier: SeriesClassifier::new(&settings),
            decoder,
        }
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    /// Converts the instances of one series
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No instance is left after removing duplicates and localizers
    /// - A multiframe series is stored as Implicit VR Little Endian
    /// - Timepoints hold different numbers of slices
    /// - Geometry or pixel data cannot be read
    pub fn convert_series<A>(&self, instances: &[A]) -> Result<VolumeResult>
    where
        A: MetadataAccessor,
        D: FrameDecoder<A>,
    {
        let refs: Vec<&A> = instances.iter().collect();
        let series = filter_series(&refs);
        if series.is_empty() {
            return Err(ConversionError::EmptySeries);
        }

        let sequence_type = self.classifier.classify(&series)?;
        let assembler = VolumeAssembler::new(&self.decoder);

        let (volume, table) = if sequence_type.is_multiframe() {
            let bundle = self
                .classifier
                .multiframe_bundle(&series)
                .ok_or(ConversionError::EmptySeries)?;
            let volume = assembler.assemble_multiframe(bundle, sequence_type)?;
            let table = if sequence_type.is_4d() && is_multiframe_diffusion(bundle) {
                extract_multiframe_table(bundle, &frame_layout(bundle)?)
            } else {
                None
            };
            (volume, table)
        } else if sequence_type.is_4d() {
            let grouping = group_instances(&series);
            info!("Grouped series into {} timepoints", grouping.len());
            let volume = assembler.assemble_singleframe(&grouping, sequence_type)?;
            (volume, extract_singleframe_table(&grouping))
        } else {
            let grouping: Grouping<'_, A> = vec![sort_by_position(&series)];
            (assembler.assemble_singleframe(&grouping, sequence_type)?, None)
        };

        Ok(trim_trailing_zero_volume(attach_table(volume, table)))
    }

    /// Converts and writes one series, capturing any failure in the outcome
    fn process_series<A, W>(
        &self,
        series_uid: &str,
        instances: &[A],
        output_dir: &Path,
        writer: &W,
        used_names: &mut HashSet<String>,
    ) -> SeriesOutcome
    where
        A: MetadataAccessor,
        D: FrameDecoder<A>,
        W: VolumeWriter + ?Sized,
    {
        info!(
            "Converting series {} ({} instances)",
            series_uid,
            instances.len()
        );
        let base = instances
            .first()
            .map(base_filename)
            .unwrap_or_else(|| series_uid.to_string());
        let base = unique_name(base, used_names);

        let converted = self.convert_series(instances).and_then(|volume| {
            let files = write_result(writer, &volume, output_dir, &base)?;
            Ok(SeriesStatus::Converted {
                files,
                sequence_type: volume.sequence_type,
                shape: volume.shape().to_vec(),
                max_slice_increment: volume.max_slice_increment,
            })
        });

        let status = converted.unwrap_or_else(|e| {
            warn!("Skipping series {}: {}", series_uid, e);
            SeriesStatus::Skipped {
                reason: e.reason_code().to_string(),
                message: e.to_string(),
            }
        });

        SeriesOutcome {
            series_uid: series_uid.to_string(),
            base_name: base,
            status,
        }
    }

    /// Converts in-memory series and writes them to `output_dir`
    ///
    /// When `cancel` is set, series not yet started are reported as
    /// cancelled.
    pub fn convert_batch<A, W, I>(
        &self,
        series: I,
        output_dir: &Path,
        writer: &W,
        cancel: Option<&AtomicBool>,
    ) -> Result<BatchReport>
    where
        A: MetadataAccessor,
        D: FrameDecoder<A>,
        W: VolumeWriter + ?Sized,
        I: IntoIterator<Item = (String, Vec<A>)>,
    {
        std::fs::create_dir_all(output_dir)?;
        let mut report = BatchReport::default();
        let mut used_names = HashSet::new();

        for (uid, instances) in series {
            if is_cancelled(cancel) {
                report.outcomes.push(SeriesOutcome::cancelled(&uid));
                continue;
            }
            let outcome = self.process_series(&uid, &instances, output_dir, writer, &mut used_names);
            report.outcomes.push(outcome);
        }

        Ok(report)
    }
}

impl SeriesConverter<DicomFrameDecoder> {
    /// Converts every series found below `input_dir` into `output_dir`
    ///
    /// Files are read one series at a time, so only that series is held in
    /// memory.
    pub fn convert_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        cancel: Option<&AtomicBool>,
    ) -> Result<BatchReport> {
        let files = collect_dicom_files(input_dir, self.settings.force_read)?;
        info!("Found {} candidate files", files.len());
        let index = index_series(&files, &self.settings);

        std::fs::create_dir_all(output_dir)?;
        let writer = NiftiWriter::new(self.settings.compression);
        let mut report = BatchReport {
            unreadable_files: index.unreadable.len(),
            ..BatchReport::default()
        };
        let mut used_names = HashSet::new();

        for (uid, paths) in &index.series {
            if is_cancelled(cancel) {
                report.outcomes.push(SeriesOutcome::cancelled(uid));
                continue;
            }
            let instances = load_series(paths, &self.settings);
            let outcome =
                self.process_series(uid, &instances, output_dir, &writer, &mut used_names);
            report.outcomes.push(outcome);
        }

        info!(
            "Converted {} of {} series",
            report.converted(),
            report.outcomes.len()
        );
        Ok(report)
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// Attaches a diffusion table when it has one row per volume
fn attach_table(volume: VolumeResult, table: Option<DiffusionTable>) -> VolumeResult {
    match table {
        Some(table) if table.len() == volume.volume_count() => VolumeResult {
            diffusion: Some(table),
            ..volume
        },
        Some(table) => {
            warn!(
                "Diffusion table has {} rows for {} volumes, dropping it",
                table.len(),
                volume.volume_count()
            );
            volume
        }
        None => volume,
    }
}

/// Appends `_2`, `_3`, ... until the name is unused
fn unique_name(base: String, used: &mut HashSet<String>) -> String {
    let mut name = base.clone();
    let mut n = 2;
    while used.contains(&name) {
        name = format!("{}_{}", base, n);
        n += 1;
    }
    used.insert(name.clone());
    name
}

/// Result of one series in a batch
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct SeriesOutcome {
    /// SeriesInstanceUID
    pub series_uid: String,

    /// Base name of the output files
    pub base_name: String,

    pub status: SeriesStatus,
}

impl SeriesOutcome {
    fn cancelled(series_uid: &str) -> Self {
        Self {
            series_uid: series_uid.to_string(),
            base_name: series_uid.to_string(),
            status: SeriesStatus::Skipped {
                reason: "cancelled".to_string(),
                message: "Batch cancelled before this series".to_string(),
            },
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self.status, SeriesStatus::Converted { .. })
    }
}

/// Converted with the files written, or skipped with a reason
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(tag = "status", rename_all = "snake_case"))]
pub enum SeriesStatus {
    Converted {
        files: OutputFiles,
        sequence_type: SequenceType,
        shape: Vec<usize>,
        max_slice_increment: f64,
    },
    Skipped {
        /// Short code, see [`ConversionError::reason_code`]
        reason: String,
        message: String,
    },
}

/// Per-series outcomes of a batch
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct BatchReport {
    pub outcomes: Vec<SeriesOutcome>,

    /// Files that could not be parsed as DICOM
    pub unreadable_files: usize,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_converted()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.converted()
    }
}
