use crate::api::{BatchReport, SeriesStatus};
use std::fmt;

/// Text report formatter for a conversion batch
pub struct TextReport<'a> {
    report: &'a BatchReport,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(report: &'a BatchReport) -> Self {
        Self { report }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversion Report")?;
        writeln!(f, "=================")?;
        writeln!(f)?;

        for outcome in &self.report.outcomes {
            writeln!(f, "{}", outcome.series_uid)?;
            match &outcome.status {
                SeriesStatus::Converted {
                    files,
                    sequence_type,
                    shape,
                    max_slice_increment,
                } => {
                    writeln!(f, "  Volume:     {}", files.volume.display())?;
                    writeln!(f, "  Type:       {}", sequence_type.simple_name())?;
                    writeln!(f, "  Shape:      {:?}", shape)?;
                    writeln!(f, "  Max slice increment: {:.3} mm", max_slice_increment)?;
                    if let (Some(bval), Some(bvec)) = (&files.bval, &files.bvec) {
                        writeln!(f, "  bval:       {}", bval.display())?;
                        writeln!(f, "  bvec:       {}", bvec.display())?;
                    }
                }
                SeriesStatus::Skipped { reason, message } => {
                    writeln!(f, "  Skipped:    {}", reason)?;
                    writeln!(f, "  Reason:     {}", message)?;
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "Summary")?;
        writeln!(f, "-------")?;
        writeln!(f, "Converted:  {}", self.report.converted())?;
        writeln!(f, "Skipped:    {}", self.report.skipped())?;
        if self.report.unreadable_files > 0 {
            writeln!(f, "Unreadable: {}", self.report.unreadable_files)?;
        }

        Ok(())
    }
}
