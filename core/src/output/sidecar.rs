use crate::error::Result;
use crate::types::DiffusionTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes one b-value per line, in volume order
pub fn write_bval<W: Write>(table: &DiffusionTable, mut writer: W) -> Result<()> {
    for bval in table.bvals() {
        writeln!(writer, "{}", bval)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes one `x y z` gradient direction per line, in volume order
pub fn write_bvec<W: Write>(table: &DiffusionTable, mut writer: W) -> Result<()> {
    for [x, y, z] in table.bvecs() {
        writeln!(writer, "{} {} {}", x, y, z)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `<base>.bval` and `<base>.bvec` next to the volume
pub fn write_sidecars(table: &DiffusionTable, dir: &Path, base: &str) -> Result<(PathBuf, PathBuf)> {
    let bval_path = dir.join(format!("{}.bval", base));
    let bvec_path = dir.join(format!("{}.bvec", base));
    write_bval(table, BufWriter::new(File::create(&bval_path)?))?;
    write_bvec(table, BufWriter::new(File::create(&bvec_path)?))?;
    Ok((bval_path, bvec_path))
}
