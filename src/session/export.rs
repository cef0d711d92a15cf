use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use super::error::ExportError;

/// Writes an optional header and the rows as CSV. Rows may be shorter than
/// the header while buffers are still filling.
pub fn write_csv<W: Write>(
    out: W,
    header: Option<&[String]>,
    rows: &[Vec<String>],
) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
    if let Some(header) = header {
        writer.write_record(header)?;
    }
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Appends to `path`, creating it and its parent directories if needed.
pub fn append_csv(
    path: &Path,
    header: Option<&[String]>,
    rows: &[Vec<String>],
) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    write_csv(file, header, rows)
}
