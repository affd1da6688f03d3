//! Raw capture writer.
//!
//! Saves powermetrics stdout untouched so it can be decoded again later with
//! the `decode` command.

use crate::utils::error::OutputError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write raw powermetrics output to a file
///
/// **Public** - main entry point for raw capture output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
pub fn write_raw(bytes: &[u8], output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing raw capture to: {}", output_path.display());

    super::prepare_path(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(bytes).map_err(OutputError::WriteFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!(
        "Raw capture written successfully ({} bytes, {:.2} KB)",
        bytes.len(),
        bytes.len() as f64 / 1024.0
    );

    Ok(())
}
