//! CSV writing operations.

use std::path::Path;

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::CsvWriter};

use crate::common;

/// Write a DataFrame to CSV bytes.
pub(crate) fn write_csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    CsvWriter::new(&mut out)
        .finish(&mut df.clone())
        .context("[io::csv::write] Failed to write CSV to bytes")?;
    Ok(out)
}

/// Write a DataFrame to a CSV file, replacing it atomically.
pub(crate) fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let bytes = write_csv_bytes(df)?;
    common::write_atomic(path, &bytes)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))
}
