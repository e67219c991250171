//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path, sync::Arc};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader, DataType, Field, Schema, SchemaRef}};

/// Schema forcing the given columns to be read as strings (preserving leading zeros).
fn string_schema(columns: &[&str]) -> SchemaRef {
    Arc::new(Schema::from_iter(
        columns.iter().map(|name| Field::new((*name).into(), DataType::String)),
    ))
}

/// Read a DataFrame from CSV bytes, keeping `string_columns` as text.
pub(crate) fn read_csv_bytes(bytes: &[u8], string_columns: &[&str]) -> Result<DataFrame> {
    let options = CsvReadOptions::default()
        .with_schema_overwrite(Some(string_schema(string_columns)));
    CsvReader::new(Cursor::new(bytes))
        .with_options(options)
        .finish()
        .context("[io::csv::read] Failed to read CSV from bytes")
}

/// Reads a headerless tab-separated `.txt` file. Every field is read as text under the
/// given column names; trailing fields beyond `columns` are ignored.
pub(crate) fn read_headerless_tsv(path: &Path, columns: &[&str]) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open tab-separated file: {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(false)
        .with_schema(Some(string_schema(columns)))
        .map_parse_options(|po| po
            .with_separator(b'\t')
            .with_quote_char(None)
            .with_truncate_ragged_lines(true))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read tab-separated file from {:?}", path))
}

/// Non-null text values of `column`; nulls and missing columns are errors.
pub(crate) fn string_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let values = df.column(column)
        .with_context(|| format!("[io::csv::read] Missing column {column}"))?
        .cast(&DataType::String)?;
    values.str()?.into_iter()
        .enumerate()
        .map(|(row, value)| value
            .map(str::to_string)
            .with_context(|| format!("[io::csv::read] Null {column} in row {row}")))
        .collect()
}

/// Text values of `column`, with nulls kept as `None`.
pub(crate) fn optional_string_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let values = df.column(column)
        .with_context(|| format!("[io::csv::read] Missing column {column}"))?
        .cast(&DataType::String)?;
    Ok(values.str()?.into_iter().map(|value| value.map(str::to_string)).collect())
}

/// Non-null values of `column` cast to u32.
pub(crate) fn u32_values(df: &DataFrame, column: &str) -> Result<Vec<u32>> {
    let values = df.column(column)
        .with_context(|| format!("[io::csv::read] Missing column {column}"))?
        .cast(&DataType::UInt32)?;
    values.u32()?.into_iter()
        .enumerate()
        .map(|(row, value)| value.with_context(|| format!("[io::csv::read] Null or invalid {column} in row {row}")))
        .collect()
}

/// Non-null values of `column` cast to f64.
pub(crate) fn f64_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let values = df.column(column)
        .with_context(|| format!("[io::csv::read] Missing column {column}"))?
        .cast(&DataType::Float64)?;
    values.f64()?.into_iter()
        .enumerate()
        .map(|(row, value)| value.with_context(|| format!("[io::csv::read] Null or invalid {column} in row {row}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_columns_keep_leading_zeros() {
        let df = read_csv_bytes(b"MCDFIPS,WARD,DISTRICTNO\n00100,01,7\n", &["MCDFIPS", "WARD"]).unwrap();
        assert_eq!(string_values(&df, "MCDFIPS").unwrap(), vec!["00100"]);
        assert_eq!(string_values(&df, "WARD").unwrap(), vec!["01"]);
        assert_eq!(u32_values(&df, "DISTRICTNO").unwrap(), vec![7]);
    }

    #[test]
    fn headerless_tsv_ignores_extra_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("county.txt");
        std::fs::write(&path, "01\tALCONA\textra\n02\tALGER\n").unwrap();

        let df = read_headerless_tsv(&path, &["county_code", "county_name"]).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(string_values(&df, "county_code").unwrap(), vec!["01", "02"]);
        assert_eq!(string_values(&df, "county_name").unwrap(), vec!["ALCONA", "ALGER"]);
    }

    #[test]
    fn missing_columns_are_errors() {
        let df = read_csv_bytes(b"a\n1\n", &[]).unwrap();
        assert!(f64_values(&df, "b").is_err());
        assert_eq!(f64_values(&df, "a").unwrap(), vec![1.0]);
    }
}
