use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use shapefile::{dbase::{self, FieldValue, Record}, Reader, Shape};
use tempfile::TempDir;

use crate::common::fs::{extract_zip, find_with_extension};

/// A readable shapefile: a `.shp` on disk, possibly inside a temporary extraction directory.
pub(crate) struct ShapefileSource {
    shp: PathBuf,
    _extracted: Option<TempDir>,
}

impl ShapefileSource {
    /// Open `path`, which may be a `.shp` file, a `.zip` archive or a directory containing a `.shp`.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let is_zip = path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

        if is_zip {
            let tmp = tempfile::tempdir()
                .context("[common::data] Failed to create extraction directory")?;
            extract_zip(path, tmp.path())?;
            let shp = find_with_extension(tmp.path(), "shp")
                .with_context(|| format!("[common::data] No .shp file inside {}", path.display()))?;
            Ok(Self { shp, _extracted: Some(tmp) })
        } else if path.is_dir() {
            let shp = find_with_extension(path, "shp")
                .with_context(|| format!("[common::data] No .shp file inside {}", path.display()))?;
            Ok(Self { shp, _extracted: None })
        } else {
            Ok(Self { shp: path.to_path_buf(), _extracted: None })
        }
    }

    #[inline] pub(crate) fn shp_path(&self) -> &Path { &self.shp }

    /// Reads all shapes + attribute records.
    pub(crate) fn read(&self) -> Result<(Vec<Shape>, Vec<Record>)> {
        let mut reader = Reader::from_path(&self.shp)
            .with_context(|| format!("[common::data] Failed to open shapefile: {}", self.shp.display()))?;

        let mut shapes = Vec::new();
        let mut records = Vec::new();
        for result in reader.iter_shapes_and_records() {
            let (shape, record) = result
                .with_context(|| format!("[common::data] Error reading shape+record in {}", self.shp.display()))?;
            shapes.push(shape);
            records.push(record);
        }
        Ok((shapes, records))
    }

    /// Reads only the attribute table (the `.dbf` next to the `.shp`).
    pub(crate) fn read_records(&self) -> Result<Vec<Record>> {
        let dbf = self.shp.with_extension("dbf");
        let mut reader = dbase::Reader::from_path(&dbf)
            .with_context(|| format!("[common::data] Failed to open attribute table: {}", dbf.display()))?;
        reader.read()
            .with_context(|| format!("[common::data] Failed to read attribute table: {}", dbf.display()))
    }
}

/// Coerce a shape into an owned multipolygon; null shapes become empty geometries.
pub(crate) fn shape_to_multipolygon(shape: Shape) -> Result<geo::MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(polygon) => Ok(crate::common::shp_to_geo(&polygon)),
        Shape::NullShape => Ok(geo::MultiPolygon(Vec::new())),
        other => bail!("[common::data] found non-Polygon shape: {:?}", other.shapetype()),
    }
}

/// Text value of the first present field among `names`, accepting character and numeric columns.
/// Numeric values with no fractional part are rendered without a decimal point.
pub(crate) fn get_text_field(record: &Record, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match record.get(name)? {
        FieldValue::Character(Some(s)) => Some(s.trim().to_string()),
        FieldValue::Memo(s) => Some(s.trim().to_string()),
        FieldValue::Numeric(Some(n)) => Some(format_number(*n)),
        FieldValue::Float(Some(n)) => Some(format_number(f64::from(*n))),
        FieldValue::Double(n) => Some(format_number(*n)),
        FieldValue::Integer(n) => Some(n.to_string()),
        _ => None,
    })
    .filter(|s| !s.is_empty())
}

/// Integer value of the first present field among `names`.
pub(crate) fn get_integer_field(record: &Record, names: &[&str]) -> Result<u32> {
    let text = get_text_field(record, names)
        .with_context(|| format!("[common::data] missing or invalid field: {}", names.join("|")))?;
    let value = text.parse::<f64>()
        .with_context(|| format!("[common::data] field {} is not numeric: {text:?}", names.join("|")))?;
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        bail!("[common::data] field {} is not a non-negative integer: {text:?}", names.join("|"));
    }
    Ok(value as u32)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 { format!("{}", n as i64) } else { n.to_string() }
}
