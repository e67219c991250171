use std::{collections::HashSet, path::Path};

use anyhow::{bail, Context, Result};
use geo::MultiPolygon;
use tracing::debug;

use crate::{common, geom::{is_well_formed, Geometries}, types::Chamber, Error};

/// Attribute holding the district number in plan shapefiles.
const DISTRICT_FIELDS: &[&str] = &["DISTRICTNO", "DISTRICT", "DISTRICTN"];

/// The district polygons of one chamber's plan.
#[derive(Debug, Clone)]
pub struct DistrictSet {
    chamber: Chamber,
    numbers: Vec<u32>,
    geoms: Geometries,
}

impl DistrictSet {
    /// Build a plan from (district number, geometry) pairs.
    /// District numbers must be unique and every geometry valid with positive area.
    pub fn new(chamber: Chamber, districts: Vec<(u32, MultiPolygon<f64>)>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(districts.len());
        for (number, shape) in &districts {
            if !seen.insert(*number) {
                return Err(Error::DuplicateDistrict(*number).into());
            }
            if !is_well_formed(shape) {
                bail!("[loader::district] {chamber} district {number} has invalid or empty geometry");
            }
        }

        let (numbers, shapes) = districts.into_iter().unzip();
        Ok(Self { chamber, numbers, geoms: Geometries::new(shapes) })
    }

    /// Load a plan shapefile (`.shp`, `.zip` or directory).
    pub fn from_shapefile(chamber: Chamber, path: &Path) -> Result<Self> {
        let source = common::ShapefileSource::open(path)?;
        let (shapes, records) = source.read()?;

        let districts = shapes.into_iter().zip(&records).enumerate()
            .map(|(i, (shape, record))| {
                let number = common::get_integer_field(record, DISTRICT_FIELDS)
                    .with_context(|| format!("[loader::district] record {i} of {}", source.shp_path().display()))?;
                Ok((number, common::shape_to_multipolygon(shape)?))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("[loader::district] read {} {} districts from {}", districts.len(), chamber, source.shp_path().display());
        Self::new(chamber, districts)
            .with_context(|| format!("[loader::district] Invalid plan {}", path.display()))
    }

    #[inline] pub fn chamber(&self) -> Chamber { self.chamber }

    #[inline] pub fn len(&self) -> usize { self.numbers.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.numbers.is_empty() }

    /// District numbers in plan order.
    #[inline] pub fn numbers(&self) -> &[u32] { &self.numbers }

    #[inline] pub(crate) fn number(&self, idx: usize) -> u32 { self.numbers[idx] }

    #[inline] pub(crate) fn geometries(&self) -> &Geometries { &self.geoms }
}
