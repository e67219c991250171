use std::{path::Path, sync::Arc};

use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use geo::MultiPolygon;
use shapefile::dbase::Record;
use tracing::debug;

use crate::{common, geom::Geometries, types::{PrecinctIds, PrecinctKey}, Error};

const ID_FIELDS: &[&str] = &["PRECINCTID"];
const COUNTY_FIELDS: &[&str] = &["COUNTYFIPS", "CountyFips"];
const MCD_FIELDS: &[&str] = &["MCDFIPS", "Jurisdicti"];
const WARD_FIELDS: &[&str] = &["WARD", "Ward"];
const PRECINCT_FIELDS: &[&str] = &["PRECINCT", "Precinct"];

/// Read the canonical identifying fields of one precinct record.
fn record_to_ids(record: &Record) -> Result<PrecinctIds> {
    let field = |names: &[&str]| common::get_text_field(record, names)
        .with_context(|| format!("missing field {}", names.join("|")));

    let key = PrecinctKey::new(&field(MCD_FIELDS)?, &field(WARD_FIELDS)?, &field(PRECINCT_FIELDS)?);
    let id = common::get_text_field(record, ID_FIELDS);
    Ok(PrecinctIds::new(id.as_deref(), &field(COUNTY_FIELDS)?, key))
}

/// The voting precinct polygons of one precinct map year.
#[derive(Debug, Clone)]
pub struct PrecinctSet {
    year: u16,
    ids: Vec<PrecinctIds>,
    geoms: Geometries,
}

impl PrecinctSet {
    /// Build a precinct map from identifiers and geometries. Geometries are not validated here:
    /// invalid shapes are excluded later by the intersection engine.
    ///
    /// Records sharing a precinct key are parts of one precinct and are merged into a single
    /// multipolygon at the position of the first part. Parts whose identifiers disagree, or one
    /// identifier used for two keys, fail with [`Error::DuplicateKey`].
    pub fn new(year: u16, precincts: Vec<(PrecinctIds, MultiPolygon<f64>)>) -> Result<Self, Error> {
        let mut slots: AHashMap<PrecinctKey, usize> = AHashMap::with_capacity(precincts.len());
        let mut seen_ids: AHashSet<Arc<str>> = AHashSet::with_capacity(precincts.len());
        let mut ids: Vec<PrecinctIds> = Vec::with_capacity(precincts.len());
        let mut shapes: Vec<MultiPolygon<f64>> = Vec::with_capacity(precincts.len());
        let mut merged = 0;

        for (precinct, shape) in precincts {
            if let Some(&slot) = slots.get(&precinct.key) {
                if ids[slot] != precinct {
                    return Err(Error::DuplicateKey { table: "precincts", key: precinct.key.to_string() });
                }
                shapes[slot].0.extend(shape.0);
                merged += 1;
                continue;
            }
            if !seen_ids.insert(precinct.id.clone()) {
                return Err(Error::DuplicateKey { table: "precincts", key: precinct.id.to_string() });
            }
            slots.insert(precinct.key.clone(), ids.len());
            ids.push(precinct);
            shapes.push(shape);
        }

        if merged > 0 {
            debug!("[loader::precinct] merged {merged} multi-record precinct parts for {year}");
        }
        Ok(Self { year, ids, geoms: Geometries::new(shapes) })
    }

    /// Load a precinct shapefile (`.shp`, `.zip` or directory), normalizing field names
    /// and synthesizing identifiers where `PRECINCTID` is absent.
    pub fn from_shapefile(year: u16, path: &Path) -> Result<Self> {
        let source = common::ShapefileSource::open(path)?;
        let (shapes, records) = source.read()?;

        let precincts = shapes.into_iter().zip(&records).enumerate()
            .map(|(i, (shape, record))| {
                let ids = record_to_ids(record)
                    .with_context(|| format!("[loader::precinct] record {i} of {}", source.shp_path().display()))?;
                Ok((ids, common::shape_to_multipolygon(shape)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let set = Self::new(year, precincts)
            .with_context(|| format!("[loader::precinct] Invalid precinct map {}", source.shp_path().display()))?;
        debug!(
            "[loader::precinct] read {} precincts for {} from {} (extent {:?})",
            set.len(), year, source.shp_path().display(), set.geoms.bounds()
        );
        Ok(set)
    }

    /// Year of the precinct map (which may differ from the election year it serves).
    #[inline] pub fn year(&self) -> u16 { self.year }

    #[inline] pub fn len(&self) -> usize { self.ids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// Identifying fields of every precinct, in file order.
    #[inline] pub fn ids(&self) -> &[PrecinctIds] { &self.ids }

    #[inline] pub(crate) fn geometries(&self) -> &Geometries { &self.geoms }
}
