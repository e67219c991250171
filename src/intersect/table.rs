use std::sync::Arc;

use anyhow::{ensure, Result};
use polars::prelude::{Column, DataFrame};

use crate::{io::csv, types::{PrecinctIds, PrecinctKey}};

pub(crate) const PRECINCT_ID: &str = "PRECINCTID";
pub(crate) const COUNTY_FIPS: &str = "COUNTYFIPS";
pub(crate) const MCD_FIPS: &str = "MCDFIPS";
pub(crate) const WARD: &str = "WARD";
pub(crate) const PRECINCT: &str = "PRECINCT";
pub(crate) const DISTRICT: &str = "DISTRICTNO";
pub(crate) const FRACTION: &str = "intersection";

/// Identifier columns that must be read back as text.
pub(crate) const ID_COLUMNS: [&str; 5] = [PRECINCT_ID, COUNTY_FIPS, MCD_FIPS, WARD, PRECINCT];

/// Share of one precinct's area lying inside one district.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionRecord {
    pub precinct: PrecinctIds,
    pub district: u32,
    pub fraction: f64,
}

/// Precinct → district overlap fractions for one (year, chamber), sorted by (precinct id, district).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntersectionTable {
    records: Vec<IntersectionRecord>,
}

impl IntersectionTable {
    /// Sort by (precinct id, district) and drop repeated (precinct id, district) pairs.
    pub fn new(mut records: Vec<IntersectionRecord>) -> Self {
        records.sort_by(|a, b| a.precinct.id.cmp(&b.precinct.id).then(a.district.cmp(&b.district)));
        records.dedup_by(|a, b| a.precinct.id == b.precinct.id && a.district == b.district);
        Self { records }
    }

    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    #[inline] pub fn records(&self) -> &[IntersectionRecord] { &self.records }

    #[inline] pub fn iter(&self) -> impl Iterator<Item = &IntersectionRecord> { self.records.iter() }

    /// Districts carrying any part of the precinct with identifier `id`.
    pub fn districts_of(&self, id: &str) -> Vec<(u32, f64)> {
        let start = self.records.partition_point(|record| &*record.precinct.id < id);
        self.records[start..].iter()
            .take_while(|record| &*record.precinct.id == id)
            .map(|record| (record.district, record.fraction))
            .collect()
    }

    pub(crate) fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = id_columns(self.records.iter().map(|record| &record.precinct));
        columns.push(Column::new(DISTRICT.into(), self.records.iter().map(|r| r.district).collect::<Vec<_>>()));
        columns.push(Column::new(FRACTION.into(), self.records.iter().map(|r| r.fraction).collect::<Vec<_>>()));
        Ok(DataFrame::new(columns)?)
    }

    pub(crate) fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let ids = read_ids(df)?;
        let districts = csv::u32_values(df, DISTRICT)?;
        let fractions = csv::f64_values(df, FRACTION)?;
        ensure!(
            fractions.iter().all(|f| *f > 0.0 && *f <= 1.0),
            "[intersect::table] {FRACTION} values must lie in (0, 1]"
        );

        let records = ids.into_iter().zip(districts).zip(fractions)
            .map(|((precinct, district), fraction)| IntersectionRecord { precinct, district, fraction })
            .collect();
        Ok(Self::new(records))
    }
}

/// Precincts that received no intersection record, sorted by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingPrecincts {
    precincts: Vec<PrecinctIds>,
}

impl MissingPrecincts {
    pub fn new(mut precincts: Vec<PrecinctIds>) -> Self {
        precincts.sort_by(|a, b| a.id.cmp(&b.id));
        precincts.dedup_by(|a, b| a.id == b.id);
        Self { precincts }
    }

    #[inline] pub fn len(&self) -> usize { self.precincts.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.precincts.is_empty() }

    #[inline] pub fn precincts(&self) -> &[PrecinctIds] { &self.precincts }

    pub fn contains(&self, id: &str) -> bool {
        self.precincts.binary_search_by(|p| (*p.id).cmp(id)).is_ok()
    }

    pub(crate) fn to_dataframe(&self) -> Result<DataFrame> {
        Ok(DataFrame::new(id_columns(self.precincts.iter()))?)
    }

    pub(crate) fn from_dataframe(df: &DataFrame) -> Result<Self> {
        Ok(Self::new(read_ids(df)?))
    }
}

fn id_columns<'a>(precincts: impl Iterator<Item = &'a PrecinctIds> + Clone) -> Vec<Column> {
    let text = |name: &str, f: fn(&PrecinctIds) -> &str| {
        Column::new(name.into(), precincts.clone().map(f).collect::<Vec<_>>())
    };
    vec![
        text(PRECINCT_ID, |p| &*p.id),
        text(COUNTY_FIPS, |p| &*p.county_fips),
        text(MCD_FIPS, |p| p.key.mcd_fips()),
        text(WARD, |p| p.key.ward()),
        text(PRECINCT, |p| p.key.precinct()),
    ]
}

fn read_ids(df: &DataFrame) -> Result<Vec<PrecinctIds>> {
    let [ids, counties, mcds, wards, precincts] = ID_COLUMNS.map(|name| csv::string_values(df, name));
    let (ids, counties, mcds, wards, precincts) = (ids?, counties?, mcds?, wards?, precincts?);

    Ok((0..ids.len())
        .map(|i| PrecinctIds {
            id: Arc::from(ids[i].as_str()),
            county_fips: Arc::from(counties[i].as_str()),
            key: PrecinctKey::new(&mcds[i], &wards[i], &precincts[i]),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(id: &str) -> PrecinctIds {
        PrecinctIds::new(Some(id), "163", PrecinctKey::new("22000", "1", id))
    }

    fn record(id: &str, district: u32, fraction: f64) -> IntersectionRecord {
        IntersectionRecord { precinct: ids(id), district, fraction }
    }

    #[test]
    fn records_are_sorted_and_deduplicated() {
        let table = IntersectionTable::new(vec![
            record("002", 4, 0.5),
            record("001", 9, 1.0),
            record("002", 3, 0.5),
            record("002", 4, 0.5),
        ]);
        let keys = table.iter().map(|r| (r.precinct.id.to_string(), r.district)).collect::<Vec<_>>();
        assert_eq!(keys, vec![("001".into(), 9), ("002".into(), 3), ("002".into(), 4)]);
        assert_eq!(table.districts_of("002"), vec![(3, 0.5), (4, 0.5)]);
        assert!(table.districts_of("003").is_empty());
    }

    #[test]
    fn dataframe_columns_follow_the_persisted_layout() {
        let table = IntersectionTable::new(vec![record("001", 9, 0.25)]);
        let df = table.to_dataframe().unwrap();
        let names = df.get_column_names().iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(names, vec!["PRECINCTID", "COUNTYFIPS", "MCDFIPS", "WARD", "PRECINCT", "DISTRICTNO", "intersection"]);
        assert_eq!(IntersectionTable::from_dataframe(&df).unwrap(), table);
    }

    #[test]
    fn out_of_range_fractions_are_rejected() {
        let table = IntersectionTable::new(vec![record("001", 9, 1.5)]);
        let df = table.to_dataframe().unwrap();
        assert!(IntersectionTable::from_dataframe(&df).is_err());
    }

    #[test]
    fn missing_lookup() {
        let missing = MissingPrecincts::new(vec![ids("007"), ids("003"), ids("007")]);
        assert_eq!(missing.len(), 2);
        assert!(missing.contains("003"));
        assert!(!missing.contains("005"));
    }
}
