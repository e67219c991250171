mod district;
mod precinct;
mod source;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub use district::DistrictSet;
pub use precinct::PrecinctSet;
pub(crate) use source::resolve_stem;
use source::{available_precinct_years, nearest_year, PRECINCT_PREFIX};

use crate::{common, config::Config, types::Chamber, Error};

/// Resolves and reads district plans and precinct maps under the configured shapefile root.
#[derive(Debug, Clone, Copy)]
pub struct GeometryLoader<'a> {
    config: &'a Config,
}

impl<'a> GeometryLoader<'a> {
    pub fn new(config: &'a Config) -> Self { Self { config } }

    /// Path of the plan shapefile for `chamber`.
    pub fn district_path(&self, chamber: Chamber) -> Result<PathBuf> {
        let root = self.config.shapefile_root();
        common::require_dir_exists(&root)?;
        let stem = self.config.plans.stem(chamber);
        resolve_stem(&root, stem)
            .with_context(|| format!("[loader] No {chamber} plan {stem} under {}", root.display()))
    }

    /// Load the district polygons of `chamber`'s plan.
    pub fn load_districts(&self, chamber: Chamber) -> Result<DistrictSet> {
        let path = self.district_path(chamber)?;
        let districts = DistrictSet::from_shapefile(chamber, &path)?;
        info!("[loader] Loaded {} {} districts from {}", districts.len(), chamber, path.display());
        Ok(districts)
    }

    /// Year of the precinct map used for the `year` election.
    /// An explicit fallback wins, then the year's own map, then the nearest available map.
    pub fn precinct_year(&self, year: u16) -> Result<u16> {
        let root = self.config.shapefile_root();
        if let Some(fallback) = self.config.fallback_for(year) {
            return Ok(fallback);
        }

        let available = available_precinct_years(&root);
        let resolved = nearest_year(year, &available).ok_or(Error::NoPrecinctShapefile(year))?;
        if resolved != year {
            warn!("[loader] No precinct map for {year}; using {resolved} instead");
        }
        Ok(resolved)
    }

    /// Load the precinct map serving the `year` election.
    pub fn load_precincts(&self, year: u16) -> Result<PrecinctSet> {
        let map_year = self.precinct_year(year)?;
        let root = self.config.shapefile_root();
        let path = resolve_stem(&root, &format!("{PRECINCT_PREFIX}{map_year}"))
            .ok_or(Error::NoPrecinctShapefile(map_year))?;

        let precincts = PrecinctSet::from_shapefile(map_year, &path)?;
        info!("[loader] Loaded {} precincts ({map_year} map) for {year} from {}", precincts.len(), path.display());
        Ok(precincts)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;

    use geo::{polygon, MultiPolygon};
    use shapefile::dbase::{FieldValue, Record, TableWriterBuilder};

    use super::*;
    use crate::common::geo_to_shp;

    pub(crate) fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y), (x: x + size, y: y), (x: x + size, y: y + size), (x: x, y: y + size), (x: x, y: y),
        ]])
    }

    pub(crate) fn write_plan(path: &Path, districts: &[(u32, MultiPolygon<f64>)]) {
        let table = TableWriterBuilder::new()
            .add_numeric_field("DISTRICTNO".try_into().unwrap(), 10, 0);
        let mut writer = shapefile::Writer::from_path(path, table).unwrap();
        for (number, shape) in districts {
            let mut record = Record::default();
            record.insert("DISTRICTNO".into(), FieldValue::Numeric(Some(f64::from(*number))));
            writer.write_shape_and_record(&geo_to_shp(shape), &record).unwrap();
        }
    }

    /// Precinct map using the legacy field names (no PRECINCTID column).
    pub(crate) fn write_precincts(path: &Path, precincts: &[(&str, &str, &str, &str, MultiPolygon<f64>)]) {
        let table = TableWriterBuilder::new()
            .add_character_field("CountyFips".try_into().unwrap(), 3)
            .add_character_field("Jurisdicti".try_into().unwrap(), 5)
            .add_character_field("Ward".try_into().unwrap(), 2)
            .add_character_field("Precinct".try_into().unwrap(), 3);
        let mut writer = shapefile::Writer::from_path(path, table).unwrap();
        for (county, mcd, ward, precinct, shape) in precincts {
            let mut record = Record::default();
            record.insert("CountyFips".into(), FieldValue::Character(Some(county.to_string())));
            record.insert("Jurisdicti".into(), FieldValue::Character(Some(mcd.to_string())));
            record.insert("Ward".into(), FieldValue::Character(Some(ward.to_string())));
            record.insert("Precinct".into(), FieldValue::Character(Some(precinct.to_string())));
            writer.write_shape_and_record(&geo_to_shp(shape), &record).unwrap();
        }
    }

    fn config(root: &Path) -> Config {
        Config { source_root: root.to_path_buf(), fallback_years: vec![], ..Config::default() }
    }

    #[test]
    fn loads_plan_from_shapefile() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        std::fs::create_dir_all(config.shapefile_root()).unwrap();
        write_plan(
            &config.shapefile_root().join("StateSenate-FinalPlanLinden.shp"),
            &[(1, square(0.0, 0.0, 1.0)), (2, square(1.0, 0.0, 1.0))],
        );

        let districts = GeometryLoader::new(&config).load_districts(Chamber::StateSenate).unwrap();
        assert_eq!(districts.numbers(), &[1, 2]);
        assert_eq!(districts.chamber(), Chamber::StateSenate);
    }

    #[test]
    fn missing_plan_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        std::fs::create_dir_all(config.shapefile_root()).unwrap();
        assert!(GeometryLoader::new(&config).load_districts(Chamber::StateHouse).is_err());
    }

    #[test]
    fn precincts_fall_back_to_nearest_year() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        std::fs::create_dir_all(config.shapefile_root()).unwrap();
        write_precincts(
            &config.shapefile_root().join("VotingPrecincts2018.shp"),
            &[("163", "22000", "1", "4", square(0.0, 0.0, 1.0))],
        );

        let loader = GeometryLoader::new(&config);
        assert_eq!(loader.precinct_year(2016).unwrap(), 2018);

        let precincts = loader.load_precincts(2016).unwrap();
        assert_eq!(precincts.year(), 2018);
        assert_eq!(&*precincts.ids()[0].id, "WP-163-22000-01004");
    }

    #[test]
    fn explicit_fallback_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            fallback_years: vec![crate::config::YearFallback { year: 2016, precincts: 2014 }],
            ..config(tmp.path())
        };
        std::fs::create_dir_all(config.shapefile_root()).unwrap();
        std::fs::write(config.shapefile_root().join("VotingPrecincts2016.zip"), "").unwrap();
        assert_eq!(GeometryLoader::new(&config).precinct_year(2016).unwrap(), 2014);
    }

    #[test]
    fn no_precinct_maps_at_all() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        let err = GeometryLoader::new(&config).precinct_year(2018).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoPrecinctShapefile(2018))));
    }
}
