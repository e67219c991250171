use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{election::OfficeCatalog, intersect::Tolerance, types::{Chamber, UnitKey}};

/// Precinct year served by another year's precinct map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearFallback {
    pub year: u16,
    pub precincts: u16,
}

/// Shapefile stems (without extension) of the district plan used for each chamber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanFiles {
    pub senate: String,
    pub house: String,
    pub congress: String,
}

impl Default for PlanFiles {
    fn default() -> Self {
        Self {
            senate: "StateSenate-FinalPlanLinden".into(),
            house: "StateHouse-FinalPlanHickory".into(),
            congress: "Congressional-FinalPlanChestnut".into(),
        }
    }
}

impl PlanFiles {
    pub fn stem(&self, chamber: Chamber) -> &str {
        match chamber {
            Chamber::StateSenate => &self.senate,
            Chamber::StateHouse => &self.house,
            Chamber::Congressional => &self.congress,
        }
    }
}

/// Layout of the tabular election inputs under the source root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionFiles {
    /// Directory holding one sub-directory of result files per year.
    pub results_dir: PathBuf,
    /// Shapefile stem of the minor civil division directory.
    pub mcd_directory: String,
    /// Optional dBase field holding the county name of each MCD, used to disambiguate names.
    pub mcd_county_field: Option<String>,
}

impl Default for ElectionFiles {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("MichiganElectionResults/General"),
            mcd_directory: "MinorCivilDivisions".into(),
            mcd_county_field: None,
        }
    }
}

/// Explicit run configuration passed to the loader, engine and aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of all raw inputs.
    pub source_root: PathBuf,
    /// Shapefile directory, relative to `source_root`.
    pub shapefile_dir: PathBuf,
    /// Where intersection tables are persisted.
    pub cache_dir: PathBuf,
    /// Overlap tolerance ε.
    pub tolerance: f64,
    /// Election years processed by the batch driver.
    pub years: Vec<u16>,
    /// Chambers processed by the batch driver.
    pub chambers: Vec<Chamber>,
    pub fallback_years: Vec<YearFallback>,
    pub plans: PlanFiles,
    pub election: ElectionFiles,
    pub offices: OfficeCatalog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("data"),
            shapefile_dir: PathBuf::from("MichiganShapefiles"),
            cache_dir: PathBuf::from("intersections"),
            tolerance: Tolerance::DEFAULT.epsilon(),
            years: vec![2014, 2016, 2018],
            chambers: vec![Chamber::StateSenate, Chamber::StateHouse],
            fallback_years: vec![YearFallback { year: 2016, precincts: 2018 }],
            plans: PlanFiles::default(),
            election: ElectionFiles::default(),
            offices: OfficeCatalog::default(),
        }
    }
}

impl Config {
    /// Load a TOML configuration file; missing keys keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("[config] Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        Tolerance::new(self.tolerance)?;
        Ok(())
    }

    /// Validated overlap tolerance.
    pub fn tolerance(&self) -> Result<Tolerance> {
        Ok(Tolerance::new(self.tolerance)?)
    }

    /// Directory holding district and precinct shapefiles.
    #[inline] pub fn shapefile_root(&self) -> PathBuf { self.source_root.join(&self.shapefile_dir) }

    /// Directory holding the result files of `year`.
    #[inline]
    pub fn results_root(&self, year: u16) -> PathBuf {
        self.source_root.join(&self.election.results_dir).join(year.to_string())
    }

    /// Explicitly configured precinct-map year for `year`, if any.
    pub fn fallback_for(&self, year: u16) -> Option<u16> {
        self.fallback_years.iter()
            .find(|fallback| fallback.year == year)
            .map(|fallback| fallback.precincts)
    }

    /// Every (year, chamber) unit the batch driver is responsible for.
    pub fn units(&self) -> Vec<UnitKey> {
        self.years.iter()
            .flat_map(|&year| self.chambers.iter().map(move |&chamber| UnitKey::new(year, chamber)))
            .collect()
    }
}
