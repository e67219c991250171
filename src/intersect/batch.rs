use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::Config,
    intersect::{IntersectionCache, IntersectionEngine, IntersectionOutput, Tolerance},
    loader::{DistrictSet, GeometryLoader, PrecinctSet},
    types::{Chamber, UnitKey},
};

/// Units processed by one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub computed: Vec<UnitKey>,
    pub skipped: Vec<UnitKey>,
}

/// Compute every unit of `units` missing from `cache` (all of them with `force`), in order.
/// `precinct_year` resolves the precinct-map year of a unit and `compute` overlays it.
/// A cached unit computed with another ε or precinct-map year is recomputed.
/// The first failure aborts the run; units stored before it stay cached.
pub fn run_units<Y, F>(
    cache: &mut IntersectionCache,
    units: &[UnitKey],
    tolerance: Tolerance,
    force: bool,
    mut precinct_year: Y,
    mut compute: F,
) -> Result<BatchReport>
where
    Y: FnMut(UnitKey) -> Result<u16>,
    F: FnMut(UnitKey, u16) -> Result<IntersectionOutput>,
{
    let mut report = BatchReport::default();
    for &key in units {
        let map_year = precinct_year(key)
            .with_context(|| format!("[intersect::batch] Failed to resolve the precinct map of {key}"))?;

        if !force {
            match cache.entry(key) {
                Some(entry) if entry.matches(map_year, tolerance) => {
                    info!("[intersect::batch] {key} already cached");
                    report.skipped.push(key);
                    continue;
                }
                Some(entry) => warn!(
                    "[intersect::batch] {key} was cached with precinct map {} and tolerance {}, \
                     recomputing with {} and {}",
                    entry.precinct_year, entry.tolerance, map_year, tolerance.epsilon(),
                ),
                None => {}
            }
        }

        let output = compute(key, map_year)
            .with_context(|| format!("[intersect::batch] Failed to compute {key}"))?;
        cache.store(key, map_year, tolerance, &output)?;
        report.computed.push(key);
    }
    Ok(report)
}

/// Run the batch over `units` using the configured inputs and cache directory.
/// Plans and precinct maps are loaded once and shared between units.
pub fn run_batch(config: &Config, units: &[UnitKey], force: bool) -> Result<BatchReport> {
    let tolerance = config.tolerance()?;
    let engine = IntersectionEngine::new(tolerance);
    let loader = GeometryLoader::new(config);
    let mut cache = IntersectionCache::open(&config.cache_dir)?;

    let mut plans: HashMap<Chamber, DistrictSet> = HashMap::new();
    let mut maps: HashMap<u16, PrecinctSet> = HashMap::new();

    run_units(&mut cache, units, tolerance, force, |key| loader.precinct_year(key.year), |key, map_year| {
        if !plans.contains_key(&key.chamber) {
            plans.insert(key.chamber, loader.load_districts(key.chamber)?);
        }
        if !maps.contains_key(&map_year) {
            maps.insert(map_year, loader.load_precincts(key.year)?);
        }
        Ok(engine.compute(&plans[&key.chamber], &maps[&map_year]))
    })
}
