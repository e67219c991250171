pub mod compare;
pub mod counties;
pub mod intersect;
pub mod summary;

use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;

use crate::{
    apportion::{apportion, ApportionReport, DistrictSummary, Precision},
    cli::{Cli, OutputArgs},
    config::Config,
    election::{ElectionData, IngestReport, McdDirectory, Office},
    intersect::{run_batch, IntersectionCache},
    types::{Chamber, UnitKey},
};

/// Configuration from `--config` (or defaults) with command-line overrides applied.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(root) = &cli.source_root { config.source_root = root.clone(); }
    if let Some(dir) = &cli.cache_dir { config.cache_dir = dir.clone(); }
    if let Some(tolerance) = cli.tolerance { config.tolerance = tolerance; }
    config.validate()?;
    Ok(config)
}

impl OutputArgs {
    /// Reject stdout and refuse to clobber files unless `--force` is given.
    pub(crate) fn check(&self) -> Result<&Path> {
        if self.output == Path::new("-") { bail!("stdout is not supported."); }
        if self.output.exists() && !self.force {
            bail!("{} already exists (use --force to overwrite)", self.output.display());
        }
        Ok(&self.output)
    }

    pub(crate) fn precision(&self) -> Precision {
        if self.percent { Precision::Percent } else { Precision::Fraction }
    }
}

/// District summaries of one election plus the join statistics behind them.
#[derive(Debug, Clone)]
pub(crate) struct DistrictRun {
    pub rows: Vec<DistrictSummary>,
    pub ingest: IngestReport,
    pub report: ApportionReport,
}

/// Apportion `office` in `year` to the districts of `chamber`, computing the intersections if needed.
pub(crate) fn district_summaries(
    config: &Config,
    year: u16,
    office: Office,
    chamber: Chamber,
    precision: Precision,
) -> Result<DistrictRun> {
    let key = UnitKey::new(year, chamber);
    run_batch(config, &[key], false)?;
    let table = IntersectionCache::open(&config.cache_dir)?.load_table(key)?;

    let data = ElectionData::load(config, year)?;
    let directory = McdDirectory::load(config)?;
    let (votes, ingest) = data.vote_table(&config.offices, office, &directory, None)?;

    let apportioned = apportion(&votes, &table, config.tolerance()?)?;
    info!(
        "[commands] {office} {year} by {chamber}: {} districts, {} unmatched vote records",
        apportioned.districts.len(), apportioned.report.unmatched,
    );
    Ok(DistrictRun { rows: apportioned.summaries(precision), ingest, report: apportioned.report })
}

/// One-line account of the vote rows lost in joins, printed next to the output path.
pub(crate) fn join_note(ingest: &IngestReport, report: Option<&ApportionReport>) -> String {
    let mut note = format!("{} of {} vote rows dropped at ingest", ingest.dropped(), ingest.rows);
    if let Some(report) = report {
        note.push_str(&format!(
            ", {} vote records ({} votes) matched no precinct",
            report.unmatched, report.unmatched_votes,
        ));
    }
    note
}
