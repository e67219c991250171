//! Michigan Secretary of State result files → normalized precinct vote tables.

mod files;
mod municipality;
mod office;
mod votes;

use anyhow::{Context, Result};
use tracing::info;

pub use municipality::{normalize_mcd_name, McdDirectory, McdEntry};
pub use office::{Office, OfficeCatalog, OfficeLabels, YearLabels};
pub use votes::{IngestReport, VoteRecord, VoteTable};

use crate::config::Config;
use files::{CandidateRow, CountyRow, MunicipalityRow, OfficeRow, ResultFiles};
use votes::VoteJoin;

/// Lookup tables of one election year. Vote rows are read per office on demand.
#[derive(Debug, Clone)]
pub struct ElectionData {
    year: u16,
    files: ResultFiles,
    offices: Vec<OfficeRow>,
    candidates: Vec<CandidateRow>,
    municipalities: Vec<MunicipalityRow>,
    counties: Vec<CountyRow>,
}

impl ElectionData {
    /// Read the office, candidate, municipality and county files of `year`.
    pub fn load(config: &Config, year: u16) -> Result<Self> {
        let files = ResultFiles::new(config.results_root(year), year);
        let data = Self {
            year,
            offices: files.offices()?,
            candidates: files.candidates()?,
            municipalities: files.municipalities()?,
            counties: files.counties()?,
            files,
        };
        info!(
            "[election] {year}: {} offices, {} candidates, {} municipalities, {} counties",
            data.offices.len(), data.candidates.len(), data.municipalities.len(), data.counties.len(),
        );
        Ok(data)
    }

    #[inline] pub fn year(&self) -> u16 { self.year }

    /// Office code of `office` in this year's files.
    pub fn office_code(&self, catalog: &OfficeCatalog, office: Office) -> Result<u32> {
        let code = catalog.resolve(office, self.year, self.offices.iter().map(|row| (row.code, row.desc.as_str())))?;
        Ok(code)
    }

    /// Precinct votes cast for `office`, keyed by MCD FIPS, ward and precinct.
    /// With `county`, only that county's rows are kept.
    pub fn vote_table(
        &self,
        catalog: &OfficeCatalog,
        office: Office,
        directory: &McdDirectory,
        county: Option<&str>,
    ) -> Result<(VoteTable, IngestReport)> {
        let code = self.office_code(catalog, office)?;
        let votes = self.files.votes(code)?;
        let join = VoteJoin {
            office: code,
            candidates: &self.candidates,
            municipalities: &self.municipalities,
            counties: &self.counties,
            directory,
            county_filter: county,
        };
        let (table, report) = join.run(&votes)
            .with_context(|| format!("[election] Failed to join {office} votes for {}", self.year))?;
        info!("[election] {office} {}: {} precinct/party records from {} rows", self.year, table.len(), report.rows);
        Ok((table, report))
    }
}
