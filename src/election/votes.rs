use std::{fmt::Debug, hash::Hash, sync::Arc};

use ahash::AHashMap;
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    election::{
        files::{CandidateRow, CountyRow, MunicipalityRow, VoteRow},
        McdDirectory,
    },
    types::{Party, PartyVotes, PrecinctKey},
    Error,
};

/// Votes cast for one party in one precinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    pub key: PrecinctKey,
    pub county: Arc<str>,
    pub party: Party,
    pub votes: u64,
}

/// Precinct votes of one office, one record per (precinct key, party), sorted by key then party.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteTable {
    records: Vec<VoteRecord>,
}

impl VoteTable {
    /// Sum records sharing a (precinct key, party).
    pub fn new(mut records: Vec<VoteRecord>) -> Self {
        records.sort_by(|a, b| a.key.cmp(&b.key).then(a.party.cmp(&b.party)));
        let mut merged: Vec<VoteRecord> = Vec::with_capacity(records.len());
        for record in records {
            match merged.last_mut() {
                Some(last) if last.key == record.key && last.party == record.party => last.votes += record.votes,
                _ => merged.push(record),
            }
        }
        Self { records: merged }
    }

    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    #[inline] pub fn records(&self) -> &[VoteRecord] { &self.records }

    #[inline] pub fn iter(&self) -> impl Iterator<Item = &VoteRecord> { self.records.iter() }

    /// Statewide raw totals.
    pub fn totals(&self) -> PartyVotes<u64> {
        let mut totals = PartyVotes::default();
        for record in &self.records {
            *totals.get_mut(record.party) += record.votes;
        }
        totals
    }
}

/// Rows dropped while joining the result files, by the join that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub rows: usize,
    pub kept: usize,
    pub unknown_candidate: usize,
    pub unknown_municipality: usize,
    pub unknown_county: usize,
    pub unmatched_mcd_name: usize,
}

impl IngestReport {
    pub fn dropped(&self) -> usize {
        self.unknown_candidate + self.unknown_municipality + self.unknown_county + self.unmatched_mcd_name
    }
}

/// Index `items` by key, failing on the first repeated key.
pub(crate) fn unique_index<K, V>(table: &'static str, items: impl IntoIterator<Item = (K, V)>) -> Result<AHashMap<K, V>, Error>
where
    K: Eq + Hash + Debug,
{
    let mut index = AHashMap::new();
    for (key, value) in items {
        if index.contains_key(&key) {
            return Err(Error::DuplicateKey { table, key: format!("{key:?}") });
        }
        index.insert(key, value);
    }
    Ok(index)
}

/// Inputs of the vote join for one office.
pub(crate) struct VoteJoin<'a> {
    pub office: u32,
    pub candidates: &'a [CandidateRow],
    pub municipalities: &'a [MunicipalityRow],
    pub counties: &'a [CountyRow],
    pub directory: &'a McdDirectory,
    /// Keep only rows of this county (case-insensitive county name).
    pub county_filter: Option<&'a str>,
}

impl VoteJoin<'_> {
    /// Join precinct vote rows to candidates, municipalities, counties and MCD FIPS codes.
    pub(crate) fn run(&self, votes: &[VoteRow]) -> Result<(VoteTable, IngestReport)> {
        let candidates = unique_index("candidates", self.candidates.iter()
            .filter(|c| c.office == self.office)
            .map(|c| (c.candidate, c)))?;
        let municipalities = unique_index("municipalities", self.municipalities.iter()
            .map(|m| ((m.county, m.mcd), m.name.as_str())))?;
        let counties = unique_index("counties", self.counties.iter()
            .map(|c| (c.code, Arc::<str>::from(c.name.as_str()))))?;

        for candidate in candidates.values() {
            debug!("[election::votes] office {} candidate {} ({})", self.office, candidate.name, candidate.party);
        }

        let mut fips: AHashMap<(u32, u32), Option<Arc<str>>> = AHashMap::new();
        let mut report = IngestReport { rows: votes.len(), ..IngestReport::default() };
        let mut records = Vec::with_capacity(votes.len());

        for row in votes {
            let Some(candidate) = candidates.get(&row.candidate) else {
                report.unknown_candidate += 1;
                continue;
            };
            let Some(county) = counties.get(&row.county) else {
                report.unknown_county += 1;
                continue;
            };
            if self.county_filter.is_some_and(|wanted| !wanted.eq_ignore_ascii_case(county)) {
                continue;
            }
            let Some(name) = municipalities.get(&(row.county, row.mcd)) else {
                report.unknown_municipality += 1;
                continue;
            };

            let code = match fips.get(&(row.county, row.mcd)) {
                Some(code) => code.clone(),
                None => {
                    let code = self.directory.resolve(name, Some(&**county))?;
                    if code.is_none() {
                        debug!("[election::votes] no MCD code for {name} ({county})");
                    }
                    fips.insert((row.county, row.mcd), code.clone());
                    code
                }
            };
            let Some(code) = code else {
                report.unmatched_mcd_name += 1;
                continue;
            };

            records.push(VoteRecord {
                key: PrecinctKey::new(&code, &row.ward, &row.precinct),
                county: county.clone(),
                party: candidate.party,
                votes: row.votes,
            });
        }

        report.kept = records.len();
        if report.dropped() > 0 {
            warn!(
                "[election::votes] dropped {} of {} vote rows ({} candidate, {} municipality, {} county, {} MCD name)",
                report.dropped(), report.rows, report.unknown_candidate, report.unknown_municipality,
                report.unknown_county, report.unmatched_mcd_name,
            );
        }
        Ok((VoteTable::new(records), report))
    }
}
