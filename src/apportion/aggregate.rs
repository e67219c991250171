use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::Serialize;
use smallvec::SmallVec;
use tracing::{info, warn};

use crate::{
    apportion::{DistrictSummary, Precision, VoteSummary},
    election::VoteTable,
    intersect::{IntersectionTable, Tolerance},
    types::{PartyVotes, PrecinctKey},
    Error,
};

/// Precinct key → (district, fraction) lookup built from an intersection table.
#[derive(Debug, Clone, Default)]
pub struct DistrictIndex<'a> {
    index: AHashMap<&'a PrecinctKey, SmallVec<[(u32, f64); 2]>>,
}

impl<'a> DistrictIndex<'a> {
    /// Fails when a (precinct key, district) pair occurs twice, or when the fractions of one
    /// key add up to more than 1 + ε (the key would hand out more votes than it has).
    pub fn new(table: &'a IntersectionTable, tolerance: Tolerance) -> Result<Self, Error> {
        let mut index: AHashMap<&PrecinctKey, SmallVec<[(u32, f64); 2]>> = AHashMap::new();
        for record in table.iter() {
            let districts = index.entry(&record.precinct.key).or_default();
            if districts.iter().any(|(district, _)| *district == record.district) {
                return Err(Error::DuplicateKey {
                    table: "intersections",
                    key: format!("{} / district {}", record.precinct.key, record.district),
                });
            }
            districts.push((record.district, record.fraction));
        }

        let limit = 1.0 + tolerance.epsilon();
        for (key, districts) in &index {
            let total: f64 = districts.iter().map(|(_, fraction)| fraction).sum();
            if total > limit {
                return Err(Error::OverlapExceedsPrecinct { key: key.to_string(), total });
            }
        }
        Ok(Self { index })
    }

    #[inline] pub fn len(&self) -> usize { self.index.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.index.is_empty() }

    /// Districts overlapping the precinct `key` (empty if unknown).
    pub fn districts(&self, key: &PrecinctKey) -> &[(u32, f64)] {
        self.index.get(key).map(|d| d.as_slice()).unwrap_or(&[])
    }
}

/// Join statistics of one apportionment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApportionReport {
    pub vote_records: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub unmatched_votes: u64,
}

/// Apportioned party totals per district.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Apportionment {
    pub districts: BTreeMap<u32, PartyVotes<f64>>,
    pub report: ApportionReport,
}

impl Apportionment {
    /// One summary row per district that received any precinct, by district number.
    pub fn summaries(&self, precision: Precision) -> Vec<DistrictSummary> {
        self.districts.iter()
            .map(|(&district, &votes)| DistrictSummary { district, summary: VoteSummary::new(votes, precision) })
            .collect()
    }
}

/// Split every precinct's votes across its districts by overlap fraction and sum per district.
/// Vote records whose precinct has no intersection are dropped and counted.
/// `tolerance` is the ε the table was computed with.
pub fn apportion(votes: &VoteTable, table: &IntersectionTable, tolerance: Tolerance) -> Result<Apportionment, Error> {
    let index = DistrictIndex::new(table, tolerance)?;
    let mut out = Apportionment::default();
    out.report.vote_records = votes.len();

    for record in votes.iter() {
        let districts = index.districts(&record.key);
        if districts.is_empty() {
            out.report.unmatched += 1;
            out.report.unmatched_votes += record.votes;
            continue;
        }
        out.report.matched += 1;
        for &(district, fraction) in districts {
            *out.districts.entry(district).or_default().get_mut(record.party) += record.votes as f64 * fraction;
        }
    }

    if out.report.unmatched > 0 {
        warn!(
            "[apportion] {} of {} vote records ({} votes) matched no precinct geometry",
            out.report.unmatched, out.report.vote_records, out.report.unmatched_votes,
        );
    }
    info!("[apportion] {} districts from {} matched vote records", out.districts.len(), out.report.matched);
    Ok(out)
}
