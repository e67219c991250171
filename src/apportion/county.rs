use std::{collections::BTreeMap, sync::Arc};

use anyhow::Result;
use polars::prelude::{Column, DataFrame};

use crate::{
    apportion::{summary::summary_columns, Precision, VoteSummary},
    election::VoteTable,
    types::PartyVotes,
};

/// Raw (unapportioned) totals of one county.
#[derive(Debug, Clone, PartialEq)]
pub struct CountySummary {
    pub county: Arc<str>,
    pub summary: VoteSummary,
}

/// Sum raw votes per county, ordered by county name.
pub fn county_totals(votes: &VoteTable, precision: Precision) -> Vec<CountySummary> {
    let mut totals: BTreeMap<Arc<str>, PartyVotes<u64>> = BTreeMap::new();
    for record in votes.iter() {
        *totals.entry(record.county.clone()).or_default().get_mut(record.party) += record.votes;
    }
    totals.into_iter()
        .map(|(county, votes)| CountySummary { county, summary: VoteSummary::new(votes.as_f64(), precision) })
        .collect()
}

pub fn counties_to_dataframe(rows: &[CountySummary]) -> Result<DataFrame> {
    let mut columns = vec![Column::new("county_name".into(), rows.iter().map(|r| &*r.county).collect::<Vec<_>>())];
    columns.extend(summary_columns(rows.iter().map(|r| &r.summary)));
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{election::VoteRecord, types::{Party, PrecinctKey}};

    fn vote(county: &str, precinct: &str, party: Party, votes: u64) -> VoteRecord {
        VoteRecord { key: PrecinctKey::new("100", "0", precinct), county: Arc::from(county), party, votes }
    }

    #[test]
    fn counties_are_summed_without_apportioning() {
        let votes = VoteTable::new(vec![
            vote("KENT", "1", Party::Dem, 30),
            vote("KENT", "2", Party::Dem, 10),
            vote("KENT", "2", Party::Rep, 60),
            vote("ALLEGAN", "3", Party::Oth, 5),
        ]);
        let rows = county_totals(&votes, Precision::Percent);
        assert_eq!(rows.len(), 2);
        assert_eq!(&*rows[0].county, "ALLEGAN");
        assert_eq!(rows[1].summary.totalvot, 100.0);
        assert_eq!(rows[1].summary.margin, -20.0);
        assert_eq!(rows[1].summary.margin_text, "R+20.0");
        assert_eq!(counties_to_dataframe(&rows).unwrap().height(), 2);
    }
}
