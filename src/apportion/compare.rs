use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::{Column, DataFrame};
use serde::Serialize;

use crate::apportion::{summary::round_to, DistrictSummary, Winner};

/// Margins of one district in two elections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginComparison {
    pub district: u32,
    pub margin_a: f64,
    pub winner_a: Winner,
    pub margin_b: f64,
    pub winner_b: Winner,
    /// Mean of both margins, rounded to 2 decimals.
    pub margin_avg: f64,
}

/// Pair districts present in both reports.
pub fn compare_margins(a: &[DistrictSummary], b: &[DistrictSummary]) -> Vec<MarginComparison> {
    let b = b.iter().map(|row| (row.district, row)).collect::<BTreeMap<_, _>>();
    let mut rows = a.iter()
        .filter_map(|row_a| {
            let row_b = b.get(&row_a.district)?;
            Some(MarginComparison {
                district: row_a.district,
                margin_a: row_a.summary.margin,
                winner_a: row_a.summary.winner,
                margin_b: row_b.summary.margin,
                winner_b: row_b.summary.winner,
                margin_avg: round_to((row_a.summary.margin + row_b.summary.margin) / 2.0, 2),
            })
        })
        .collect::<Vec<_>>();
    rows.sort_by_key(|row| row.district);
    rows
}

pub fn comparisons_to_dataframe(rows: &[MarginComparison]) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        Column::new("DISTRICTNO".into(), rows.iter().map(|r| r.district).collect::<Vec<_>>()),
        Column::new("margin_a".into(), rows.iter().map(|r| r.margin_a).collect::<Vec<_>>()),
        Column::new("winner_a".into(), rows.iter().map(|r| r.winner_a.to_str()).collect::<Vec<_>>()),
        Column::new("margin_b".into(), rows.iter().map(|r| r.margin_b).collect::<Vec<_>>()),
        Column::new("winner_b".into(), rows.iter().map(|r| r.winner_b.to_str()).collect::<Vec<_>>()),
        Column::new("margin_avg".into(), rows.iter().map(|r| r.margin_avg).collect::<Vec<_>>()),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{apportion::{Precision, VoteSummary}, types::PartyVotes};

    fn row(district: u32, dem: f64, rep: f64) -> DistrictSummary {
        DistrictSummary { district, summary: VoteSummary::new(PartyVotes { dem, rep, oth: 0.0 }, Precision::Fraction) }
    }

    #[test]
    fn joins_on_district_and_averages() {
        let a = vec![row(2, 22.0, 28.0), row(1, 128.0, 92.0), row(5, 1.0, 0.0)];
        let b = vec![row(1, 60.0, 40.0), row(2, 30.0, 20.0)];
        let rows = compare_margins(&a, &b);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].district, 1);
        assert_eq!(rows[0].margin_avg, 0.18);
        assert_eq!(rows[1].winner_a, Winner::Rep);
        assert_eq!(rows[1].winner_b, Winner::Dem);
        assert_eq!(rows[1].margin_avg, 0.04);
        assert_eq!(comparisons_to_dataframe(&rows).unwrap().width(), 6);
    }
}
