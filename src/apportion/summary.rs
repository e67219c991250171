use std::fmt;

use anyhow::Result;
use polars::prelude::Column;
use serde::Serialize;

use crate::types::PartyVotes;

/// How shares and margins are rounded in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Precision {
    /// Fractions rounded to 3 decimals (0.164).
    #[default]
    Fraction,
    /// Percentages rounded to 1 decimal (16.4).
    Percent,
}

impl Precision {
    pub fn apply(&self, share: f64) -> f64 {
        match self {
            Precision::Fraction => round_to(share, 3),
            Precision::Percent => round_to(share * 100.0, 1),
        }
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Winner {
    Dem,
    Rep,
    Tie,
}

impl Winner {
    pub fn to_str(&self) -> &'static str {
        match self {
            Winner::Dem => "d",
            Winner::Rep => "r",
            Winner::Tie => "tie",
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Two-party margin as a label: "D+16.4", "R+12.0" or "EVEN".
pub fn margin_label(margin: f64) -> String {
    if margin > 0.0 {
        format!("D+{:.1}", margin * 100.0)
    } else if margin < 0.0 {
        format!("R+{:.1}", -margin * 100.0)
    } else {
        "EVEN".to_string()
    }
}

/// Vote totals with their shares, margin and winner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteSummary {
    pub dvot: f64,
    pub rvot: f64,
    pub ovot: f64,
    pub totalvot: f64,
    pub dvs: f64,
    pub rvs: f64,
    pub ovs: f64,
    /// Democratic share minus Republican share.
    pub margin: f64,
    pub margin_text: String,
    pub winner: Winner,
}

impl VoteSummary {
    pub fn new(votes: PartyVotes<f64>, precision: Precision) -> Self {
        let total = votes.total();
        let share = |v: f64| if total > 0.0 { v / total } else { 0.0 };
        let margin = share(votes.dem) - share(votes.rep);
        let winner = if votes.dem > votes.rep {
            Winner::Dem
        } else if votes.rep > votes.dem {
            Winner::Rep
        } else {
            Winner::Tie
        };

        Self {
            dvot: votes.dem,
            rvot: votes.rep,
            ovot: votes.oth,
            totalvot: total,
            dvs: precision.apply(share(votes.dem)),
            rvs: precision.apply(share(votes.rep)),
            ovs: precision.apply(share(votes.oth)),
            margin: precision.apply(margin),
            margin_text: margin_label(margin),
            winner,
        }
    }
}

/// Metric columns shared by district and county reports.
pub(crate) fn summary_columns<'a>(summaries: impl Iterator<Item = &'a VoteSummary> + Clone) -> Vec<Column> {
    let number = |name: &str, f: fn(&VoteSummary) -> f64| {
        Column::new(name.into(), summaries.clone().map(f).collect::<Vec<_>>())
    };
    vec![
        number("dvot", |s| s.dvot),
        number("rvot", |s| s.rvot),
        number("ovot", |s| s.ovot),
        number("totalvot", |s| s.totalvot),
        number("dvs", |s| s.dvs),
        number("rvs", |s| s.rvs),
        number("ovs", |s| s.ovs),
        number("margin", |s| s.margin),
        Column::new("margin_text".into(), summaries.clone().map(|s| s.margin_text.as_str()).collect::<Vec<_>>()),
        Column::new("winner".into(), summaries.map(|s| s.winner.to_str()).collect::<Vec<_>>()),
    ]
}

/// Apportioned totals of one district.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictSummary {
    pub district: u32,
    #[serde(flatten)]
    pub summary: VoteSummary,
}

/// District report as a DataFrame with a leading DISTRICTNO column.
pub fn districts_to_dataframe(rows: &[DistrictSummary]) -> Result<polars::frame::DataFrame> {
    let mut columns = vec![Column::new("DISTRICTNO".into(), rows.iter().map(|r| r.district).collect::<Vec<_>>())];
    columns.extend(summary_columns(rows.iter().map(|r| &r.summary)));
    Ok(polars::frame::DataFrame::new(columns)?)
}
