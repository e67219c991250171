//! Apportioning precinct votes to districts and summarizing the totals.

mod aggregate;
mod compare;
mod county;
mod summary;

pub use aggregate::{apportion, Apportionment, ApportionReport, DistrictIndex};
pub use compare::{compare_margins, comparisons_to_dataframe, MarginComparison};
pub use county::{counties_to_dataframe, county_totals, CountySummary};
pub use summary::{districts_to_dataframe, margin_label, DistrictSummary, Precision, VoteSummary, Winner};
