use std::sync::Arc;

use apportion::{
    apportion::{apportion, compare_margins, county_totals, Precision, Winner},
    election::{VoteRecord, VoteTable},
    intersect::{IntersectionEngine, IntersectionRecord, IntersectionTable, Tolerance},
    loader::{DistrictSet, PrecinctSet},
    types::{Chamber, Party, PrecinctIds, PrecinctKey},
};
use geo::{polygon, MultiPolygon};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn key(precinct: &str) -> PrecinctKey {
    PrecinctKey::new("34000", "0", precinct)
}

fn overlap(precinct: &str, district: u32, fraction: f64) -> IntersectionRecord {
    IntersectionRecord { precinct: PrecinctIds::new(None, "81", key(precinct)), district, fraction }
}

fn votes(precinct: &str, county: &str, dem: u64, rep: u64, oth: u64) -> Vec<VoteRecord> {
    [(Party::Dem, dem), (Party::Rep, rep), (Party::Oth, oth)].into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(party, count)| VoteRecord { key: key(precinct), county: Arc::from(county), party, votes: count })
        .collect()
}

/// Precinct A lies in district 1, B is split 70/30 between districts 1 and 2, C lies in district 2.
fn scenario() -> (VoteTable, IntersectionTable) {
    let table = IntersectionTable::new(vec![
        overlap("A", 1, 1.0),
        overlap("B", 1, 0.7),
        overlap("B", 2, 0.3),
        overlap("C", 2, 1.0),
    ]);
    let votes = VoteTable::new([
        votes("A", "KENT", 100, 50, 0),
        votes("B", "KENT", 40, 60, 0),
        votes("C", "OTTAWA", 10, 10, 0),
    ].concat());
    (votes, table)
}

#[test]
fn scenario_district_margins() {
    let (votes, table) = scenario();
    let rows = apportion(&votes, &table, Tolerance::DEFAULT).unwrap().summaries(Precision::Fraction);
    assert_eq!(rows.len(), 2);

    let d1 = &rows[0].summary;
    assert_eq!(rows[0].district, 1);
    assert!(close(d1.dvot, 128.0) && close(d1.rvot, 92.0), "district 1 got {} / {}", d1.dvot, d1.rvot);
    assert!(close(d1.margin, 0.164));
    assert_eq!(d1.margin_text, "D+16.4");
    assert_eq!(d1.winner, Winner::Dem);

    let d2 = &rows[1].summary;
    assert_eq!(rows[1].district, 2);
    assert!(close(d2.dvot, 22.0) && close(d2.rvot, 28.0), "district 2 got {} / {}", d2.dvot, d2.rvot);
    assert!(close(d2.margin, -0.12));
    assert_eq!(d2.margin_text, "R+12.0");
    assert_eq!(d2.winner, Winner::Rep);
}

#[test]
fn precinct_split_across_records_is_counted_once() {
    let square = |x: f64| MultiPolygon(vec![polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0), (x: x, y: 0.0)]]);
    let plan = DistrictSet::new(Chamber::StateHouse, vec![(1, square(0.0)), (2, square(5.0))]).unwrap();
    let part = || PrecinctIds::new(None, "1", PrecinctKey::new("100", "01", "001"));
    let precincts = PrecinctSet::new(2018, vec![(part(), square(0.0)), (part(), square(5.0))]).unwrap();
    assert_eq!(precincts.len(), 1);

    let out = IntersectionEngine::default().compute(&plan, &precincts);
    let table = out.table;
    let districts = table.districts_of("WP-001-00100-01001");
    assert_eq!(districts.iter().map(|(d, _)| *d).collect::<Vec<_>>(), vec![1, 2]);
    assert!(districts.iter().all(|(_, fraction)| (fraction - 0.5).abs() < 1e-9));

    let votes = VoteTable::new(vec![VoteRecord {
        key: PrecinctKey::new("100", "1", "1"),
        county: Arc::from("KENT"),
        party: Party::Dem,
        votes: 100,
    }]);
    let apportioned = apportion(&votes, &table, Tolerance::DEFAULT).unwrap();
    let total: f64 = apportioned.districts.values().map(|v| v.dem).sum();
    assert!(close(total, 100.0), "100 votes became {total}");
}

#[test]
fn one_row_per_contributing_district_and_totals_are_weighted_sums() {
    let table = IntersectionTable::new(vec![
        overlap("A", 3, 0.7),
        overlap("A", 5, 0.3),
        overlap("B", 5, 1.0),
        overlap("Z", 9, 1.0),
    ]);
    let votes = VoteTable::new([votes("A", "KENT", 100, 50, 10), votes("B", "KENT", 1, 2, 3)].concat());
    let out = apportion(&votes, &table, Tolerance::DEFAULT).unwrap();

    assert_eq!(out.districts.keys().copied().collect::<Vec<_>>(), vec![3, 5]);
    let d3 = out.districts[&3];
    assert!((d3.dem - 70.0).abs() < 1e-9);
    assert!((d3.total() - 112.0).abs() < 1e-9);
    let d5 = out.districts[&5];
    assert!((d5.rep - (15.0 + 2.0)).abs() < 1e-9);
    assert!((d5.total() - (48.0 + 6.0)).abs() < 1e-9);
}

#[test]
fn shares_sum_to_one_within_rounding() {
    let table = IntersectionTable::new(vec![overlap("A", 1, 1.0), overlap("B", 1, 0.37), overlap("B", 2, 0.63)]);
    let votes = VoteTable::new([votes("A", "KENT", 311, 257, 41), votes("B", "KENT", 97, 133, 12)].concat());

    for row in apportion(&votes, &table, Tolerance::DEFAULT).unwrap().summaries(Precision::Fraction) {
        let sum = row.summary.dvs + row.summary.rvs + row.summary.ovs;
        assert!((sum - 1.0).abs() <= 0.0015, "district {} shares sum to {sum}", row.district);
    }
    for row in apportion(&votes, &table, Tolerance::DEFAULT).unwrap().summaries(Precision::Percent) {
        let sum = row.summary.dvs + row.summary.rvs + row.summary.ovs;
        assert!((sum - 100.0).abs() <= 0.15, "district {} shares sum to {sum}", row.district);
    }
}

#[test]
fn counties_use_raw_votes() {
    let (votes, _) = scenario();
    let rows = county_totals(&votes, Precision::Fraction);
    assert_eq!(rows.iter().map(|r| &*r.county).collect::<Vec<_>>(), vec!["KENT", "OTTAWA"]);
    assert_eq!((rows[0].summary.dvot, rows[0].summary.rvot), (140.0, 110.0));
    assert_eq!(rows[0].summary.winner, Winner::Dem);
    assert_eq!(rows[1].summary.winner, Winner::Tie);
    assert_eq!(rows[1].summary.margin_text, "EVEN");
}

#[test]
fn comparison_of_two_runs() {
    let (votes, table) = scenario();
    let rows = apportion(&votes, &table, Tolerance::DEFAULT).unwrap().summaries(Precision::Fraction);
    let compared = compare_margins(&rows, &rows);
    assert_eq!(compared.len(), 2);
    assert!(close(compared[0].margin_avg, 0.16));
    assert!(close(compared[1].margin_avg, -0.12));
}
