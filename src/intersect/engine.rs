use geo::{Area, BooleanOps, BoundingRect, MultiPolygon, Relate};
use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::{
    geom::is_well_formed,
    intersect::{IntersectionRecord, IntersectionTable, MissingPrecincts, Tolerance},
    loader::{DistrictSet, PrecinctSet},
};

/// Result of overlaying one precinct map on one district plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntersectionOutput {
    pub table: IntersectionTable,
    pub missing: MissingPrecincts,
}

/// Why a precinct produced no intersection record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unmatched {
    InvalidGeometry,
    NoOverlap,
}

/// Computes precinct → district area fractions.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntersectionEngine {
    tolerance: Tolerance,
}

impl IntersectionEngine {
    pub fn new(tolerance: Tolerance) -> Self { Self { tolerance } }

    #[inline] pub fn tolerance(&self) -> Tolerance { self.tolerance }

    /// Overlay `precincts` on `districts`. Precincts are processed in parallel;
    /// output order does not depend on scheduling.
    pub fn compute(&self, districts: &DistrictSet, precincts: &PrecinctSet) -> IntersectionOutput {
        let outcomes = (0..precincts.len())
            .into_par_iter()
            .map(|i| self.overlaps(precincts.geometries().shape(i), districts))
            .collect::<Vec<_>>();

        let mut records = Vec::new();
        let mut missing = Vec::new();
        let (mut invalid, mut outside) = (0usize, 0usize);
        for (ids, outcome) in precincts.ids().iter().zip(outcomes) {
            match outcome {
                Ok(overlaps) => records.extend(overlaps.into_iter().map(|(district, fraction)| {
                    IntersectionRecord { precinct: ids.clone(), district, fraction }
                })),
                Err(reason) => {
                    match reason {
                        Unmatched::InvalidGeometry => invalid += 1,
                        Unmatched::NoOverlap => outside += 1,
                    }
                    debug!("[intersect] precinct {} has no district ({reason:?})", ids.id);
                    missing.push(ids.clone());
                }
            }
        }

        let output = IntersectionOutput {
            table: IntersectionTable::new(records),
            missing: MissingPrecincts::new(missing),
        };
        info!(
            "[intersect] {} {} districts x {} precincts ({}): {} records, {} missing ({} invalid, {} outside)",
            districts.len(), districts.chamber(), precincts.len(), precincts.year(),
            output.table.len(), output.missing.len(), invalid, outside,
        );
        output
    }

    /// Districts overlapping one precinct, in plan order.
    fn overlaps(&self, precinct: &MultiPolygon<f64>, districts: &DistrictSet) -> Result<SmallVec<[(u32, f64); 4]>, Unmatched> {
        if !is_well_formed(precinct) {
            return Err(Unmatched::InvalidGeometry);
        }
        let rect = precinct.bounding_rect().ok_or(Unmatched::InvalidGeometry)?;
        let area = precinct.unsigned_area();
        let geoms = districts.geometries();

        let mut found = SmallVec::new();
        for idx in geoms.candidates(&rect) {
            let district = geoms.shape(idx);

            // Containment assigns the whole precinct and ends the search.
            let may_contain = geoms.bbox(idx).is_some_and(|bbox| bbox.covers(&rect));
            if may_contain && precinct.relate(district).is_within() {
                found.clear();
                found.push((districts.number(idx), 1.0));
                break;
            }

            let ratio = precinct.intersection(district).unsigned_area() / area;
            if let Some(fraction) = self.tolerance.classify(ratio).fraction() {
                found.push((districts.number(idx), fraction));
            }
        }

        if found.is_empty() { Err(Unmatched::NoOverlap) } else { Ok(found) }
    }
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;
    use crate::types::{Chamber, PrecinctIds, PrecinctKey};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0)]])
    }

    fn precincts(shapes: Vec<MultiPolygon<f64>>) -> PrecinctSet {
        let items = shapes.into_iter().enumerate()
            .map(|(i, shape)| (PrecinctIds::new(None, "1", PrecinctKey::new("100", "1", &i.to_string())), shape))
            .collect();
        PrecinctSet::new(2018, items).unwrap()
    }

    #[test]
    fn contained_precinct_gets_single_full_record() {
        let districts = DistrictSet::new(Chamber::StateHouse, vec![(1, rect(0.0, 0.0, 10.0, 10.0)), (2, rect(10.0, 0.0, 20.0, 10.0))]).unwrap();
        let out = IntersectionEngine::default().compute(&districts, &precincts(vec![rect(2.0, 2.0, 3.0, 3.0)]));
        assert_eq!(out.table.districts_of(&out.table.records()[0].precinct.id), vec![(1, 1.0)]);
        assert!(out.missing.is_empty());
    }

    #[test]
    fn split_precinct_gets_partial_records() {
        let districts = DistrictSet::new(Chamber::StateHouse, vec![(1, rect(0.0, 0.0, 10.0, 10.0)), (2, rect(10.0, 0.0, 20.0, 10.0))]).unwrap();
        let out = IntersectionEngine::default().compute(&districts, &precincts(vec![rect(9.0, 0.0, 11.0, 1.0)]));
        let overlaps = out.table.districts_of(&out.table.records()[0].precinct.id);
        assert_eq!(overlaps.len(), 2);
        assert!((overlaps[0].1 - 0.5).abs() < 1e-9);
        assert!((overlaps[1].1 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn precinct_outside_every_district_is_missing() {
        let districts = DistrictSet::new(Chamber::StateSenate, vec![(1, rect(0.0, 0.0, 1.0, 1.0))]).unwrap();
        let out = IntersectionEngine::default().compute(&districts, &precincts(vec![rect(5.0, 5.0, 6.0, 6.0)]));
        assert!(out.table.is_empty());
        assert_eq!(out.missing.len(), 1);
    }
}
