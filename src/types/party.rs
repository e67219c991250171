use std::{fmt, ops::{Add, AddAssign}};

/// Party bucket used for tallies. Every party code other than DEM and REP is folded into `Oth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Party {
    Dem,
    Rep,
    Oth,
}

impl Party {
    /// Normalize a raw party code from the candidate file.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "DEM" => Party::Dem,
            "REP" => Party::Rep,
            _ => Party::Oth,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Party::Dem => "DEM",
            Party::Rep => "REP",
            Party::Oth => "OTH",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Per-party vote triple, used for both raw counts and apportioned (fractional) totals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartyVotes<T> {
    pub dem: T,
    pub rep: T,
    pub oth: T,
}

impl<T: Copy + Add<Output = T>> PartyVotes<T> {
    #[inline] pub fn get_mut(&mut self, party: Party) -> &mut T {
        match party {
            Party::Dem => &mut self.dem,
            Party::Rep => &mut self.rep,
            Party::Oth => &mut self.oth,
        }
    }

    /// Sum over all parties.
    #[inline] pub fn total(&self) -> T { self.dem + self.rep + self.oth }
}

impl<T: Copy + Add<Output = T> + AddAssign> AddAssign for PartyVotes<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.dem += rhs.dem;
        self.rep += rhs.rep;
        self.oth += rhs.oth;
    }
}

impl PartyVotes<u64> {
    /// Scale integer counts by an overlap fraction.
    pub fn scaled(&self, fraction: f64) -> PartyVotes<f64> {
        PartyVotes {
            dem: self.dem as f64 * fraction,
            rep: self.rep as f64 * fraction,
            oth: self.oth as f64 * fraction,
        }
    }

    pub fn as_f64(&self) -> PartyVotes<f64> { self.scaled(1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_fold_into_other() {
        assert_eq!(Party::from_code("DEM"), Party::Dem);
        assert_eq!(Party::from_code(" rep "), Party::Rep);
        assert_eq!(Party::from_code("GRN"), Party::Oth);
        assert_eq!(Party::from_code(""), Party::Oth);
    }

    #[test]
    fn scaling_splits_each_party() {
        let votes = PartyVotes { dem: 40u64, rep: 60, oth: 0 };
        let scaled = votes.scaled(0.7);
        assert!((scaled.dem - 28.0).abs() < 1e-9);
        assert!((scaled.rep - 42.0).abs() < 1e-9);
        assert_eq!(scaled.oth, 0.0);
    }

    #[test]
    fn accumulate_and_total() {
        let mut acc = PartyVotes::<u64>::default();
        *acc.get_mut(Party::Dem) += 5;
        acc += PartyVotes { dem: 1, rep: 2, oth: 3 };
        assert_eq!(acc.dem, 6);
        assert_eq!(acc.total(), 11);
    }
}
