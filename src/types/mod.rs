use serde::Serialize;

mod chamber;
mod party;
mod precinct_key;

pub use chamber::Chamber;
pub use party::{Party, PartyVotes};
pub use precinct_key::{PrecinctIds, PrecinctKey};

/// Cache key for one unit of intersection work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UnitKey {
    pub year: u16,
    pub chamber: Chamber,
}

impl UnitKey {
    pub fn new(year: u16, chamber: Chamber) -> Self { Self { year, chamber } }
}

impl std::fmt::Display for UnitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.year, self.chamber)
    }
}
