use std::{fmt, sync::Arc};

/// Left-pad an identifier with zeros to `width` after trimming whitespace.
fn zero_pad(value: &str, width: usize) -> Arc<str> {
    let value = value.trim();
    if value.len() < width {
        Arc::from(format!("{value:0>width$}"))
    } else {
        Arc::from(value)
    }
}

/// Geographic join key shared by vote records and intersection records.
/// MCD FIPS codes are unique statewide, so the county is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrecinctKey {
    mcd_fips: Arc<str>,
    ward: Arc<str>,
    precinct: Arc<str>,
}

impl PrecinctKey {
    pub const MCD_WIDTH: usize = 5;
    pub const WARD_WIDTH: usize = 2;
    pub const PRECINCT_WIDTH: usize = 3;

    /// Build a normalized key (MCD padded to 5, ward to 2, precinct to 3 digits).
    pub fn new(mcd_fips: &str, ward: &str, precinct: &str) -> Self {
        Self {
            mcd_fips: zero_pad(mcd_fips, Self::MCD_WIDTH),
            ward: zero_pad(ward, Self::WARD_WIDTH),
            precinct: zero_pad(precinct, Self::PRECINCT_WIDTH),
        }
    }

    #[inline] pub fn mcd_fips(&self) -> &str { &self.mcd_fips }

    #[inline] pub fn ward(&self) -> &str { &self.ward }

    #[inline] pub fn precinct(&self) -> &str { &self.precinct }
}

impl fmt::Display for PrecinctKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}{}", self.mcd_fips, self.ward, self.precinct)
    }
}

/// Identifying fields of a voting precinct: its id, county and join key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrecinctIds {
    pub id: Arc<str>,
    pub county_fips: Arc<str>,
    pub key: PrecinctKey,
}

impl PrecinctIds {
    pub const COUNTY_WIDTH: usize = 3;

    /// Build identifiers, synthesizing `WP-{county}-{mcd}-{ward}{precinct}` when no id is given.
    pub fn new(id: Option<&str>, county_fips: &str, key: PrecinctKey) -> Self {
        let county_fips = zero_pad(county_fips, Self::COUNTY_WIDTH);
        let id = match id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => Arc::from(id),
            None => Self::synthetic_id(&county_fips, &key),
        };
        Self { id, county_fips, key }
    }

    /// Deterministic fallback identifier for precinct datasets without `PRECINCTID`.
    pub fn synthetic_id(county_fips: &str, key: &PrecinctKey) -> Arc<str> {
        Arc::from(format!("WP-{}-{}-{}{}", county_fips, key.mcd_fips(), key.ward(), key.precinct()))
    }
}
