use std::path::PathBuf;

use thiserror::Error;

use crate::{election::Office, types::UnitKey};

/// Domain errors callers may want to match on. Everything else travels as `anyhow::Error`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no office label for {office} matches any office in {year}")]
    NoMatchingOffice { office: Office, year: u16 },

    #[error("labels for {office} in {year} match several office codes: {codes:?}")]
    AmbiguousOffice { office: Office, year: u16, codes: Vec<u32> },

    #[error("municipality {name:?} matches several MCD codes: {codes:?}")]
    AmbiguousMunicipality { name: String, codes: Vec<String> },

    #[error("duplicate key {key} in {table}")]
    DuplicateKey { table: &'static str, key: String },

    #[error("overlap fractions of precinct {key} add up to {total}")]
    OverlapExceedsPrecinct { key: String, total: f64 },

    #[error("district {0} appears more than once in the plan")]
    DuplicateDistrict(u32),

    #[error("overlap tolerance must lie in (0, 0.5), got {0}")]
    InvalidTolerance(f64),

    #[error("no precinct shapefile available for {0} or any fallback year")]
    NoPrecinctShapefile(u16),

    #[error("cached file {path} does not match the checksum recorded for {key}")]
    CacheChecksum { key: UnitKey, path: PathBuf },

    #[error("unknown chamber {0:?} (expected senate, house or congress)")]
    UnknownChamber(String),

    #[error("unknown office {0:?}")]
    UnknownOffice(String),
}
