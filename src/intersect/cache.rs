use std::{collections::BTreeMap, fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    common,
    intersect::{IntersectionOutput, IntersectionTable, MissingPrecincts, Tolerance, ID_COLUMNS},
    io::csv,
    types::UnitKey,
    Error,
};

const MANIFEST: &str = "manifest.json";
const MANIFEST_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FileHash {
    pub sha256: String,
}

/// What was persisted for one (year, chamber) unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Year of the precinct map the unit was computed from.
    pub precinct_year: u16,
    pub tolerance: f64,
    pub rows: usize,
    pub missing: usize,
    files: BTreeMap<String, FileHash>,
}

impl CacheEntry {
    /// Whether the entry was computed from `precinct_year` with `tolerance`.
    pub fn matches(&self, precinct_year: u16, tolerance: Tolerance) -> bool {
        self.precinct_year == precinct_year && (self.tolerance - tolerance.epsilon()).abs() < 1e-12
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    version: String,
    entries: BTreeMap<String, CacheEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self { version: MANIFEST_VERSION.into(), entries: BTreeMap::new() }
    }
}

/// Write-once store of intersection tables keyed by (year, chamber).
/// A key is present only once both of its files and their checksums have been recorded.
#[derive(Debug)]
pub struct IntersectionCache {
    dir: PathBuf,
    manifest: Manifest,
}

impl IntersectionCache {
    /// Open (creating if needed) the cache directory and read its manifest.
    pub fn open(dir: &Path) -> Result<Self> {
        common::ensure_dir_exists(dir)?;
        let path = dir.join(MANIFEST);
        let manifest = if path.exists() {
            let bytes = fs::read(&path)
                .with_context(|| format!("[intersect::cache] Failed to read {}", path.display()))?;
            serde_json::from_slice(&bytes)
                .with_context(|| format!("[intersect::cache] Failed to parse {}", path.display()))?
        } else {
            Manifest::default()
        };
        Ok(Self { dir: dir.to_path_buf(), manifest })
    }

    #[inline] pub fn dir(&self) -> &Path { &self.dir }

    #[inline] pub fn contains(&self, key: UnitKey) -> bool { self.manifest.entries.contains_key(&key.to_string()) }

    #[inline] pub fn entry(&self, key: UnitKey) -> Option<&CacheEntry> { self.manifest.entries.get(&key.to_string()) }

    /// Keys currently recorded in the manifest.
    pub fn keys(&self) -> Vec<String> { self.manifest.entries.keys().cloned().collect() }

    fn intersections_file(key: UnitKey) -> String { format!("{key}_intersections.csv") }

    fn missing_file(key: UnitKey) -> String { format!("{key}_missing_precincts.csv") }

    pub fn intersections_path(&self, key: UnitKey) -> PathBuf { self.dir.join(Self::intersections_file(key)) }

    pub fn missing_path(&self, key: UnitKey) -> PathBuf { self.dir.join(Self::missing_file(key)) }

    fn write_manifest(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.manifest)
            .context("[intersect::cache] Failed to serialize manifest")?;
        common::write_atomic(&self.dir.join(MANIFEST), &bytes)
    }

    /// Persist `output` under `key`, replacing any earlier entry.
    /// The entry is dropped from the manifest first and recorded again only after both files are written.
    pub fn store(&mut self, key: UnitKey, precinct_year: u16, tolerance: Tolerance, output: &IntersectionOutput) -> Result<()> {
        if self.manifest.entries.remove(&key.to_string()).is_some() {
            self.write_manifest()?;
        }

        let tables = [
            (Self::intersections_file(key), output.table.to_dataframe()?),
            (Self::missing_file(key), output.missing.to_dataframe()?),
        ];

        let mut files = BTreeMap::new();
        for (name, df) in tables {
            let bytes = csv::write_csv_bytes(&df)?;
            common::write_atomic(&self.dir.join(&name), &bytes)
                .with_context(|| format!("[intersect::cache] Failed to store {key}"))?;
            files.insert(name, FileHash { sha256: common::sha256_bytes(&bytes) });
        }

        self.manifest.entries.insert(key.to_string(), CacheEntry {
            precinct_year,
            tolerance: tolerance.epsilon(),
            rows: output.table.len(),
            missing: output.missing.len(),
            files,
        });
        self.write_manifest()?;
        info!("[intersect::cache] stored {key}: {} records, {} missing", output.table.len(), output.missing.len());
        Ok(())
    }

    /// Read a file of `key`, verifying its recorded checksum.
    fn read_verified(&self, key: UnitKey, name: &str) -> Result<Vec<u8>> {
        let entry = self.entry(key)
            .with_context(|| format!("[intersect::cache] {key} has not been computed"))?;
        let expected = entry.files.get(name)
            .with_context(|| format!("[intersect::cache] manifest entry {key} lists no {name}"))?;

        let path = self.dir.join(name);
        let bytes = fs::read(&path)
            .with_context(|| format!("[intersect::cache] Failed to read {}", path.display()))?;
        if common::sha256_bytes(&bytes) != expected.sha256 {
            return Err(Error::CacheChecksum { key, path }.into());
        }
        debug!("[intersect::cache] verified {}", path.display());
        Ok(bytes)
    }

    /// Load the intersection table of `key`.
    pub fn load_table(&self, key: UnitKey) -> Result<IntersectionTable> {
        let bytes = self.read_verified(key, &Self::intersections_file(key))?;
        IntersectionTable::from_dataframe(&csv::read_csv_bytes(&bytes, &ID_COLUMNS)?)
            .with_context(|| format!("[intersect::cache] Invalid intersection table for {key}"))
    }

    /// Load the missing-precinct report of `key`.
    pub fn load_missing(&self, key: UnitKey) -> Result<MissingPrecincts> {
        let bytes = self.read_verified(key, &Self::missing_file(key))?;
        MissingPrecincts::from_dataframe(&csv::read_csv_bytes(&bytes, &ID_COLUMNS)?)
            .with_context(|| format!("[intersect::cache] Invalid missing-precinct table for {key}"))
    }

    pub fn load(&self, key: UnitKey) -> Result<IntersectionOutput> {
        Ok(IntersectionOutput { table: self.load_table(key)?, missing: self.load_missing(key)? })
    }
}
