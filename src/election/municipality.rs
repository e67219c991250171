use std::{collections::{BTreeSet, HashMap}, sync::Arc};

use anyhow::{Context, Result};
use shapefile::dbase::Record;
use tracing::debug;

use crate::{common, config::Config, loader::resolve_stem, Error};

/// Abbreviations applied word by word before municipality names are compared.
const ABBREVIATIONS: [(&str, &str); 5] = [
    ("ST.", "ST"),
    ("STE.", "STE"),
    ("SAINT", "ST"),
    ("MT.", "MT"),
    ("MOUNT", "MT"),
];

/// Canonical form of a municipality name: upper-case, single-spaced, common abbreviations applied.
pub fn normalize_mcd_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let word = word.to_ascii_uppercase();
            ABBREVIATIONS.iter()
                .find(|(from, _)| *from == word)
                .map(|(_, to)| to.to_string())
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One minor civil division of the statewide directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McdEntry {
    pub fips: String,
    pub label: String,
    pub name: String,
    pub kind: String,
    pub county: Option<String>,
}

impl McdEntry {
    /// Names tried in order: the label, the bare name, then name and type ("ALPHA" + "CITY").
    fn names(&self) -> [String; 3] {
        [
            normalize_mcd_name(&self.label),
            normalize_mcd_name(&self.name),
            normalize_mcd_name(&format!("{} {}", self.name, self.kind)),
        ]
    }
}

/// Lookup from municipality names to MCD FIPS codes.
#[derive(Debug, Clone, Default)]
pub struct McdDirectory {
    /// One index per name form, in lookup order.
    tiers: [HashMap<String, Vec<usize>>; 3],
    entries: Vec<McdEntry>,
}

impl McdDirectory {
    pub fn new(entries: Vec<McdEntry>) -> Self {
        let mut tiers: [HashMap<String, Vec<usize>>; 3] = Default::default();
        for (i, entry) in entries.iter().enumerate() {
            for (tier, name) in tiers.iter_mut().zip(entry.names()) {
                if !name.is_empty() {
                    tier.entry(name).or_default().push(i);
                }
            }
        }
        Self { tiers, entries }
    }

    /// Build from the dBase table of the MCD shapefile.
    pub(crate) fn from_records(records: &[Record], county_field: Option<&str>) -> Result<Self> {
        let entries = records.iter().enumerate()
            .map(|(i, record)| {
                let text = |name: &str| common::get_text_field(record, &[name]).unwrap_or_default();
                let fips = common::get_text_field(record, &["FIPSCODE"])
                    .with_context(|| format!("[election::municipality] record {i} has no FIPSCODE"))?;
                Ok(McdEntry {
                    fips,
                    label: text("LABEL"),
                    name: text("NAME"),
                    kind: text("TYPE"),
                    county: county_field.and_then(|field| common::get_text_field(record, &[field])),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(entries))
    }

    /// Read the configured MCD directory shapefile.
    pub fn load(config: &Config) -> Result<Self> {
        let root = config.shapefile_root();
        let stem = &config.election.mcd_directory;
        let path = resolve_stem(&root, stem)
            .with_context(|| format!("[election::municipality] No MCD directory {stem} under {}", root.display()))?;
        let records = common::ShapefileSource::open(&path)?.read_records()?;
        let directory = Self::from_records(&records, config.election.mcd_county_field.as_deref())?;
        debug!("[election::municipality] {} MCD entries from {}", directory.len(), path.display());
        Ok(directory)
    }

    #[inline] pub fn len(&self) -> usize { self.entries.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// FIPS code of municipality `name` (restricted to `county` when entries carry counties).
    /// Returns `Ok(None)` when nothing matches and an error when the first matching name form
    /// points at several distinct codes.
    pub fn resolve(&self, name: &str, county: Option<&str>) -> Result<Option<Arc<str>>, Error> {
        let name = normalize_mcd_name(name);
        let in_county = |entry: &McdEntry| match (county, entry.county.as_deref()) {
            (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual.trim()),
            _ => true,
        };

        for tier in &self.tiers {
            let codes = tier.get(&name).into_iter().flatten()
                .map(|&i| &self.entries[i])
                .filter(|entry| in_county(entry))
                .map(|entry| entry.fips.as_str())
                .collect::<BTreeSet<_>>();

            match codes.len() {
                0 => continue,
                1 => return Ok(codes.into_iter().next().map(Arc::from)),
                _ => return Err(Error::AmbiguousMunicipality {
                    name,
                    codes: codes.into_iter().map(str::to_string).collect(),
                }),
            }
        }
        Ok(None)
    }
}
