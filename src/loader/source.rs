use std::{collections::BTreeSet, fs, path::{Path, PathBuf}, sync::LazyLock};

use regex::Regex;

/// File name prefix of the yearly voting precinct maps.
pub(crate) const PRECINCT_PREFIX: &str = "VotingPrecincts";

static PRECINCT_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^VotingPrecincts(\d{4})(\.zip|\.shp)?$").expect("static regex")
});

/// Locate `{stem}.zip`, `{stem}.shp` or a `{stem}/` directory under `dir`.
pub(crate) fn resolve_stem(dir: &Path, stem: &str) -> Option<PathBuf> {
    [format!("{stem}.zip"), format!("{stem}.shp"), stem.to_string()].into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Years for which a precinct map is present under `dir`.
pub(crate) fn available_precinct_years(dir: &Path) -> BTreeSet<u16> {
    let Ok(entries) = fs::read_dir(dir) else { return BTreeSet::new() };
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let captures = PRECINCT_FILE.captures(name.to_str()?)?;
            captures[1].parse().ok()
        })
        .collect()
}

/// Pick the available year closest to `year`; ties go to the later map.
pub(crate) fn nearest_year(year: u16, available: &BTreeSet<u16>) -> Option<u16> {
    available.iter().copied()
        .min_by_key(|&candidate| (candidate.abs_diff(year), std::cmp::Reverse(candidate)))
}
