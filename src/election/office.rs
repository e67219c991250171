use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Logical offices whose results can be apportioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Office {
    President,
    Governor,
    UsSenator,
    UsRepresentative,
    StateSenator,
    StateRepresentative,
}

impl Office {
    pub const ALL: [Office; 6] = [
        Office::President,
        Office::Governor,
        Office::UsSenator,
        Office::UsRepresentative,
        Office::StateSenator,
        Office::StateRepresentative,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Office::President => "president",
            Office::Governor => "governor",
            Office::UsSenator => "us-senator",
            Office::UsRepresentative => "us-representative",
            Office::StateSenator => "state-senator",
            Office::StateRepresentative => "state-representative",
        }
    }

    /// Free-text labels used by the Secretary of State files in most years.
    fn default_labels(&self) -> &'static [&'static str] {
        match self {
            Office::President => &["PRESIDENT OF THE UNITED STATES", "PRESIDENT"],
            Office::Governor => &["GOVERNOR", "GOVERNOR AND LIEUTENANT GOVERNOR"],
            Office::UsSenator => &["UNITED STATES SENATOR", "U.S. SENATOR"],
            Office::UsRepresentative => &["REPRESENTATIVE IN CONGRESS"],
            Office::StateSenator => &["STATE SENATOR"],
            Office::StateRepresentative => &["REPRESENTATIVE IN STATE LEGISLATURE", "REPRESENTATIVE IN STATE LEG"],
        }
    }
}

impl fmt::Display for Office {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for Office {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Office::ALL.into_iter()
            .find(|office| office.to_str() == slug)
            .ok_or_else(|| Error::UnknownOffice(s.to_string()))
    }
}

/// Labels that identify an office in one particular year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearLabels {
    pub year: u16,
    pub labels: Vec<String>,
}

/// Known free-text labels for one logical office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficeLabels {
    pub office: Office,
    pub labels: Vec<String>,
    /// Year-specific labels replace `labels` for that year.
    #[serde(default)]
    pub by_year: Vec<YearLabels>,
}

impl OfficeLabels {
    fn labels_for(&self, year: u16) -> &[String] {
        self.by_year.iter()
            .find(|entry| entry.year == year)
            .map(|entry| entry.labels.as_slice())
            .unwrap_or(&self.labels)
    }
}

/// Collapse whitespace and upper-case a free-text office description.
fn normalize_label(label: &str) -> String {
    label.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

/// Explicit mapping from logical offices to the labels they appear under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficeCatalog {
    entries: Vec<OfficeLabels>,
}

impl Default for OfficeCatalog {
    fn default() -> Self {
        Self {
            entries: Office::ALL.iter()
                .map(|&office| OfficeLabels {
                    office,
                    labels: office.default_labels().iter().map(|s| s.to_string()).collect(),
                    by_year: Vec::new(),
                })
                .collect(),
        }
    }
}

impl OfficeCatalog {
    pub fn new(entries: Vec<OfficeLabels>) -> Self { Self { entries } }

    /// Labels accepted for `office` in `year` (empty if the office is not catalogued).
    pub fn labels(&self, office: Office, year: u16) -> Vec<String> {
        self.entries.iter()
            .filter(|entry| entry.office == office)
            .flat_map(|entry| entry.labels_for(year).iter().map(|label| normalize_label(label)))
            .collect()
    }

    /// Resolve `office` to the single office code used in `year`'s files.
    /// `offices` yields (office_code, office_desc) pairs.
    pub fn resolve<'a>(
        &self,
        office: Office,
        year: u16,
        offices: impl IntoIterator<Item = (u32, &'a str)>,
    ) -> Result<u32, Error> {
        let labels = self.labels(office, year);
        let codes = offices.into_iter()
            .filter(|(_, desc)| labels.contains(&normalize_label(desc)))
            .map(|(code, _)| code)
            .collect::<BTreeSet<_>>();

        let mut iter = codes.iter();
        match (iter.next(), iter.next()) {
            (None, _) => Err(Error::NoMatchingOffice { office, year }),
            (Some(&code), None) => Ok(code),
            _ => Err(Error::AmbiguousOffice { office, year, codes: codes.iter().copied().collect() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offices() -> Vec<(u32, &'static str)> {
        vec![
            (2, "GOVERNOR"),
            (5, "Secretary of State"),
            (8, "REPRESENTATIVE IN STATE LEGISLATURE"),
            (8, "REPRESENTATIVE  IN STATE LEGISLATURE"),
            (9, "STATE SENATOR"),
        ]
    }

    #[test]
    fn resolves_exact_labels() {
        let catalog = OfficeCatalog::default();
        assert_eq!(catalog.resolve(Office::Governor, 2018, offices()).unwrap(), 2);
        assert_eq!(catalog.resolve(Office::StateRepresentative, 2018, offices()).unwrap(), 8);
    }

    #[test]
    fn substring_matches_do_not_count() {
        let catalog = OfficeCatalog::new(vec![OfficeLabels {
            office: Office::Governor,
            labels: vec!["GOV".into()],
            by_year: vec![],
        }]);
        assert!(matches!(
            catalog.resolve(Office::Governor, 2018, offices()),
            Err(Error::NoMatchingOffice { office: Office::Governor, year: 2018 })
        ));
    }

    #[test]
    fn several_codes_are_ambiguous() {
        let catalog = OfficeCatalog::new(vec![OfficeLabels {
            office: Office::StateSenator,
            labels: vec!["STATE SENATOR".into(), "GOVERNOR".into()],
            by_year: vec![],
        }]);
        match catalog.resolve(Office::StateSenator, 2014, offices()) {
            Err(Error::AmbiguousOffice { codes, .. }) => assert_eq!(codes, vec![2, 9]),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn year_specific_labels_replace_defaults() {
        let catalog = OfficeCatalog::new(vec![OfficeLabels {
            office: Office::Governor,
            labels: vec!["GOVERNOR".into()],
            by_year: vec![YearLabels { year: 2014, labels: vec!["SECRETARY OF STATE".into()] }],
        }]);
        assert_eq!(catalog.resolve(Office::Governor, 2014, offices()).unwrap(), 5);
        assert_eq!(catalog.resolve(Office::Governor, 2018, offices()).unwrap(), 2);
    }

    #[test]
    fn office_slugs_parse() {
        assert_eq!("state_representative".parse::<Office>().unwrap(), Office::StateRepresentative);
        assert_eq!("Governor".parse::<Office>().unwrap(), Office::Governor);
        assert!("mayor".parse::<Office>().is_err());
    }
}
