use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::frame::DataFrame;
use tracing::debug;

use crate::{io::csv, types::Party};

/// Municipality code used for county-level rows (absentee and other aggregates).
const COUNTY_LEVEL_MCD: u32 = 9999;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OfficeRow {
    pub code: u32,
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CandidateRow {
    pub office: u32,
    pub candidate: u32,
    /// "LAST, FIRST"
    pub name: String,
    pub party: Party,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VoteRow {
    pub candidate: u32,
    pub county: u32,
    pub mcd: u32,
    pub ward: String,
    pub precinct: String,
    pub votes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MunicipalityRow {
    pub county: u32,
    pub mcd: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CountyRow {
    pub code: u32,
    pub name: String,
}

fn parse_codes(df: &DataFrame, column: &str, file: &Path) -> Result<Vec<u32>> {
    csv::string_values(df, column)?.iter().enumerate()
        .map(|(row, value)| value.trim().parse::<u32>()
            .with_context(|| format!("[election::files] {} row {row}: invalid {column} {value:?}", file.display())))
        .collect()
}

fn texts(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    Ok(csv::optional_string_values(df, column)?.into_iter()
        .map(|value| value.map(|s| s.trim().to_string()).unwrap_or_default())
        .collect())
}

/// Vote counts carry the occasional `NA`; it and blanks count as zero.
fn parse_votes(value: Option<&str>) -> Result<u64> {
    match value.map(str::trim) {
        None | Some("") | Some("NA") => Ok(0),
        Some(count) => count.parse::<u64>().with_context(|| format!("invalid vote count {count:?}")),
    }
}

/// One year's tab-separated result files from the Secretary of State.
#[derive(Debug, Clone)]
pub(crate) struct ResultFiles {
    dir: PathBuf,
    year: u16,
}

impl ResultFiles {
    pub(crate) fn new(dir: PathBuf, year: u16) -> Self { Self { dir, year } }

    fn read(&self, name: &str, columns: &[&str]) -> Result<(PathBuf, DataFrame)> {
        let path = self.dir.join(name);
        let df = csv::read_headerless_tsv(&path, columns)?;
        debug!("[election::files] read {} rows from {}", df.height(), path.display());
        Ok((path, df))
    }

    pub(crate) fn offices(&self) -> Result<Vec<OfficeRow>> {
        let (path, df) = self.read(
            &format!("{}offc.txt", self.year),
            &["election_year", "election_type", "office_code", "district_code", "status_code", "office_desc"],
        )?;
        let codes = parse_codes(&df, "office_code", &path)?;
        let descs = texts(&df, "office_desc")?;

        Ok(codes.into_iter().zip(descs)
            .map(|(code, desc)| OfficeRow { code, desc })
            .collect())
    }

    pub(crate) fn candidates(&self) -> Result<Vec<CandidateRow>> {
        let (path, df) = self.read(&format!("{}name.txt", self.year), &[
            "election_year", "election_type", "office_code", "district_code", "status_code",
            "candidate_id", "last_name", "first_name", "middle_name", "party",
        ])?;
        let offices = parse_codes(&df, "office_code", &path)?;
        let ids = parse_codes(&df, "candidate_id", &path)?;
        let lasts = texts(&df, "last_name")?;
        let firsts = texts(&df, "first_name")?;
        let parties = texts(&df, "party")?;

        Ok((0..offices.len())
            .map(|i| CandidateRow {
                office: offices[i],
                candidate: ids[i],
                name: format!("{}, {}", lasts[i], firsts[i]),
                party: Party::from_code(&parties[i]),
            })
            .collect())
    }

    /// Precinct vote rows of `office`; ward is padded to 2 digits and precinct to 3.
    pub(crate) fn votes(&self, office: u32) -> Result<Vec<VoteRow>> {
        let (path, df) = self.read(&format!("{}vote.txt", self.year), &[
            "election_year", "election_type", "office_code", "district_code", "status_code",
            "candidate_id", "county_code", "mcd_code", "ward", "precinct", "precinct_label", "votes",
        ])?;
        let offices = parse_codes(&df, "office_code", &path)?;
        let ids = parse_codes(&df, "candidate_id", &path)?;
        let counties = parse_codes(&df, "county_code", &path)?;
        let mcds = parse_codes(&df, "mcd_code", &path)?;
        let wards = texts(&df, "ward")?;
        let precincts = texts(&df, "precinct")?;
        let votes = csv::optional_string_values(&df, "votes")?;

        (0..offices.len())
            .filter(|&i| offices[i] == office)
            .map(|i| Ok(VoteRow {
                candidate: ids[i],
                county: counties[i],
                mcd: mcds[i],
                ward: format!("{:0>2}", wards[i]),
                precinct: format!("{:0>3}", precincts[i]),
                votes: parse_votes(votes[i].as_deref())
                    .with_context(|| format!("[election::files] {} row {i}", path.display()))?,
            }))
            .collect()
    }

    /// Municipalities of the year, without the county-level pseudo-municipality.
    pub(crate) fn municipalities(&self) -> Result<Vec<MunicipalityRow>> {
        let (path, df) = self.read(
            &format!("{}city.txt", self.year),
            &["election_year", "election_type", "county_code", "mcd_code", "mcd_name"],
        )?;
        let counties = parse_codes(&df, "county_code", &path)?;
        let mcds = parse_codes(&df, "mcd_code", &path)?;
        let names = texts(&df, "mcd_name")?;

        Ok(counties.into_iter().zip(mcds).zip(names)
            .filter(|((_, mcd), _)| *mcd != COUNTY_LEVEL_MCD)
            .map(|((county, mcd), name)| MunicipalityRow { county, mcd, name })
            .collect())
    }

    pub(crate) fn counties(&self) -> Result<Vec<CountyRow>> {
        let (path, df) = self.read("county.txt", &["county_code", "county_name"])?;
        let codes = parse_codes(&df, "county_code", &path)?;
        let names = texts(&df, "county_name")?;
        Ok(codes.into_iter().zip(names).map(|(code, name)| CountyRow { code, name }).collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fs;

    use super::*;

    /// Two counties, three municipalities and a governor race in three precincts.
    pub(crate) fn write_fixture(dir: &Path, year: u16) {
        fs::write(dir.join(format!("{year}offc.txt")), format!(
            "{year}\tGEN\t2\t00000\t0\tGOVERNOR\n{year}\tGEN\t8\t00033\t0\tREPRESENTATIVE IN STATE LEGISLATURE\n"
        )).unwrap();
        fs::write(dir.join(format!("{year}name.txt")), format!(
            "{year}\tGEN\t2\t00000\t0\t101\tWHITMER\tGRETCHEN\t\tDEM\n\
             {year}\tGEN\t2\t00000\t0\t102\tSCHUETTE\tBILL\t\tREP\n\
             {year}\tGEN\t2\t00000\t0\t103\tSCHWARTZ\tBILL\t\tLIB\n"
        )).unwrap();
        fs::write(dir.join(format!("{year}vote.txt")), format!(
            "{year}\tGEN\t2\t00000\t0\t101\t1\t10\t1\t1\t\t100\n\
             {year}\tGEN\t2\t00000\t0\t102\t1\t10\t1\t1\t\t80\n\
             {year}\tGEN\t2\t00000\t0\t103\t1\t10\t1\t1\t\tNA\n\
             {year}\tGEN\t2\t00000\t0\t101\t1\t20\t0\t2\t\t20\n\
             {year}\tGEN\t2\t00000\t0\t102\t1\t20\t0\t2\t\t30\n\
             {year}\tGEN\t2\t00000\t0\t101\t2\t30\t0\t1\t\t10\n\
             {year}\tGEN\t2\t00000\t0\t102\t2\t9999\t0\t0\t\t5\n\
             {year}\tGEN\t8\t00033\t0\t555\t1\t10\t1\t1\t\t7\n"
        )).unwrap();
        fs::write(dir.join(format!("{year}city.txt")), format!(
            "{year}\tGEN\t1\t10\tSAINT JOHNS CITY\n\
             {year}\tGEN\t1\t20\tMOUNT MORRIS TOWNSHIP\n\
             {year}\tGEN\t2\t30\tALPHA CITY\n\
             {year}\tGEN\t2\t9999\tABSENTEE\n"
        )).unwrap();
        fs::write(dir.join("county.txt"), "1\tALPHA\n2\tBETA\n").unwrap();
    }

    #[test]
    fn reads_every_file() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixture(tmp.path(), 2018);
        let files = ResultFiles::new(tmp.path().to_path_buf(), 2018);

        let offices = files.offices().unwrap();
        assert_eq!(offices[1], OfficeRow { code: 8, desc: "REPRESENTATIVE IN STATE LEGISLATURE".into() });

        let candidates = files.candidates().unwrap();
        assert_eq!(candidates[0].name, "WHITMER, GRETCHEN");
        assert_eq!(candidates[2].party, Party::Oth);

        let municipalities = files.municipalities().unwrap();
        assert_eq!(municipalities.len(), 3);

        assert_eq!(files.counties().unwrap()[1], CountyRow { code: 2, name: "BETA".into() });
    }

    #[test]
    fn votes_are_filtered_padded_and_cleaned() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixture(tmp.path(), 2018);
        let votes = ResultFiles::new(tmp.path().to_path_buf(), 2018).votes(2).unwrap();

        assert_eq!(votes.len(), 7);
        assert_eq!(votes[0].ward, "01");
        assert_eq!(votes[0].precinct, "001");
        assert_eq!(votes[2].votes, 0);
        assert!(votes.iter().all(|v| v.candidate != 555));
    }

    #[test]
    fn vote_counts() {
        assert_eq!(parse_votes(Some("NA")).unwrap(), 0);
        assert_eq!(parse_votes(None).unwrap(), 0);
        assert_eq!(parse_votes(Some(" 12 ")).unwrap(), 12);
        assert!(parse_votes(Some("-3")).is_err());
    }
}
