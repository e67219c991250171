use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::{election::Office, types::Chamber};

/// Apportion Michigan precinct election results to legislative districts
#[derive(Parser, Debug)]
#[command(name = "apportion", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// TOML configuration file (defaults are used for missing keys)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Override the root directory of all raw inputs
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub source_root: Option<PathBuf>,

    /// Override the intersection cache directory
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub cache_dir: Option<PathBuf>,

    /// Override the overlap tolerance
    #[arg(long, global = true)]
    pub tolerance: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute and cache precinct/district intersections that are not cached yet
    Intersect(IntersectArgs),

    /// Apportion one office's votes to the districts of a chamber
    Summary(SummaryArgs),

    /// Total one office's votes per county
    Counties(CountiesArgs),

    /// Compare district margins of one office between two years
    Compare(CompareArgs),
}

#[derive(Args, Debug)]
pub struct IntersectArgs {
    /// Election years (defaults to the configured years)
    #[arg(long = "year")]
    pub years: Vec<u16>,

    /// Chambers: senate, house or congress (defaults to the configured chambers)
    #[arg(long = "chamber")]
    pub chambers: Vec<Chamber>,

    /// Recompute units that are already cached
    #[arg(long)]
    pub force: bool,
}

/// Output file shared by the report commands.
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output CSV file (must be a file path; "-" is rejected)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,

    /// Report shares and margins as percentages (1 decimal) instead of fractions (3 decimals)
    #[arg(long)]
    pub percent: bool,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[arg(long)]
    pub year: u16,

    /// e.g. governor, president, state-senator
    #[arg(long)]
    pub office: Office,

    #[arg(long)]
    pub chamber: Chamber,

    #[command(flatten)]
    pub out: OutputArgs,
}

#[derive(Args, Debug)]
pub struct CountiesArgs {
    #[arg(long)]
    pub year: u16,

    #[arg(long)]
    pub office: Office,

    /// Restrict to one county (by name)
    #[arg(long)]
    pub county: Option<String>,

    #[command(flatten)]
    pub out: OutputArgs,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[arg(long)]
    pub office: Office,

    #[arg(long)]
    pub chamber: Chamber,

    /// The two election years to compare
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    pub years: Vec<u16>,

    #[command(flatten)]
    pub out: OutputArgs,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_compare() {
        let cli = Cli::parse_from([
            "apportion", "-vv", "compare", "--office", "governor", "--chamber", "house",
            "--years", "2014", "2018", "-o", "out.csv",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Compare(args) => {
                assert_eq!(args.office, Office::Governor);
                assert_eq!(args.chamber, Chamber::StateHouse);
                assert_eq!(args.years, vec![2014, 2018]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_repeated_intersect_filters() {
        let cli = Cli::parse_from(["apportion", "intersect", "--year", "2016", "--chamber", "sd", "--force"]);
        match cli.command {
            Commands::Intersect(args) => {
                assert_eq!(args.years, vec![2016]);
                assert_eq!(args.chambers, vec![Chamber::StateSenate]);
                assert!(args.force);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
