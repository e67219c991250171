use anyhow::{ensure, Result};

use crate::{
    apportion::{compare_margins, comparisons_to_dataframe},
    cli::{Cli, CompareArgs},
    commands::{district_summaries, join_note, load_config},
    io::csv,
};

pub fn run(cli: &Cli, args: &CompareArgs) -> Result<()> {
    ensure!(args.years.len() == 2, "--years takes exactly two years");
    let output = args.out.check()?;
    let config = load_config(cli)?;
    let precision = args.out.precision();

    let a = district_summaries(&config, args.years[0], args.office, args.chamber, precision)?;
    let b = district_summaries(&config, args.years[1], args.office, args.chamber, precision)?;
    let rows = compare_margins(&a.rows, &b.rows);

    csv::write_csv(&comparisons_to_dataframe(&rows)?, output)?;
    println!("Wrote {} {} districts ({} vs {}) -> {}", rows.len(), args.chamber, args.years[0], args.years[1], output.display());
    for (year, run) in [(args.years[0], &a), (args.years[1], &b)] {
        println!("  {year}: {}", join_note(&run.ingest, Some(&run.report)));
    }
    Ok(())
}
