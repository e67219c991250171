use anyhow::Result;

use crate::{
    apportion::districts_to_dataframe,
    cli::{Cli, SummaryArgs},
    commands::{district_summaries, join_note, load_config},
    io::csv,
};

pub fn run(cli: &Cli, args: &SummaryArgs) -> Result<()> {
    let output = args.out.check()?;
    let config = load_config(cli)?;

    let run = district_summaries(&config, args.year, args.office, args.chamber, args.out.precision())?;
    csv::write_csv(&districts_to_dataframe(&run.rows)?, output)?;
    println!("Wrote {} {} districts -> {}", run.rows.len(), args.chamber, output.display());
    println!("  {}", join_note(&run.ingest, Some(&run.report)));
    Ok(())
}
