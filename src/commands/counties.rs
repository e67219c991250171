use anyhow::Result;

use crate::{
    apportion::{counties_to_dataframe, county_totals},
    cli::{Cli, CountiesArgs},
    commands::{join_note, load_config},
    election::{ElectionData, McdDirectory},
    io::csv,
};

pub fn run(cli: &Cli, args: &CountiesArgs) -> Result<()> {
    let output = args.out.check()?;
    let config = load_config(cli)?;

    let data = ElectionData::load(&config, args.year)?;
    let directory = McdDirectory::load(&config)?;
    let (votes, ingest) = data.vote_table(&config.offices, args.office, &directory, args.county.as_deref())?;

    let rows = county_totals(&votes, args.out.precision());
    csv::write_csv(&counties_to_dataframe(&rows)?, output)?;
    println!("Wrote {} counties -> {}", rows.len(), output.display());
    println!("  {}", join_note(&ingest, None));
    Ok(())
}
