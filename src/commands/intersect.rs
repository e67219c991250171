use anyhow::Result;

use crate::{
    cli::{Cli, IntersectArgs},
    commands::load_config,
    config::Config,
    intersect::run_batch,
    types::UnitKey,
};

/// Every (year, chamber) pair of the requested years and chambers. An empty filter falls
/// back to the configured list, so years or chambers outside the config are still computed.
fn selected_units(config: &Config, args: &IntersectArgs) -> Vec<UnitKey> {
    let years = if args.years.is_empty() { &config.years } else { &args.years };
    let chambers = if args.chambers.is_empty() { &config.chambers } else { &args.chambers };
    years.iter()
        .flat_map(|&year| chambers.iter().map(move |&chamber| UnitKey::new(year, chamber)))
        .collect()
}

pub fn run(cli: &Cli, args: &IntersectArgs) -> Result<()> {
    let config = load_config(cli)?;
    let units = selected_units(&config, args);
    if units.is_empty() {
        println!("no (year, chamber) units selected; set years and chambers in the config or pass --year/--chamber");
        return Ok(());
    }

    let report = run_batch(&config, &units, args.force)?;
    for key in &report.computed { println!("computed {key}"); }
    for key in &report.skipped { println!("skipped  {key}"); }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chamber;

    fn args(years: Vec<u16>, chambers: Vec<Chamber>) -> IntersectArgs {
        IntersectArgs { years, chambers, force: false }
    }

    #[test]
    fn unconfigured_year_uses_configured_chambers() {
        let config = Config::default();
        let units = selected_units(&config, &args(vec![2020], vec![]));
        assert_eq!(units, vec![UnitKey::new(2020, Chamber::StateSenate), UnitKey::new(2020, Chamber::StateHouse)]);
    }

    #[test]
    fn unconfigured_chamber_uses_configured_years() {
        let config = Config { years: vec![2018], ..Config::default() };
        let units = selected_units(&config, &args(vec![], vec![Chamber::Congressional]));
        assert_eq!(units, vec![UnitKey::new(2018, Chamber::Congressional)]);
    }

    #[test]
    fn no_filters_select_the_configured_batch() {
        let config = Config::default();
        assert_eq!(selected_units(&config, &args(vec![], vec![])), config.units());
    }
}
