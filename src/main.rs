use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use apportion::cli::{Cli, Commands};
use apportion::commands::{compare, counties, intersect, summary};

/// `-v` count → default log level; `RUST_LOG` wins when set.
fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    match &cli.command {
        Commands::Intersect(args) => intersect::run(&cli, args),
        Commands::Summary(args) => summary::run(&cli, args),
        Commands::Counties(args) => counties::run(&cli, args),
        Commands::Compare(args) => compare::run(&cli, args),
    }
}
