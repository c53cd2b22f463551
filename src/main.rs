use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use paintcore::cli::{self, CliArgs};
use paintcore::logger;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Session log (overwrites the previous run's log)
    let level = if args.verbose { LevelFilter::Debug } else { args.settings().log_level };
    logger::init(level);
    if args.verbose
        && let Some(path) = logger::log_path()
    {
        eprintln!("log: {}", path.display());
    }

    cli::run(args)
}
