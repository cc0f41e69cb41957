use std::process::ExitCode;

use clap::Parser;
use elemap::config::{Config, Options};
use elemap::pipeline;

fn try_main() -> anyhow::Result<()> {
    let config = Config::try_from(Options::parse())?;
    let report = pipeline::run(&config)?;
    print!("{report}");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
