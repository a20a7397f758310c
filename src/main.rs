use std::{error::Error, path::PathBuf};

use clap::Parser;
use fixturedeps::{
    cli::{
        args::{CliArgs, Command},
        command_handlers::{do_notation, do_resolve, DEFAULT_BUILD_FILE_NAME},
    },
    config::FixturedepsConfig,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = CliArgs::parse();
    let config = FixturedepsConfig::load()?;

    let build_file = cli_args
        .build_file
        .map(PathBuf::from)
        .or(config.build_file)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_FILE_NAME));

    let output = match cli_args.cmd {
        Command::Resolve { project } => {
            do_resolve(&build_file, project.or(config.project).as_deref())?
        }
        Command::Notation {
            notation,
            test_fixtures,
        } => do_notation(&notation, test_fixtures)?,
    };
    print!("{}", output);

    Ok(())
}
