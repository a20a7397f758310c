use clap::{Parser, Subcommand};

/// Normalizes dependency declarations and selects test fixtures variants.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Location of the build descriptor.
    /// Defaults to $FIXTUREDEPS_BUILD_FILE, then build.toml
    #[clap(short, long)]
    pub build_file: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prints the normalized dependencies declared in the build descriptor
    Resolve {
        /// Only resolve this project. Defaults to $FIXTUREDEPS_BUILD_PROJECT, then every project
        #[clap(short, long)]
        project: Option<String>,
    },
    /// Prints the dependency a single notation normalizes to
    Notation {
        notation: String,
        /// Select the test fixtures variant of the dependency
        #[clap(short, long)]
        test_fixtures: bool,
    },
}
