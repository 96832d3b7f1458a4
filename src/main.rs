//! Tunedeck command-line interface.
//!
//! Browse the catalog, search, like songs and manage playlists from the
//! terminal. Run `tunedeck --help` for the list of subcommands.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tunedeck::cli;

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging (stderr, so command output stays clean)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("tunedeck=info".parse()?))
        .init();

    cli::run_command(&args)
}
