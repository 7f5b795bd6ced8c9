//! swinventory CLI: SolarWinds dynamic inventory for Ansible.
//!
//! `--list` prints the grouped inventory built from one SolarWinds query;
//! `--host <name>` prints an empty document, since host variables are
//! already embedded in the list output.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
