use clap::Parser;
use ruletidy::cli::{Cli, run_cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.setup_logging();
    tracing::debug!(?cli, "Parsed arguments");

    run_cli(cli)
}
