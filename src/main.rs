mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use slurm_spark::logging;
use slurm_spark::paths::PathResolver;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let resolver = PathResolver::new();

    match cli.command {
        Commands::Submit { scheduling, cmds } => {
            cli::handle_submit(&resolver, &scheduling, &cmds)?;
        }
        Commands::Graphx { scheduling } => {
            cli::handle_graphx(&resolver, &scheduling)?;
        }
        Commands::Paths => {
            cli::handle_paths(&resolver)?;
        }
        Commands::BuildDir { kind } => {
            cli::handle_build_dir(&resolver, &kind)?;
        }
    }

    Ok(())
}
