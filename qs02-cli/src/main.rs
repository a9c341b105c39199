// qs02-cli/src/main.rs
//
// Entry point for the qs02 binary: parses arguments, sets up logging,
// resolves the policy and dispatches to the selected command. Any error that
// reaches main is printed and turns into a non-zero exit code.

use clap::Parser;
use console::style;
use qs02_cli::config::load_policy;
use qs02_cli::logging::init_logging;
use qs02_cli::{Cli, Commands, run_inventory_command, run_normalize_command};

use std::process;

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(log_path) = init_logging(cli.verbose, cli.log_dir.as_deref())? {
        log::info!("Logging to {}", log_path.display());
    }
    let policy = load_policy(cli.config.as_deref())?;

    match cli.command {
        Commands::Inventory(args) => {
            let report = run_inventory_command(&args, &policy)?;
            log::debug!("Inventory covered {} file(s)", report.total());
        }
        Commands::Normalize(args) => {
            let job = run_normalize_command(&args, policy)?;
            log::debug!("Normalization target: {}", job.output_path.display());
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {e:#}", style("Error:").red().bold());
        process::exit(1);
    }
}
