//! Per-node entry point started by `executor.sh` inside a SLURM allocation.
//!
//! Usage: `slurm-spark-executor <WORK_DIR> [CMD]...`

use anyhow::{Context, Result};
use slurm_spark::executor::{self, ExecutorArgs, NodeRole};
use slurm_spark::logging;
use std::process::ExitCode;
use tracing::{info, warn};

fn main() -> Result<ExitCode> {
    logging::init();

    let args = ExecutorArgs::from_env().context("Usage: slurm-spark-executor <WORK_DIR> [CMD]...")?;
    std::env::set_current_dir(args.work_dir())
        .with_context(|| format!("Failed to enter {}", args.work_dir().display()))?;

    info!(
        "node role {}, running {} command(s) in {}",
        NodeRole::from_env(),
        args.commands().len(),
        args.work_dir().display()
    );

    let script = executor::node_script(args.commands());
    let status = executor::run_commands(&script, true).context("Failed to run node script")?;

    // The shell's exit code becomes ours so SLURM records the failure.
    match status.code() {
        Some(0) => Ok(ExitCode::SUCCESS),
        Some(code) => {
            warn!("node script exited with code {}", code);
            Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
        }
        None => {
            warn!("node script terminated by signal");
            Ok(ExitCode::FAILURE)
        }
    }
}
