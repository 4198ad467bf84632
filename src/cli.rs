//! CLI entry point and command definitions for the driver.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use slurm_spark::logs::{ensure_dir_exists, run_log_dir};
use slurm_spark::paths::{PathResolver, Paths};
use slurm_spark::sbatch::{self, SbatchOptions};
use slurm_spark::spark;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// SLURM Spark launcher - submit Spark jobs to a SLURM allocation.
#[derive(Debug, Parser)]
#[command(name = "slurm-spark")]
#[command(version = "0.1.0")]
#[command(about = "Submit Spark cluster jobs to SLURM")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Submit a batch job running the given commands on the master node
    Submit {
        #[command(flatten)]
        scheduling: SchedulingArgs,
        /// Commands to run, each passed as one argument
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        cmds: Vec<String>,
    },
    /// Submit a batch job launching the packaged GraphX application
    Graphx {
        #[command(flatten)]
        scheduling: SchedulingArgs,
    },
    /// Print the resolved directories
    Paths,
    /// Print the absolute build directory for a CMake build type
    BuildDir {
        /// Build type, e.g. release or debug
        kind: String,
    },
}

/// Scheduling flags shared by the submitting commands.
#[derive(Debug, Clone, Default, Args)]
pub struct SchedulingArgs {
    /// Number of nodes
    #[arg(short = 'N', long = "nodes")]
    pub node_count: Option<NonZeroU32>,
    /// Tasks per node
    #[arg(long)]
    pub tasks_per_node: Option<NonZeroU32>,
    /// Memory per task, e.g. 1gb
    #[arg(long)]
    pub mem_per_task: Option<String>,
    /// Partition to submit to
    #[arg(short = 'p', long)]
    pub queue: Option<String>,
    /// Prefix of the job's stdout/stderr files
    #[arg(long)]
    pub log_prefix: Option<String>,
    /// Wall-clock limit, HH:MM:SS
    #[arg(short = 't', long)]
    pub time: Option<String>,
    /// TOML file with scheduling defaults
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print the sbatch line without submitting it
    #[arg(long)]
    pub dry_run: bool,
}

impl SchedulingArgs {
    /// Merge flags over the config file (if any) over built-in defaults.
    ///
    /// A relative log prefix is placed inside `run_log_dir`.
    pub fn resolve(&self, run_log_dir: &Path) -> Result<SbatchOptions> {
        let mut opts = match &self.config {
            Some(path) => SbatchOptions::from_toml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SbatchOptions::default(),
        };

        if let Some(n) = self.node_count {
            opts.node_count = n;
        }
        if let Some(k) = self.tasks_per_node {
            opts.tasks_per_node = k;
        }
        if let Some(mem) = &self.mem_per_task {
            opts.mem_per_task = mem.clone();
        }
        if let Some(queue) = &self.queue {
            opts.queue = queue.clone();
        }
        if let Some(prefix) = &self.log_prefix {
            opts.log_prefix = prefix.clone();
        }
        if let Some(time) = &self.time {
            opts.time = time.clone();
        }

        if Path::new(&opts.log_prefix).is_relative() {
            opts.log_prefix = run_log_dir
                .join(&opts.log_prefix)
                .to_string_lossy()
                .to_string();
        }

        Ok(opts)
    }
}

/// Handle the submit command.
pub fn handle_submit(resolver: &PathResolver, scheduling: &SchedulingArgs, cmds: &[String]) -> Result<()> {
    let paths = resolver.paths().context("Failed to resolve paths")?;
    submit_commands(paths, scheduling, cmds)
}

/// Handle the graphx command.
pub fn handle_graphx(resolver: &PathResolver, scheduling: &SchedulingArgs) -> Result<()> {
    let paths = resolver.paths().context("Failed to resolve paths")?;

    match spark::find_artifacts(&paths.base_dir) {
        Ok(jars) if jars.is_empty() => warn!(
            "no {} found in {}; the job will fail to launch",
            spark::ARTIFACT_GLOB,
            paths.base_dir.display()
        ),
        Ok(jars) => info!("application jar: {}", jars[0].display()),
        Err(e) => warn!("could not look for the application jar: {}", e),
    }

    submit_commands(paths, scheduling, &[spark::launch_command(paths)])
}

fn submit_commands(paths: &Paths, scheduling: &SchedulingArgs, cmds: &[String]) -> Result<()> {
    let log_dir = run_log_dir(&paths.log_dir);
    let opts = scheduling.resolve(&log_dir)?;
    let invocation = sbatch::batch_invocation(paths, &opts, cmds);

    println!("{}", invocation);
    if scheduling.dry_run {
        return Ok(());
    }

    ensure_dir_exists(&log_dir).context("Failed to prepare log directory")?;
    sbatch::submit(paths, &invocation).context("Failed to submit job")?;
    println!("Job logs: {}", log_dir.display());
    Ok(())
}

/// Handle the paths command.
pub fn handle_paths(resolver: &PathResolver) -> Result<()> {
    let paths = resolver.paths().context("Failed to resolve paths")?;
    println!("script dir: {}", paths.script_dir.display());
    println!("base dir:   {}", paths.base_dir.display());
    println!("log dir:    {}", paths.log_dir.display());
    Ok(())
}

/// Handle the build-dir command.
pub fn handle_build_dir(resolver: &PathResolver, kind: &str) -> Result<()> {
    let paths = resolver.paths().context("Failed to resolve paths")?;
    println!("{}", paths.abs_build_dir(kind).display());
    Ok(())
}
