//! Commands run on each allocated node, and the executor's arguments.

use crate::error::{Error, Result};
use crate::shell::{self, join_commands};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Per-node index set by SLURM inside an allocation.
pub const NODE_ID_VAR: &str = "SLURM_NODEID";

/// Environment module providing Spark.
pub const SPARK_MODULE: &str = "plgrid/apps/spark/2.0.1";

pub fn import_modules() -> Vec<String> {
    vec![format!("module load {}", SPARK_MODULE)]
}

pub fn start_cluster() -> Vec<String> {
    vec!["start-spark-cluster.sh".to_string()]
}

pub fn stop_cluster() -> Vec<String> {
    vec!["stop-spark-cluster.sh".to_string()]
}

/// Wrap `cmds` so they only run on the node with index 0.
pub fn only_on_master<S: AsRef<str>>(cmds: &[S]) -> Vec<String> {
    vec![format!(
        "if [ ${} -eq 0 ]; then {}; fi",
        NODE_ID_VAR,
        join_commands(cmds)
    )]
}

/// Join `cmds` and run them in one shell, returning the shell's status.
pub fn run_commands<S: AsRef<str>>(cmds: &[S], echo: bool) -> Result<ExitStatus> {
    shell::run(&join_commands(cmds), echo)
}

/// Master-only statements for `cmds`, skipping blank commands.
///
/// Empty when nothing is left, since `then ; fi` does not parse.
pub fn master_section<S: AsRef<str>>(cmds: &[S]) -> Vec<String> {
    let cmds: Vec<&str> = cmds
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| !c.trim().is_empty())
        .collect();
    if cmds.is_empty() {
        return Vec::new();
    }
    only_on_master(&cmds)
}

/// Full statement list for one node: load modules, start the cluster, run
/// `cmds` on the master only, then stop the cluster.
///
/// Everything runs in one shell so the module environment carries over.
pub fn node_script<S: AsRef<str>>(cmds: &[S]) -> Vec<String> {
    let mut script = import_modules();
    script.extend(start_cluster());
    script.extend(master_section(cmds));
    script.extend(stop_cluster());
    script
}

/// Role of this node within the allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Master,
    Worker(u32),
    /// Not inside an allocation, or the index could not be read.
    Unknown,
}

impl NodeRole {
    pub fn from_env() -> Self {
        Self::from_node_id(std::env::var(NODE_ID_VAR).ok().as_deref())
    }

    pub fn from_node_id(value: Option<&str>) -> Self {
        match value.map(str::trim).map(str::parse::<u32>) {
            Some(Ok(0)) => NodeRole::Master,
            Some(Ok(id)) => NodeRole::Worker(id),
            _ => NodeRole::Unknown,
        }
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Master => write!(f, "master"),
            NodeRole::Worker(id) => write!(f, "worker {}", id),
            NodeRole::Unknown => write!(f, "unknown"),
        }
    }
}

/// Invocation arguments of the executor: program, working directory, commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorArgs {
    work_dir: PathBuf,
    commands: Vec<String>,
}

impl ExecutorArgs {
    pub fn from_env() -> Result<Self> {
        Self::from_args(std::env::args())
    }

    /// Parse a full argument vector, including the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().skip(1).map(Into::into);
        let work_dir = args.next().map(PathBuf::from).ok_or(Error::MissingWorkDir)?;
        Ok(Self {
            work_dir,
            commands: args.collect(),
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}
