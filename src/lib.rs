//! Submit Spark workloads to SLURM and run them on the allocated nodes.
//!
//! The driver (`slurm-spark`) renders an `sbatch` line pointing at
//! `executor.sh`; on every node the script hands its arguments to
//! `slurm-spark-executor`, which loads modules, starts the Spark cluster, runs
//! the commands on the master node and stops the cluster again.

pub mod error;
pub mod executor;
pub mod logging;
pub mod logs;
pub mod paths;
pub mod sbatch;
pub mod shell;
pub mod spark;

pub use error::{Error, Result};
