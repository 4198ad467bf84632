//! `sbatch` submission for the executor script.

use crate::error::{Error, Result};
use crate::paths::Paths;
use crate::shell::Invocation;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use tracing::info;

/// Job name passed to `-J`.
pub const JOB_NAME: &str = "framework";

/// Account charged for every submission.
pub const ACCOUNT: &str = "ccbmc6";

/// Batch script placed next to the binaries; forwards its arguments to the executor.
pub const EXECUTOR_SCRIPT: &str = "executor.sh";

/// Scheduling parameters of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SbatchOptions {
    pub node_count: NonZeroU32,
    pub tasks_per_node: NonZeroU32,
    pub mem_per_task: String,
    pub queue: String,
    pub log_prefix: String,
    /// Wall-clock limit as `HH:MM:SS`.
    pub time: String,
}

impl Default for SbatchOptions {
    fn default() -> Self {
        Self {
            node_count: NonZeroU32::MIN,
            tasks_per_node: NonZeroU32::MIN,
            mem_per_task: "1gb".to_string(),
            queue: "plgrid-short".to_string(),
            log_prefix: "framework".to_string(),
            time: "00:20:00".to_string(),
        }
    }
}

impl SbatchOptions {
    /// Load options from a TOML file; missing keys keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Location of the batch script `sbatch` is pointed at.
pub fn executor_script(paths: &Paths) -> PathBuf {
    paths.script_dir.join(EXECUTOR_SCRIPT)
}

/// Build the `sbatch` invocation running `cmds` through the executor script.
pub fn batch_invocation<S: AsRef<str>>(paths: &Paths, opts: &SbatchOptions, cmds: &[S]) -> Invocation {
    let script = executor_script(paths);

    let mut inv = Invocation::new("sbatch")
        .flag("-J", JOB_NAME)
        .flag("-N", opts.node_count.to_string())
        .flag("--ntasks-per-node", opts.tasks_per_node.to_string())
        .flag("--mem-per-cpu", opts.mem_per_task.as_str())
        .flag("--time", opts.time.as_str())
        .flag("-A", ACCOUNT)
        .flag("-p", opts.queue.as_str())
        .flag("--output", format!("{}.so", opts.log_prefix))
        .flag("--error", format!("{}.se", opts.log_prefix))
        .arg(script.to_string_lossy())
        .quoted(paths.base_dir.to_string_lossy());

    for cmd in cmds {
        inv = inv.quoted(cmd.as_ref());
    }
    inv
}

/// Render the submission as a shell line. Nothing is executed.
pub fn run_batch_string<S: AsRef<str>>(paths: &Paths, opts: &SbatchOptions, cmds: &[S]) -> String {
    batch_invocation(paths, opts, cmds).to_string()
}

/// Hand the invocation to `sbatch`; its output goes straight to the terminal.
///
/// Fails before calling `sbatch` when the executor script is not installed.
pub fn submit(paths: &Paths, invocation: &Invocation) -> Result<()> {
    let script = executor_script(paths);
    if !script.exists() {
        return Err(Error::MissingScript { path: script });
    }

    info!("submitting: {}", invocation);
    invocation.run_checked()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Token;
    use std::io::Write;

    fn count_token(rendered: &str, flag: &str) -> usize {
        rendered.split(' ').filter(|t| *t == flag).count()
    }

    fn value_after<'a>(inv: &'a Invocation, flag: &str) -> &'a str {
        let args = inv.args();
        let pos = args.iter().position(|a| *a == flag).unwrap();
        args[pos + 1]
    }

    #[test]
    fn test_default_submission_string() {
        let paths = Paths::from_script_dir("/opt/job");
        let rendered = run_batch_string(&paths, &SbatchOptions::default(), &["a", "b"]);
        assert_eq!(
            rendered,
            "sbatch -J framework -N 1 --ntasks-per-node 1 --mem-per-cpu 1gb --time 00:20:00 \
             -A ccbmc6 -p plgrid-short --output framework.so --error framework.se \
             /opt/job/executor.sh \"/opt/job\" \"a\" \"b\""
        );
    }

    #[test]
    fn test_each_flag_once_with_supplied_values() {
        let paths = Paths::from_script_dir("/opt/job");
        let opts = SbatchOptions {
            node_count: NonZeroU32::new(4).unwrap(),
            tasks_per_node: NonZeroU32::new(8).unwrap(),
            mem_per_task: "2gb".to_string(),
            queue: "plgrid".to_string(),
            log_prefix: "/opt/job/logs/run/framework".to_string(),
            time: "01:30:00".to_string(),
        };
        let inv = batch_invocation(&paths, &opts, &["spark-submit x"]);
        let rendered = inv.to_string();

        for flag in [
            "-N",
            "--ntasks-per-node",
            "--mem-per-cpu",
            "--time",
            "-p",
            "-A",
            "--output",
            "--error",
        ] {
            assert_eq!(count_token(&rendered, flag), 1, "flag {}", flag);
        }
        assert_eq!(value_after(&inv, "-N"), "4");
        assert_eq!(value_after(&inv, "--ntasks-per-node"), "8");
        assert_eq!(value_after(&inv, "--mem-per-cpu"), "2gb");
        assert_eq!(value_after(&inv, "--time"), "01:30:00");
        assert_eq!(value_after(&inv, "-p"), "plgrid");
        assert_eq!(value_after(&inv, "-A"), "ccbmc6");
        assert_eq!(value_after(&inv, "--output"), "/opt/job/logs/run/framework.so");
        assert_eq!(value_after(&inv, "--error"), "/opt/job/logs/run/framework.se");
    }

    #[test]
    fn test_commands_are_quoted_trailing_arguments_in_order() {
        let paths = Paths::from_script_dir("/opt/job");
        let cmds = ["first cmd", "second", "third --flag"];
        let inv = batch_invocation(&paths, &SbatchOptions::default(), &cmds);

        let trailing: Vec<_> = inv.tokens.iter().rev().take(cmds.len()).rev().collect();
        let expected: Vec<_> = cmds.iter().map(|c| Token::Quoted(c.to_string())).collect();
        assert_eq!(trailing, expected.iter().collect::<Vec<_>>());

        let quoted = inv.tokens.iter().filter(|t| matches!(t, Token::Quoted(_))).count();
        // base directory plus one per command
        assert_eq!(quoted, cmds.len() + 1);
        assert!(inv.to_string().ends_with("\"first cmd\" \"second\" \"third --flag\""));
    }

    #[test]
    fn test_no_commands() {
        let paths = Paths::from_script_dir("/opt/job");
        let rendered = run_batch_string::<&str>(&paths, &SbatchOptions::default(), &[]);
        assert!(rendered.ends_with("/opt/job/executor.sh \"/opt/job\""));
    }

    #[test]
    fn test_submit_requires_executor_script() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::from_script_dir(dir.path());
        let inv = batch_invocation(&paths, &SbatchOptions::default(), &["true"]);

        match submit(&paths, &inv) {
            Err(Error::MissingScript { path }) => {
                assert_eq!(path, dir.path().join("executor.sh"))
            }
            other => panic!("expected MissingScript, got {:?}", other),
        }
    }

    #[test]
    fn test_options_from_toml_keep_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "node_count = 3\nqueue = \"plgrid-long\"").unwrap();

        let opts = SbatchOptions::from_toml_file(file.path()).unwrap();
        assert_eq!(opts.node_count.get(), 3);
        assert_eq!(opts.queue, "plgrid-long");
        assert_eq!(opts.tasks_per_node.get(), 1);
        assert_eq!(opts.time, "00:20:00");
    }

    #[test]
    fn test_options_from_toml_rejects_unknown_and_zero() {
        let mut unknown = tempfile::NamedTempFile::new().unwrap();
        writeln!(unknown, "nodes = 3").unwrap();
        assert!(matches!(
            SbatchOptions::from_toml_file(unknown.path()),
            Err(Error::ParseConfig { .. })
        ));

        let mut zero = tempfile::NamedTempFile::new().unwrap();
        writeln!(zero, "node_count = 0").unwrap();
        assert!(SbatchOptions::from_toml_file(zero.path()).is_err());
    }

    #[test]
    fn test_options_missing_file() {
        let err = SbatchOptions::from_toml_file(Path::new("/nonexistent/sbatch.toml"));
        assert!(matches!(err, Err(Error::ReadConfig { .. })));
    }
}
