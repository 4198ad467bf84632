//! `spark-submit` launch of the packaged GraphX application.

use crate::error::{Error, Result};
use crate::paths::Paths;
use crate::shell::Token;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Main class run by `spark-submit`.
pub const DRIVER_CLASS: &str = "ClusterRunner";

/// Shell glob of the packaged application jar under the base directory.
pub const ARTIFACT_GLOB: &str = "graphx-perf-comp*.jar";

const ARTIFACT_PATTERN: &str = r"^graphx-perf-comp.*\.jar$";

/// Command launching the application on the cluster.
///
/// The base directory is quoted; the jar wildcard stays outside the quotes
/// for the node's shell to expand.
pub fn launch_command(paths: &Paths) -> String {
    let base = Token::Quoted(paths.base_dir.to_string_lossy().to_string());
    format!(
        "spark-submit --class {} {}/{}",
        DRIVER_CLASS, base, ARTIFACT_GLOB
    )
}

/// Jars in `base_dir` the launch command's wildcard would match, sorted by name.
pub fn find_artifacts(base_dir: &Path) -> Result<Vec<PathBuf>> {
    let re = Regex::new(ARTIFACT_PATTERN)?;
    let read_err = |source: std::io::Error| Error::ReadArtifacts {
        path: base_dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in std::fs::read_dir(base_dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let name = entry.file_name();
        if re.is_match(&name.to_string_lossy()) && entry.path().is_file() {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell;

    #[test]
    fn test_launch_command() {
        let paths = Paths::from_script_dir("/opt/job");
        assert_eq!(
            launch_command(&paths),
            "spark-submit --class ClusterRunner \"/opt/job\"/graphx-perf-comp*.jar"
        );
    }

    #[test]
    fn test_launch_command_with_spaces_in_base_dir() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().join("my jobs");
        std::fs::create_dir(&base).unwrap();
        std::fs::write(base.join("graphx-perf-comp-1.0.jar"), b"").unwrap();

        let cmd = launch_command(&Paths::from_script_dir(&base));
        // Same word splitting and globbing the node's shell applies to the jar path.
        let check = cmd.replacen("spark-submit --class ClusterRunner", "test -f", 1);
        assert!(shell::run(&check, false).unwrap().success());
    }

    #[test]
    fn test_find_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "graphx-perf-comp-1.0.jar",
            "graphx-perf-comp.jar",
            "graphx-perf-comp-1.0.jar.bak",
            "other.jar",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("graphx-perf-comp-dir.jar")).unwrap();

        let found = find_artifacts(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("graphx-perf-comp-1.0.jar"),
                dir.path().join("graphx-perf-comp.jar"),
            ]
        );
    }

    #[test]
    fn test_find_artifacts_missing_dir() {
        let result = find_artifacts(Path::new("/nonexistent/base"));
        assert!(matches!(result, Err(Error::ReadArtifacts { .. })));
    }
}
