//! Shared test infrastructure for driving the cluster-launch binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const FAKE_CONFIG: &str = "type: fake\n\
provider_info: {}\n\
this_is_a_temporary_config_format_do_not_put_in_production: true\n";

/// A scratch directory that the binary runs in, so default paths
/// (`config.yaml`, `cluster_info.json`) resolve inside it.
pub struct Sandbox {
    pub dir: TempDir,
}

/// Captured result of one invocation.
#[derive(Debug)]
pub struct Run {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for Run {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directory");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).expect("read file")
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_cluster-launch"));
        command.current_dir(self.dir.path()).env_remove("RUST_LOG");
        command
    }

    pub fn run(&self, args: &[&str]) -> Run {
        self.command().args(args).output().expect("run cluster-launch").into()
    }

    /// Put an executable `py.test` stand-in on a private PATH directory.
    #[cfg(unix)]
    pub fn install_fake_runner(&self, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let bin_dir = self.path("bin");
        let runner = self.write("bin/py.test", script);
        let mut perms = std::fs::metadata(&runner).expect("stat runner").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&runner, perms).expect("chmod runner");
        bin_dir
    }
}

/// PATH with `dir` in front of the inherited search path.
pub fn path_with(dir: &Path) -> std::ffi::OsString {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(paths).expect("join PATH")
}
