//! The capability contract every provider backend implements.
//!
//! A launcher is rebuilt from scratch for each phase: from `provider_info` for
//! `create`, and from the artifact's `provider` section afterwards.
use crate::document::{ClusterInfo, LaunchConfig};
use crate::error::LaunchResult;
use crate::registry::ProviderKind;
use serde_json::Value;

pub mod shell;

/// Fixed test runner invoked by the `pytest` phase.
pub const TEST_RUNNER: &str = "py.test";

pub trait Launcher {
    fn kind(&self) -> ProviderKind;

    /// Provision the cluster. Either returns a complete artifact or fails with
    /// a provisioning error; never a partial document.
    fn create(&self, config: &LaunchConfig) -> LaunchResult<ClusterInfo>;

    /// Block until the cluster is ready or the internal budget is exhausted.
    fn wait(&self, info: &ClusterInfo) -> LaunchResult<()>;

    /// Read-only snapshot of cluster composition.
    fn describe(&self, info: &ClusterInfo) -> LaunchResult<Value>;

    /// Run the test command against the live cluster and return its exit status.
    fn test(&self, info: &ClusterInfo, invocation: &TestInvocation) -> LaunchResult<i32>;

    /// Release everything the artifact identifies; already-absent resources are fine.
    fn delete(&self, info: &ClusterInfo) -> LaunchResult<()>;
}

/// A test command assembled from pass-through environment, the runner, and
/// caller-supplied trailing arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInvocation {
    pub env: Vec<(String, String)>,
    pub runner: String,
    pub extra_args: Vec<String>,
}

impl TestInvocation {
    pub fn new(env: Vec<(String, String)>, extra_args: Vec<String>) -> Self {
        Self {
            env,
            runner: TEST_RUNNER.to_string(),
            extra_args,
        }
    }

    /// Render as one shell command line: `A=1 B=2 py.test <extras>`.
    ///
    /// Environment values are quoted; trailing arguments are appended verbatim
    /// so callers can still pass shell syntax through to the runner.
    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(name, value)| format!("{name}={}", shell_words::quote(value)))
            .collect();
        parts.push(self.runner.clone());
        parts.extend(self.extra_args.iter().cloned());
        parts.join(" ")
    }
}
