//! Lifecycle orchestration: one phase per invocation.
//!
//! `create` reads the configuration document and writes the artifact; every
//! other phase rebuilds its launcher from the artifact alone.
use crate::artifact::ArtifactStore;
use crate::cli::{Command, CreateArgs, PytestArgs};
use crate::document::{self, ClusterInfo, LaunchConfig};
use crate::error::{LaunchError, LaunchResult};
use crate::launcher::{Launcher, TestInvocation};
use crate::registry::LauncherRegistry;
use crate::validate::{check_required_keys, Document};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

const STDOUT: &str = "<stdout>";

/// Source of pass-through environment variables for the test phase.
pub trait Environment: Document {
    fn lookup(&self, name: &str) -> Option<OsString>;
}

/// The environment of the running process, read lazily.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Document for ProcessEnvironment {
    fn has_key(&self, key: &str) -> bool {
        std::env::var_os(key).is_some()
    }
}

impl Environment for ProcessEnvironment {
    fn lookup(&self, name: &str) -> Option<OsString> {
        std::env::var_os(name)
    }
}

impl Environment for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<OsString> {
        self.get(name).map(OsString::from)
    }
}

pub struct Orchestrator<E: Environment> {
    registry: LauncherRegistry,
    env: E,
}

impl<E: Environment> Orchestrator<E> {
    pub fn new(registry: LauncherRegistry, env: E) -> Self {
        Self { registry, env }
    }

    /// Run one phase and return the process exit code. Human-readable output
    /// (the ready message, descriptions) goes to `out`.
    pub fn run(&self, command: &Command, out: &mut dyn Write) -> LaunchResult<i32> {
        match command {
            Command::Create(args) => self.create(args).map(|()| 0),
            Command::Wait(args) => {
                let (info, launcher) = self.reload(&args.common.info_path)?;
                launcher.wait(&info)?;
                emit(out, "Cluster is ready!\n")?;
                Ok(0)
            }
            Command::Describe(args) => {
                let (info, launcher) = self.reload(&args.common.info_path)?;
                let description = launcher.describe(&info)?;
                let text = document::render_json(Path::new(STDOUT), &description)?;
                emit(out, &text)?;
                Ok(0)
            }
            Command::Pytest(args) => self.pytest(args),
            Command::Delete(args) => {
                let (info, launcher) = self.reload(&args.common.info_path)?;
                launcher.delete(&info)?;
                Ok(0)
            }
        }
    }

    fn create(&self, args: &CreateArgs) -> LaunchResult<()> {
        let store = ArtifactStore::new(&args.common.info_path);
        store.ensure_absent()?;
        let config = document::load_config(&args.config_path)?;
        let launcher = self
            .registry
            .resolve(&config.provider_type, &config.provider_info)?;
        tracing::info!(provider = %launcher.kind(), config = %args.config_path.display(), "creating cluster");
        let info = launcher.create(&config)?;
        check_created_artifact(&config, &info)?;
        store.write_new(&info)?;
        tracing::info!(info_path = %store.path().display(), "cluster info written");
        Ok(())
    }

    fn pytest(&self, args: &PytestArgs) -> LaunchResult<i32> {
        // build before touching the artifact so option errors surface first
        let invocation =
            build_test_invocation(args.env.as_deref(), &args.pytest_extras, &self.env)?;
        let (info, launcher) = self.reload(&args.common.info_path)?;
        launcher.test(&info, &invocation)
    }

    fn reload(&self, info_path: &Path) -> LaunchResult<(ClusterInfo, Box<dyn Launcher>)> {
        let info = ArtifactStore::new(info_path).load()?;
        let launcher = self.registry.resolve(&info.provider_type, &info.provider)?;
        tracing::debug!(provider = %launcher.kind(), info_path = %info_path.display(), "launcher rebuilt from artifact");
        Ok((info, launcher))
    }
}

fn emit(out: &mut dyn Write, text: &str) -> LaunchResult<()> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|err| LaunchError::io("write", STDOUT, err))
}

/// The artifact must identify the same provider the config asked for and
/// carry a `provider` mapping to rebuild it from.
fn check_created_artifact(config: &LaunchConfig, info: &ClusterInfo) -> LaunchResult<()> {
    if info.provider_type != config.provider_type {
        return Err(LaunchError::Provision {
            provider: config.provider_type.clone(),
            message: format!(
                "artifact names provider {:?}, expected {:?}",
                info.provider_type, config.provider_type
            ),
        });
    }
    if !info.provider.is_object() {
        return Err(LaunchError::Provision {
            provider: config.provider_type.clone(),
            message: "artifact provider section is not a mapping".to_string(),
        });
    }
    Ok(())
}

/// Assemble the test command from an `--env` list and trailing arguments.
///
/// The list only names variables to copy from `env`; inline assignments are
/// rejected before any lookup happens.
pub fn build_test_invocation<E: Environment + ?Sized>(
    env_list: Option<&str>,
    extra_args: &[String],
    env: &E,
) -> LaunchResult<TestInvocation> {
    let Some(env_list) = env_list else {
        return Ok(TestInvocation::new(Vec::new(), extra_args.to_vec()));
    };
    if env_list.contains('=') {
        return Err(LaunchError::InvalidOption(
            "the --env option only passes through variables from the current environment; \
             set variables with the shell instead"
                .to_string(),
        ));
    }
    let names: Vec<&str> = env_list.split(',').map(str::trim).collect();
    if let Some(bad) = names.iter().find(|name| !is_env_name(name)) {
        return Err(LaunchError::InvalidOption(format!(
            "invalid environment variable name {bad:?} in --env"
        )));
    }
    check_required_keys(env, &names)?;

    let mut pairs = Vec::with_capacity(names.len());
    for name in names {
        let value = env
            .lookup(name)
            .ok_or_else(|| LaunchError::MissingKeys {
                keys: vec![name.to_string()],
            })?
            .into_string()
            .map_err(|_| {
                LaunchError::InvalidOption(format!(
                    "environment variable {name} passed with --env is not valid UTF-8"
                ))
            })?;
        pairs.push((name.to_string(), value));
    }
    Ok(TestInvocation::new(pairs, extra_args.to_vec()))
}

fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|ch| ch == '_' || ch.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
