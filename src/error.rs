//! Error taxonomy for lifecycle phases.
//!
//! Every failure that reaches the operator maps to exactly one [`LaunchError`]
//! variant; `kind()` is the stable name printed alongside the message.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    /// The artifact path already holds a document before `create`.
    #[error("target info path already exists: {}", path.display())]
    InputConflict { path: PathBuf },

    #[error("missing required keys: {}", keys.join(", "))]
    MissingKeys { keys: Vec<String> },

    #[error("unsupported provider type {provider_type:?} (supported: {})", supported.join(", "))]
    UnsupportedProvider {
        provider_type: String,
        supported: Vec<String>,
    },

    #[error("invalid {provider} provider parameters: {message}")]
    ProviderConfig { provider: String, message: String },

    #[error("{provider} provisioning failed: {message}")]
    Provision { provider: String, message: String },

    #[error("cluster did not become healthy: {message}")]
    ClusterUnhealthy { message: String },

    #[error("{0}")]
    InvalidOption(String),

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not run test command: {0}")]
    TestExecution(String),
}

impl LaunchError {
    /// Stable kind name shown to operators.
    pub fn kind(&self) -> &'static str {
        match self {
            LaunchError::InputConflict { .. } => "InputConflict",
            LaunchError::MissingKeys { .. } => "MissingKeys",
            LaunchError::UnsupportedProvider { .. } => "UnsupportedProvider",
            LaunchError::ProviderConfig { .. } => "ProviderConfigError",
            LaunchError::Provision { .. } => "ProvisionError",
            LaunchError::ClusterUnhealthy { .. } => "ClusterUnhealthy",
            LaunchError::InvalidOption(_) => "OptionError",
            LaunchError::Parse { .. } => "ParseError",
            LaunchError::Io { .. } => "IOError",
            LaunchError::TestExecution(_) => "TestExecutionError",
        }
    }

    pub fn provider_config(provider: &str, message: impl Into<String>) -> Self {
        LaunchError::ProviderConfig {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Wrap a provider-internal failure, keeping its context chain in the message.
    pub fn provision(provider: &str, err: impl Into<anyhow::Error>) -> Self {
        LaunchError::Provision {
            provider: provider.to_string(),
            message: format!("{:#}", err.into()),
        }
    }

    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LaunchError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type LaunchResult<T> = std::result::Result<T, LaunchError>;
